#![forbid(unsafe_code)]

//! Control-sequence emission helpers.
//!
//! Pure byte generation over `io::Write`; state tracking lives in
//! [`render`](crate::render). All cursor parameters here are 0-indexed and
//! converted to the 1-indexed wire form at the last moment.

use std::io::{self, Write};

use crate::link::Link;

/// SGR reset: `CSI m`.
pub const SGR_RESET: &[u8] = b"\x1b[m";

/// DECSC, save cursor position: `ESC 7`.
pub const CURSOR_SAVE: &[u8] = b"\x1b7";

/// DECRC, restore cursor position: `ESC 8`.
pub const CURSOR_RESTORE: &[u8] = b"\x1b8";

/// CUP, absolute cursor position.
#[inline]
pub fn cup<W: Write>(w: &mut W, col: usize, row: usize) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", row + 1, col + 1)
}

/// CHA, cursor to absolute column on the current row.
#[inline]
pub fn cha<W: Write>(w: &mut W, col: usize) -> io::Result<()> {
    write!(w, "\x1b[{}G", col + 1)
}

/// CUB, cursor left `n` columns.
#[inline]
pub fn cub<W: Write>(w: &mut W, n: usize) -> io::Result<()> {
    write!(w, "\x1b[{n}D")
}

/// CUD, cursor down `n` rows.
#[inline]
pub fn cud<W: Write>(w: &mut W, n: usize) -> io::Result<()> {
    write!(w, "\x1b[{n}B")
}

/// EL 0, erase from the cursor to the end of the line.
#[inline]
pub fn erase_right<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(b"\x1b[K")
}

/// EL 2, erase the whole line.
#[inline]
pub fn erase_line<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(b"\x1b[2K")
}

/// ED 2 + CUP home: clear the screen and park the cursor at the origin.
#[inline]
pub fn clear_screen<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(b"\x1b[2J\x1b[H")
}

/// OSC 8: open a hyperlink, carrying its `id=` parameter when present.
pub fn link_start<W: Write>(w: &mut W, link: &Link) -> io::Result<()> {
    if link.id.is_empty() {
        write!(w, "\x1b]8;;{}\x1b\\", link.url)
    } else {
        write!(w, "\x1b]8;id={};{}\x1b\\", link.id, link.url)
    }
}

/// OSC 8: close the open hyperlink.
#[inline]
pub fn link_end<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(b"\x1b]8;;\x1b\\")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn cursor_sequences_are_one_indexed() {
        assert_eq!(capture(|w| cup(w, 0, 0)), "\x1b[1;1H");
        assert_eq!(capture(|w| cup(w, 4, 2)), "\x1b[3;5H");
        assert_eq!(capture(|w| cha(w, 7)), "\x1b[8G");
    }

    #[test]
    fn erase_sequences() {
        assert_eq!(capture(|w| erase_right(w)), "\x1b[K");
        assert_eq!(capture(|w| erase_line(w)), "\x1b[2K");
        assert_eq!(capture(|w| clear_screen(w)), "\x1b[2J\x1b[H");
    }

    #[test]
    fn links_round_trip_ids() {
        let with_id = Link::new("https://example.com", "9");
        assert_eq!(
            capture(|w| link_start(w, &with_id)),
            "\x1b]8;id=9;https://example.com\x1b\\"
        );
        let bare = Link::new("https://example.com", "");
        assert_eq!(
            capture(|w| link_start(w, &bare)),
            "\x1b]8;;https://example.com\x1b\\"
        );
        assert_eq!(capture(|w| link_end(w)), "\x1b]8;;\x1b\\");
    }
}
