#![forbid(unsafe_code)]

//! Writing styled strings into a buffer.
//!
//! `set_content` replays a string containing ANSI sequences into cells: SGR
//! changes the pen, OSC 8 opens and closes hyperlinks, and printable
//! graphemes land as styled cells. Every other sequence is recognized (so
//! its bytes never leak into cell content) and dropped.
//!
//! Plain text between escapes is written directly from grapheme iteration;
//! only the sequences themselves go through the parser. `memchr` finds the
//! next ESC, which for ordinary content skips most of the input in one scan.

use cellwire_vt::width::cluster_width;
use cellwire_vt::{decode, Command, Handler, Params, Parser, State};
use memchr::memchr;
use unicode_segmentation::UnicodeSegmentation;

use crate::buffer::Buffer;
use crate::cell::Cell;
use crate::link::Link;
use crate::style::Style;

/// Tab stops every 8 columns, as terminals default to.
const TAB_WIDTH: usize = 8;

impl Buffer {
    /// Clear the buffer and write `content` from the top-left corner.
    ///
    /// Lines wrap at the right edge; rows past the bottom are dropped.
    /// Returns the number of rows touched.
    pub fn set_content(&mut self, content: &str) -> usize {
        self.fill(&Cell::blank());

        let mut writer = ContentWriter {
            buf: self,
            x: 0,
            y: 0,
            max_y: 0,
            style: Style::default(),
            link: Link::NONE,
        };

        let bytes = content.as_bytes();
        let mut parser = Parser::new();
        let mut pos = 0;
        while pos < bytes.len() {
            let esc = memchr(0x1B, &bytes[pos..]).map_or(bytes.len(), |i| pos + i);
            if esc > pos {
                // Safe to slice: ESC is never part of a UTF-8 sequence.
                writer.write_text(&content[pos..esc]);
                pos = esc;
            }
            if pos < bytes.len() {
                let unit = decode(&bytes[pos..], State::Ground);
                parser.feed(&mut writer, unit.seq);
                pos += unit.n;
            }
        }

        if writer.buf.height() == 0 {
            0
        } else {
            writer.max_y.min(writer.buf.height() - 1) + 1
        }
    }
}

struct ContentWriter<'a> {
    buf: &'a mut Buffer,
    x: usize,
    y: usize,
    max_y: usize,
    style: Style,
    link: Link,
}

impl ContentWriter<'_> {
    /// Write plain text (no escapes) without going through the parser.
    fn write_text(&mut self, text: &str) {
        for grapheme in text.graphemes(true) {
            // CRLF segments as a single grapheme cluster.
            if grapheme == "\r\n" {
                self.x = 0;
                self.y += 1;
                continue;
            }
            let mut chars = grapheme.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_control() => self.execute_char(c),
                _ => self.print(grapheme, cluster_width(grapheme)),
            }
        }
    }

    fn execute_char(&mut self, c: char) {
        match c {
            '\n' => {
                self.x = 0;
                self.y += 1;
            }
            '\r' => self.x = 0,
            '\t' => {
                self.x = ((self.x / TAB_WIDTH) + 1) * TAB_WIDTH;
            }
            _ => {}
        }
    }
}

impl Handler for ContentWriter<'_> {
    fn print(&mut self, grapheme: &str, width: usize) {
        if width == 0 {
            return;
        }
        if self.x + width > self.buf.width() {
            self.x = 0;
            self.y += 1;
        }
        if self.y >= self.buf.height() {
            return;
        }
        let cell = Cell {
            content: grapheme.to_string(),
            style: self.style,
            link: self.link.clone(),
            width: width.min(u8::MAX as usize) as u8,
        };
        self.buf.set_cell(self.x, self.y, cell);
        self.max_y = self.max_y.max(self.y);
        self.x += width;
    }

    fn execute(&mut self, byte: u8) {
        self.execute_char(byte as char);
    }

    fn csi_dispatch(&mut self, cmd: Command, params: &Params, ignored: bool) {
        if !ignored && cmd.raw() == Command::new(0, 0, b'm').raw() {
            self.style.apply_sgr(params);
        }
    }

    fn osc_dispatch(&mut self, fields: &[&[u8]], _bell_terminated: bool, cancelled: bool) {
        if cancelled || fields.first().map(|f| *f != b"8").unwrap_or(true) {
            return;
        }
        let params = fields
            .get(1)
            .and_then(|f| core::str::from_utf8(f).ok())
            .unwrap_or("");
        let url = fields
            .get(2)
            .and_then(|f| core::str::from_utf8(f).ok())
            .unwrap_or("");
        self.link = Link::from_osc8(params, url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{AttrFlags, Color};

    fn red() -> Style {
        Style {
            fg: Some(Color::Named(1)),
            ..Style::default()
        }
    }

    #[test]
    fn plain_text_lands_unstyled() {
        let mut buf = Buffer::new(5, 1);
        assert_eq!(buf.set_content("ab"), 1);
        assert_eq!(buf.cell(0, 0).content, "a");
        assert_eq!(buf.cell(1, 0).content, "b");
        assert!(buf.cell(0, 0).style.is_empty());
        assert_eq!(buf.cell(2, 0), Cell::blank());
    }

    #[test]
    fn sgr_styles_following_cells() {
        let mut buf = Buffer::new(8, 1);
        buf.set_content("a\x1b[31mbc\x1b[md");
        assert!(buf.cell(0, 0).style.is_empty());
        assert_eq!(buf.cell(1, 0).style, red());
        assert_eq!(buf.cell(2, 0).style, red());
        assert!(buf.cell(3, 0).style.is_empty());
    }

    #[test]
    fn newlines_advance_rows() {
        let mut buf = Buffer::new(4, 3);
        assert_eq!(buf.set_content("a\nb\nc"), 3);
        assert_eq!(buf.cell(0, 0).content, "a");
        assert_eq!(buf.cell(0, 1).content, "b");
        assert_eq!(buf.cell(0, 2).content, "c");
    }

    #[test]
    fn long_lines_wrap() {
        let mut buf = Buffer::new(3, 2);
        buf.set_content("abcd");
        assert_eq!(buf.cell(2, 0).content, "c");
        assert_eq!(buf.cell(0, 1).content, "d");
    }

    #[test]
    fn wide_grapheme_wraps_whole() {
        let mut buf = Buffer::new(3, 2);
        // The CJK cell does not fit after "ab"; it wraps as a unit.
        buf.set_content("ab中");
        assert_eq!(buf.cell(0, 1).content, "中");
        assert!(buf.cell(1, 1).is_placeholder());
        assert_eq!(buf.cell(2, 0), Cell::blank());
    }

    #[test]
    fn zwj_emoji_is_one_cell() {
        let mut buf = Buffer::new(4, 1);
        let family = "👨\u{200D}👩\u{200D}👧";
        buf.set_content(family);
        assert_eq!(buf.cell(0, 0).content, family);
        assert_eq!(buf.cell(0, 0).width, 2);
        assert!(buf.cell(1, 0).is_placeholder());
    }

    #[test]
    fn overflowing_rows_dropped() {
        let mut buf = Buffer::new(2, 1);
        assert_eq!(buf.set_content("a\nb\nc"), 1);
        assert_eq!(buf.cell(0, 0).content, "a");
    }

    #[test]
    fn osc8_links_attach_and_close() {
        let mut buf = Buffer::new(8, 1);
        buf.set_content("\x1b]8;id=7;https://example.com\x1b\\ab\x1b]8;;\x1b\\c");
        let linked = buf.cell(0, 0).link.clone();
        assert_eq!(linked.url, "https://example.com");
        assert_eq!(linked.id, "7");
        assert_eq!(buf.cell(1, 0).link, linked);
        assert!(buf.cell(2, 0).link.is_none());
    }

    #[test]
    fn tabs_jump_to_stops() {
        let mut buf = Buffer::new(12, 1);
        buf.set_content("a\tb");
        assert_eq!(buf.cell(0, 0).content, "a");
        assert_eq!(buf.cell(8, 0).content, "b");
        assert_eq!(buf.cell(4, 0), Cell::blank());
    }

    #[test]
    fn carriage_return_overwrites() {
        let mut buf = Buffer::new(4, 1);
        buf.set_content("ab\rc");
        assert_eq!(buf.cell(0, 0).content, "c");
        assert_eq!(buf.cell(1, 0).content, "b");
    }

    #[test]
    fn unknown_sequences_are_dropped() {
        let mut buf = Buffer::new(8, 1);
        // Cursor movement and a DCS blob must not leak into cells.
        buf.set_content("a\x1b[5C\x1bPqdata\x1b\\b");
        assert_eq!(buf.cell(0, 0).content, "a");
        assert_eq!(buf.cell(1, 0).content, "b");
    }

    #[test]
    fn combining_attrs_and_colors() {
        let mut buf = Buffer::new(4, 1);
        buf.set_content("\x1b[1;4;38;5;99mx");
        let style = buf.cell(0, 0).style;
        assert!(style.attrs.contains(AttrFlags::BOLD));
        assert_eq!(style.fg, Some(Color::Indexed(99)));
    }

    #[test]
    fn set_content_clears_previous_state() {
        let mut buf = Buffer::new(4, 1);
        buf.set_content("\x1b[31mabcd");
        buf.set_content("x");
        assert_eq!(buf.cell(0, 0).content, "x");
        assert!(buf.cell(0, 0).style.is_empty());
        assert_eq!(buf.cell(1, 0), Cell::blank());
    }
}
