#![forbid(unsafe_code)]

//! Emitting change lists as terminal output.
//!
//! [`Renderer`] holds what the terminal currently shows between frames: the
//! cursor position, the active pen style, and the open hyperlink. Each call
//! to [`Renderer::render`] replays a change list from [`changes`] against a
//! writer, emitting the shortest motion it can prove correct and only the
//! style transitions the pen actually needs.
//!
//! [`changes`]: crate::diff::changes

use std::io::{self, Write};

use crate::buffer::Buffer;
use crate::diff::Change;
use crate::link::Link;
use crate::seq;
use crate::style::Style;

/// Short moves are cheaper as repeated single-byte controls than as a CSI.
const MOVE_THRESHOLD: usize = 4;

/// Terminal-side state carried across frames.
#[derive(Debug, Default)]
pub struct Renderer {
    /// Where the cursor is, if known. `None` forces an absolute move.
    cursor: Option<(usize, usize)>,
    /// A glyph printed in the last column leaves the cursor pinned there
    /// with the wrap deferred (DECAWM); relative motion must account for
    /// the real column and an explicit move is needed before printing.
    pending_wrap: bool,
    pen: Style,
    link: Link,
    saved: Option<(usize, usize)>,
    saved_wrap: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the terminal state; the next frame starts from absolute moves
    /// and a full pen setup. Call after anything else wrote to the terminal.
    pub fn invalidate(&mut self) {
        self.cursor = None;
        self.pending_wrap = false;
        self.pen = Style::default();
        self.link = Link::NONE;
        self.saved = None;
        self.saved_wrap = false;
    }

    /// Write `changes` against `buf` (the buffer they were computed for).
    ///
    /// Ends with the pen reset and any open hyperlink closed, so external
    /// output interleaved between frames starts clean.
    pub fn render<W: Write>(
        &mut self,
        w: &mut W,
        buf: &Buffer,
        changes: &[Change],
    ) -> io::Result<()> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("render", changes = changes.len()).entered();

        for change in changes {
            match *change {
                Change::ClearScreen => {
                    self.reset_pen(w)?;
                    seq::clear_screen(w)?;
                    self.cursor = Some((0, 0));
                }
                Change::Line { y } => {
                    let end = line_end(buf, y);
                    self.move_to(w, 0, y)?;
                    self.emit_cells(w, buf, y, 0, end)?;
                }
                Change::Segment { y, x0, x1 } => {
                    self.move_to(w, x0, y)?;
                    self.emit_cells(w, buf, y, x0, x1)?;
                }
                Change::EraseRight { y, x } => {
                    self.move_to(w, x, y)?;
                    self.reset_pen(w)?;
                    seq::erase_right(w)?;
                }
                Change::EraseLine { y } => {
                    self.move_to(w, 0, y)?;
                    self.reset_pen(w)?;
                    seq::erase_line(w)?;
                }
                Change::SaveCursor => {
                    // DECSC saves the deferred-wrap state with the position.
                    w.write_all(seq::CURSOR_SAVE)?;
                    self.saved = self.cursor;
                    self.saved_wrap = self.pending_wrap;
                }
                Change::RestoreCursor => {
                    w.write_all(seq::CURSOR_RESTORE)?;
                    self.cursor = self.saved.take();
                    self.pending_wrap = self.saved_wrap && self.cursor.is_some();
                }
            }
        }

        self.reset_pen(w)?;
        Ok(())
    }

    /// Move the cursor to `(x, y)`, using relative motion when it is short.
    ///
    /// With a wrap deferred the tracked column is the real one (clamped at
    /// the edge), so CR, BS, and LF still land correctly; but printing in
    /// place would wrap first, so the stand-still case forces a move.
    fn move_to<W: Write>(&mut self, w: &mut W, x: usize, y: usize) -> io::Result<()> {
        let target = (x, y);
        match self.cursor {
            Some(cur) if cur == target && self.pending_wrap => seq::cha(w, x)?,
            Some(cur) if cur == target => {}
            Some((cx, cy)) if cy == y => {
                if x == 0 {
                    w.write_all(b"\r")?;
                } else if x < cx && cx - x <= MOVE_THRESHOLD {
                    for _ in 0..cx - x {
                        w.write_all(b"\x08")?;
                    }
                } else {
                    seq::cha(w, x)?;
                }
            }
            Some((cx, cy)) if cy < y && y - cy <= MOVE_THRESHOLD && (x == 0 || x == cx) => {
                if x == 0 && cx != 0 {
                    w.write_all(b"\r")?;
                }
                for _ in 0..y - cy {
                    w.write_all(b"\n")?;
                }
            }
            _ => seq::cup(w, x, y)?,
        }
        self.cursor = Some(target);
        self.pending_wrap = false;
        Ok(())
    }

    /// Write the cells in columns `x0..x1` of row `y`, assuming the cursor
    /// already sits at `(x0, y)`.
    fn emit_cells<W: Write>(
        &mut self,
        w: &mut W,
        buf: &Buffer,
        y: usize,
        x0: usize,
        x1: usize,
    ) -> io::Result<()> {
        let row = buf.row(y);
        let mut advanced = 0;
        for cell in &row[x0..x1.min(row.len())] {
            if cell.is_placeholder() {
                continue;
            }
            if self.pen != cell.style {
                self.pen.diff_to(&cell.style, w)?;
                self.pen = cell.style;
            }
            if self.link != cell.link {
                if !self.link.is_none() {
                    seq::link_end(w)?;
                }
                if !cell.link.is_none() {
                    seq::link_start(w, &cell.link)?;
                }
                self.link = cell.link.clone();
            }
            if cell.content.is_empty() {
                w.write_all(b" ")?;
            } else {
                w.write_all(cell.content.as_bytes())?;
            }
            advanced += cell.width.max(1) as usize;
        }
        if let Some((cx, cy)) = self.cursor {
            let new_x = cx + advanced;
            if new_x >= buf.width() {
                // The terminal holds at the last column with wrap deferred.
                self.cursor = Some((buf.width().saturating_sub(1), cy));
                self.pending_wrap = true;
            } else {
                self.cursor = Some((new_x, cy));
            }
        }
        Ok(())
    }

    /// Return the pen to the default style and close any open link. Erase
    /// sequences fill with the active background, so they run on a clean pen.
    fn reset_pen<W: Write>(&mut self, w: &mut W) -> io::Result<()> {
        if !self.link.is_none() {
            seq::link_end(w)?;
            self.link = Link::NONE;
        }
        if !self.pen.is_empty() {
            w.write_all(seq::SGR_RESET)?;
            self.pen = Style::default();
        }
        Ok(())
    }
}

/// One past the last column of `y` worth writing: trailing blanks are
/// already blank on a cleared display.
fn line_end(buf: &Buffer, y: usize) -> usize {
    let row = buf.row(y);
    let mut end = row.len();
    while end > 0 && row[end - 1].is_blank() {
        end -= 1;
    }
    end
}

impl Buffer {
    /// Serialize the whole buffer as a styled string.
    ///
    /// Rows are joined with CRLF, trailing blanks per row are trimmed, and
    /// the output ends with a pen reset. Feeding the result back through
    /// [`set_content`](Buffer::set_content) reproduces the buffer.
    pub fn render(&self) -> String {
        let mut out = Vec::new();
        let mut pen = Style::default();
        let mut link = Link::NONE;

        for y in 0..self.height() {
            if y > 0 {
                let _ = out.write_all(b"\r\n");
            }
            let row = self.row(y);
            let end = line_end(self, y);
            for cell in &row[..end] {
                if cell.is_placeholder() {
                    continue;
                }
                if pen != cell.style {
                    let _ = pen.diff_to(&cell.style, &mut out);
                    pen = cell.style;
                }
                if link != cell.link {
                    if !link.is_none() {
                        let _ = seq::link_end(&mut out);
                    }
                    if !cell.link.is_none() {
                        let _ = seq::link_start(&mut out, &cell.link);
                    }
                    link = cell.link.clone();
                }
                if cell.content.is_empty() {
                    let _ = out.write_all(b" ");
                } else {
                    let _ = out.write_all(cell.content.as_bytes());
                }
            }
        }

        if !link.is_none() {
            let _ = seq::link_end(&mut out);
        }
        if !pen.is_empty() {
            let _ = out.write_all(seq::SGR_RESET);
        }

        // Cell content is UTF-8 and every sequence written is ASCII.
        String::from_utf8_lossy(&out).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{changes, full_repaint};

    fn buf_with(content: &str, w: usize, h: usize) -> Buffer {
        let mut b = Buffer::new(w, h);
        b.set_content(content);
        b
    }

    /// Render the transition from `prev` to `cur` with a fresh renderer that
    /// has already painted `prev`.
    fn paint(prev: &Buffer, cur: &Buffer) -> String {
        let mut r = Renderer::new();
        let mut warmup = Vec::new();
        r.render(&mut warmup, prev, &full_repaint(prev)).unwrap();

        let mut out = Vec::new();
        r.render(&mut out, cur, &changes(prev, cur)).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn no_changes_writes_nothing() {
        let g = buf_with("steady", 8, 1);
        assert_eq!(paint(&g, &g), "");
    }

    #[test]
    fn single_cell_change_is_move_plus_glyph() {
        let prev = buf_with("abcd", 6, 2);
        let cur = buf_with("abXd", 6, 2);
        assert_eq!(paint(&prev, &cur), "\x1b[1;3HX");
    }

    #[test]
    fn full_repaint_clears_first() {
        let cur = buf_with("hi", 4, 1);
        let mut r = Renderer::new();
        let mut out = Vec::new();
        r.render(&mut out, &cur, &full_repaint(&cur)).unwrap();
        let s = String::from_utf8(out).unwrap();
        assert!(s.starts_with("\x1b[2J\x1b[H"));
        assert!(s.contains("hi"));
    }

    #[test]
    fn pen_persists_across_segments() {
        let prev = buf_with("....", 4, 1);
        let cur = buf_with("\x1b[31mab\x1b[32mcd", 4, 1);
        let s = paint(&prev, &cur);
        // One color change per run, then the trailing reset.
        assert_eq!(s, "\r\x1b[31mab\x1b[32mcd\x1b[m");
    }

    #[test]
    fn trailing_reset_only_when_pen_dirty() {
        let prev = buf_with("....", 4, 1);
        let plain = buf_with("abcd", 4, 1);
        assert!(!paint(&prev, &plain).contains("\x1b[m"));
        let styled = buf_with("\x1b[1mabcd", 4, 1);
        assert!(paint(&prev, &styled).ends_with("\x1b[m"));
    }

    #[test]
    fn carriage_return_beats_cha_for_column_zero() {
        let prev = buf_with("abcdef", 6, 1);
        let cur = buf_with("Xbcdef", 6, 1);
        // Cursor parked past "abcdef" by the warmup paint; same row, col 0.
        assert_eq!(paint(&prev, &cur), "\rX");
    }

    #[test]
    fn short_backward_move_uses_backspaces() {
        let prev = buf_with("abcdef", 8, 1);
        let cur = buf_with("abcdeX", 8, 1);
        // After warmup the cursor sits at column 6; one BS reaches column 5.
        assert_eq!(paint(&prev, &cur), "\x08X");
    }

    #[test]
    fn newline_hops_short_distances_down() {
        let prev = buf_with("aa\nbb\ncc", 4, 3);
        let cur = buf_with("aa\nbX\nXc", 4, 3);
        // The second segment starts one row below where the first ended.
        assert_eq!(paint(&prev, &cur), "\x1b[2;2HX\r\nX");
    }

    #[test]
    fn distant_target_uses_absolute_move() {
        let prev = buf_with("a", 10, 8);
        let mut cur = buf_with("a", 10, 8);
        // Warmup leaves the cursor on the last row; the change is upward.
        cur.set_cell(5, 0, crate::cell::Cell::new("z"));
        assert_eq!(paint(&prev, &cur), "\x1b[1;6Hz");
    }

    #[test]
    fn erase_right_resets_pen_first() {
        let prev = buf_with("\x1b[41mHELLO", 10, 1);
        let cur = buf_with("\x1b[41mHI", 10, 1);
        let s = paint(&prev, &cur);
        // The erased area must not inherit the red background.
        let erase = s.find("\x1b[K").unwrap();
        let reset = s.find("\x1b[m").unwrap();
        assert!(reset < erase);
    }

    #[test]
    fn shrunk_height_saves_and_restores_cursor() {
        let prev = buf_with("a\nb", 4, 2);
        let cur = buf_with("a", 4, 1);
        let s = paint(&prev, &cur);
        assert!(s.starts_with("\x1b7"));
        assert!(s.contains("\x1b[2K"));
        assert!(s.ends_with("\x1b8"));
    }

    #[test]
    fn links_open_and_close_around_runs() {
        let prev = buf_with("...", 6, 1);
        let cur = buf_with("\x1b]8;;https://example.com\x1b\\ab\x1b]8;;\x1b\\c", 6, 1);
        let s = paint(&prev, &cur);
        let open = s.find("\x1b]8;;https://example.com\x1b\\").unwrap();
        let close = s.rfind("\x1b]8;;\x1b\\").unwrap();
        assert!(open < close);
        assert!(s.contains("ab"));
    }

    #[test]
    fn deferred_wrap_keeps_backspace_distance_honest() {
        // Painting flush to the right edge leaves the terminal cursor at the
        // last column with wrap pending, not one past it. A backspace move
        // computed from a phantom column would land one cell too far left.
        let prev = buf_with("abcdef", 6, 1);
        let cur = buf_with("abcdXf", 6, 1);
        assert_eq!(paint(&prev, &cur), "\x08X");
    }

    #[test]
    fn printing_again_at_last_column_moves_first() {
        // With wrap pending, printing in place would wrap to the next row;
        // an explicit column move must clear the deferred state.
        let prev = buf_with("abcdef", 6, 1);
        let cur = buf_with("abcdeX", 6, 1);
        assert_eq!(paint(&prev, &cur), "\x1b[6GX");
    }

    #[test]
    fn wide_cells_advance_cursor_by_two() {
        let prev = buf_with("中x", 6, 1);
        let cur = buf_with("中X", 6, 1);
        // The changed 'X' sits at column 2; warmup left the cursor at 3.
        assert_eq!(paint(&prev, &cur), "\x08X");
    }

    #[test]
    fn invalidate_forces_absolute_motion() {
        let prev = buf_with("ab", 4, 1);
        let cur = buf_with("aX", 4, 1);
        let mut r = Renderer::new();
        let mut out = Vec::new();
        r.render(&mut out, &prev, &full_repaint(&prev)).unwrap();
        r.invalidate();
        out.clear();
        r.render(&mut out, &cur, &changes(&prev, &cur)).unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("\x1b[1;2H"));
    }

    #[test]
    fn buffer_render_round_trips_through_set_content() {
        let src = "\x1b[1;31mbold red\x1b[m then 中文 and\r\n\x1b[4ma link line";
        let a = buf_with(src, 20, 2);
        let b = buf_with(&a.render(), 20, 2);
        assert_eq!(changes(&a, &b), vec![]);
    }

    #[test]
    fn buffer_render_trims_trailing_blanks() {
        let b = buf_with("hi", 10, 2);
        assert_eq!(b.render(), "hi\r\n");
    }
}
