#![forbid(unsafe_code)]

//! Change computation between two buffers.
//!
//! [`changes`] walks both grids row by row and produces the ordered list of
//! [`Change`]s that transforms the previous frame into the current one. The
//! list is ephemeral: it borrows nothing, but it is only meaningful against
//! the current buffer it was computed from, and is consumed by
//! [`render`](crate::render::Renderer::render) in the same pass.

use crate::buffer::Buffer;

/// How far left of a placeholder its head can be.
const MAX_WIDE_SCAN: usize = 3;

/// One step of a reconciliation pass. Coordinates index into the *current*
/// buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// Erase the whole display; emitted when the grids cannot be compared
    /// column by column.
    ClearScreen,
    /// Rewrite row `y` of the current buffer wholesale.
    Line { y: usize },
    /// Write the current buffer's cells in columns `x0..x1` of row `y`.
    /// All non-placeholder cells in the span share one style and link.
    Segment { y: usize, x0: usize, x1: usize },
    /// Erase from `(x, y)` to the end of the line.
    EraseRight { y: usize, x: usize },
    /// Erase all of row `y`; used for rows the current buffer no longer has.
    EraseLine { y: usize },
    /// Bracket around trailing [`Change::EraseLine`]s so they do not move
    /// the visible cursor.
    SaveCursor,
    RestoreCursor,
}

/// Compute the ordered change list turning `prev` into `cur`.
///
/// Identical buffers produce an empty list. A width mismatch short-circuits
/// to a full repaint; a column-by-column diff against a reshaped row would
/// compare cells that were never at the same position.
pub fn changes(prev: &Buffer, cur: &Buffer) -> Vec<Change> {
    #[cfg(feature = "tracing")]
    let _span = tracing::debug_span!(
        "changes",
        width = cur.width(),
        height = cur.height(),
        prev_height = prev.height()
    )
    .entered();

    let mut out = Vec::new();

    if prev.width() != cur.width() {
        out.push(Change::ClearScreen);
        for y in 0..cur.height() {
            out.push(Change::Line { y });
        }
        return out;
    }

    for y in 0..cur.height() {
        diff_row(prev, cur, y, &mut out);
    }

    // Rows the current frame no longer covers are cleared under a cursor
    // save/restore so the visible cursor stays put.
    if prev.height() > cur.height() {
        out.push(Change::SaveCursor);
        for y in cur.height()..prev.height() {
            out.push(Change::EraseLine { y });
        }
        out.push(Change::RestoreCursor);
    }

    #[cfg(feature = "tracing")]
    tracing::trace!(changes = out.len(), "diff computed");

    out
}

fn diff_row(prev: &Buffer, cur: &Buffer, y: usize, out: &mut Vec<Change>) {
    let row = cur.row(y);
    let width = cur.width();

    // First column that starts the row's all-blank tail.
    let mut blank_tail = width;
    while blank_tail > 0 && row[blank_tail - 1].is_blank() {
        blank_tail -= 1;
    }

    let changed = |x: usize| match prev.cell_ref(x, y) {
        Some(p) => *p != row[x],
        None => !row[x].is_blank(),
    };

    let mut x = 0;
    while x < width {
        if !changed(x) {
            x += 1;
            continue;
        }

        if x >= blank_tail {
            // Everything from here on is blank in the current row; one
            // erase is shorter than writing the spaces out.
            out.push(Change::EraseRight { y, x });
            return;
        }

        // Never start a run on a placeholder; back up to its head so the
        // whole glyph is rewritten.
        let mut x0 = x;
        if row[x0].is_placeholder() {
            for back in 1..=MAX_WIDE_SCAN.min(x0) {
                if row[x0 - back].width as usize > back {
                    x0 -= back;
                    break;
                }
            }
        }

        let style = row[x0].style;
        let link = &row[x0].link;
        let mut x1 = x0 + 1;
        while x1 < blank_tail
            && changed(x1)
            && (row[x1].is_placeholder() || (row[x1].style == style && row[x1].link == *link))
        {
            x1 += 1;
        }

        out.push(Change::Segment { y, x0, x1 });
        x = x1;
    }
}

/// The change list drawing `cur` onto an unknown display: a full repaint.
pub fn full_repaint(cur: &Buffer) -> Vec<Change> {
    let mut out = Vec::with_capacity(cur.height() + 1);
    out.push(Change::ClearScreen);
    for y in 0..cur.height() {
        out.push(Change::Line { y });
    }
    out
}
