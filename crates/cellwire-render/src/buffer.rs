#![forbid(unsafe_code)]

//! The cell grid.
//!
//! A [`Buffer`] is a fixed-size rectangle of [`Cell`]s in row-major order.
//! Every mutating operation preserves the wide-cell invariant: a head of
//! width W at column x is followed by exactly W-1 placeholders, and no row
//! ever contains a torn wide cell. Out-of-bounds writes are no-ops and
//! out-of-bounds reads return the blank cell; rendering paths must not fail
//! on a momentarily stale size.

use crate::cell::Cell;

/// How far left of a placeholder its head can be. Wide glyphs top out at
/// four columns, so the backward scan is bounded.
const MAX_WIDE_SCAN: usize = 3;

/// A rectangular region, used to scope fills and scrolling operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// One past the rightmost column.
    #[inline]
    pub const fn right(&self) -> usize {
        self.x + self.width
    }

    /// One past the bottom row.
    #[inline]
    pub const fn bottom(&self) -> usize {
        self.y + self.height
    }

    #[inline]
    pub const fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    pub fn intersect(&self, other: &Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        Rect {
            x,
            y,
            width: right.saturating_sub(x),
            height: bottom.saturating_sub(y),
        }
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A terminal screen's worth of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Buffer {
    /// Create a buffer filled with blank cells.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::blank(); width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    #[inline]
    fn idx(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// The cell at `(x, y)`, or the blank cell for out-of-range reads.
    pub fn cell(&self, x: usize, y: usize) -> Cell {
        self.cell_ref(x, y).cloned().unwrap_or_else(Cell::blank)
    }

    /// Borrowed access; `None` out of range.
    #[inline]
    pub fn cell_ref(&self, x: usize, y: usize) -> Option<&Cell> {
        if x < self.width && y < self.height {
            Some(&self.cells[y * self.width + x])
        } else {
            None
        }
    }

    /// Cells of row `y`, or an empty slice out of range.
    pub fn row(&self, y: usize) -> &[Cell] {
        if y < self.height {
            &self.cells[y * self.width..(y + 1) * self.width]
        } else {
            &[]
        }
    }

    /// Write a cell, repairing any wide cell the write would tear.
    ///
    /// Returns false (and does nothing) out of bounds. A wide cell that
    /// would overflow the right edge is written as spaces in its style
    /// instead; a wide glyph is never silently truncated mid-cell.
    pub fn set_cell(&mut self, x: usize, y: usize, cell: Cell) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }

        let span = (cell.width as usize).max(1);
        if x + span > self.width {
            for cx in x..self.width {
                self.clean(cx, y);
                let i = self.idx(cx, y);
                self.cells[i] = Cell::space_with(cell.style, cell.link.clone());
            }
            return true;
        }

        for cx in x..x + span {
            self.clean(cx, y);
        }
        let i = self.idx(x, y);
        self.cells[i] = cell;
        for cx in x + 1..x + span {
            let i = self.idx(cx, y);
            self.cells[i] = Cell::placeholder();
        }
        true
    }

    /// If the cell at `(x, y)` belongs to a wide cell, repaint that whole
    /// wide cell as styled spaces so a write at `x` cannot tear it.
    fn clean(&mut self, x: usize, y: usize) {
        let i = self.idx(x, y);
        let w = self.cells[i].width as usize;
        if w > 1 {
            self.repaint_wide(x, y);
            return;
        }
        if self.cells[i].is_placeholder() {
            // Walk back to the head. A run of placeholders with no covering
            // head is already torn; overwriting it needs no repair.
            for back in 1..=MAX_WIDE_SCAN.min(x) {
                let hi = self.idx(x - back, y);
                let hw = self.cells[hi].width as usize;
                if hw > back {
                    self.repaint_wide(x - back, y);
                    return;
                }
                if hw != 0 {
                    return;
                }
            }
        }
    }

    /// Replace a wide cell (head at `x`) with spaces in its style.
    fn repaint_wide(&mut self, x: usize, y: usize) {
        let i = self.idx(x, y);
        let span = self.cells[i].width as usize;
        let style = self.cells[i].style;
        let link = self.cells[i].link.clone();
        for cx in x..(x + span).min(self.width) {
            let ci = self.idx(cx, y);
            self.cells[ci] = Cell::space_with(style, link.clone());
        }
    }

    /// Repaint a wide head whose placeholders would cross `boundary`,
    /// filling only the columns left of the boundary.
    fn repair_tear_at(&mut self, boundary: usize, y: usize) {
        if boundary == 0 || boundary > self.width {
            return;
        }
        for back in 1..=MAX_WIDE_SCAN.min(boundary) {
            let hx = boundary - back;
            let hi = self.idx(hx, y);
            let hw = self.cells[hi].width as usize;
            if hw > back {
                let style = self.cells[hi].style;
                let link = self.cells[hi].link.clone();
                for cx in hx..boundary {
                    let ci = self.idx(cx, y);
                    self.cells[ci] = Cell::space_with(style, link.clone());
                }
                return;
            }
            if hw != 0 {
                return;
            }
        }
    }

    /// Resize to `width` x `height`, truncating or padding with blanks.
    pub fn resize(&mut self, width: usize, height: usize) {
        if width == self.width && height == self.height {
            return;
        }
        // A cut at the new right edge can land inside a wide cell.
        if width < self.width {
            for y in 0..self.height {
                self.clean(width, y);
            }
        }
        let mut cells = vec![Cell::blank(); width * height];
        for y in 0..height.min(self.height) {
            for x in 0..width.min(self.width) {
                cells[y * width + x] = self.cells[y * self.width + x].clone();
            }
        }
        self.cells = cells;
        self.width = width;
        self.height = height;
    }

    /// Fill the whole buffer with copies of `cell`.
    pub fn fill(&mut self, cell: &Cell) {
        self.fill_rect(cell, self.bounds());
    }

    /// Fill a region with copies of `cell`. A wide fill cell tiles by its
    /// width; a tail too narrow for it gets styled spaces.
    pub fn fill_rect(&mut self, cell: &Cell, rect: Rect) {
        let rect = rect.intersect(&self.bounds());
        if rect.is_empty() {
            return;
        }
        let step = (cell.width as usize).max(1);
        for y in rect.y..rect.bottom() {
            let mut x = rect.x;
            while x < rect.right() {
                if x + step > rect.right() {
                    for cx in x..rect.right() {
                        self.set_cell(cx, y, Cell::space_with(cell.style, cell.link.clone()));
                    }
                    break;
                }
                self.set_cell(x, y, cell.clone());
                x += step;
            }
        }
    }

    /// Insert `n` blank-filled lines at row `y` within `rect`, pushing the
    /// rows below toward the rectangle's bottom edge; rows pushed past it
    /// are discarded.
    pub fn insert_lines(&mut self, y: usize, n: usize, fill: &Cell, rect: Rect) {
        let rect = rect.intersect(&self.bounds());
        if rect.is_empty() || n == 0 || y < rect.y || y >= rect.bottom() {
            return;
        }
        let n = n.min(rect.bottom() - y);
        self.clean_rect_sides(&rect);

        for row in (y..rect.bottom() - n).rev() {
            self.swap_row_segment(row, row + n, rect.x, rect.right());
        }
        self.fill_rect(fill, Rect::new(rect.x, y, rect.width, n));
    }

    /// Delete `n` lines at row `y` within `rect`, shifting the rows below
    /// up and backfilling the bottom of the rectangle.
    pub fn delete_lines(&mut self, y: usize, n: usize, fill: &Cell, rect: Rect) {
        let rect = rect.intersect(&self.bounds());
        if rect.is_empty() || n == 0 || y < rect.y || y >= rect.bottom() {
            return;
        }
        let n = n.min(rect.bottom() - y);
        self.clean_rect_sides(&rect);

        for row in y..rect.bottom() - n {
            self.swap_row_segment(row, row + n, rect.x, rect.right());
        }
        self.fill_rect(fill, Rect::new(rect.x, rect.bottom() - n, rect.width, n));
    }

    /// Insert `n` fill cells at `(x, y)` within `rect`, pushing the cells to
    /// the right toward the rectangle's right edge; cells pushed past it are
    /// discarded.
    pub fn insert_cells(&mut self, x: usize, y: usize, n: usize, fill: &Cell, rect: Rect) {
        let rect = rect.intersect(&self.bounds());
        if n == 0 || !rect.contains(x, y) {
            return;
        }
        let n = n.min(rect.right() - x);
        self.clean(x, y);
        if rect.right() < self.width {
            self.clean(rect.right(), y);
        }

        for cx in (x..rect.right() - n).rev() {
            let a = self.idx(cx, y);
            let b = self.idx(cx + n, y);
            self.cells.swap(a, b);
        }
        // A wide cell shifted into the right edge may have lost placeholders.
        self.repair_tear_at(rect.right(), y);
        self.fill_rect(fill, Rect::new(x, y, n, 1));
    }

    /// Delete `n` cells at `(x, y)` within `rect`, shifting the remainder
    /// left and backfilling at the rectangle's right edge.
    pub fn delete_cells(&mut self, x: usize, y: usize, n: usize, fill: &Cell, rect: Rect) {
        let rect = rect.intersect(&self.bounds());
        if n == 0 || !rect.contains(x, y) {
            return;
        }
        let n = n.min(rect.right() - x);
        self.clean(x, y);
        if x + n < self.width {
            // First surviving cell may be a placeholder of a deleted head.
            self.clean(x + n, y);
        }
        if rect.right() < self.width {
            self.clean(rect.right(), y);
        }

        for cx in x..rect.right() - n {
            let a = self.idx(cx, y);
            let b = self.idx(cx + n, y);
            self.cells.swap(a, b);
        }
        // A wide cell now ending at the backfill region may be torn.
        self.repair_tear_at(rect.right() - n, y);
        self.fill_rect(fill, Rect::new(rect.right() - n, y, n, 1));
    }

    /// Repaint wide cells straddling a rectangle's vertical edges, so moves
    /// confined to the rectangle cannot separate a head from its
    /// placeholders.
    fn clean_rect_sides(&mut self, rect: &Rect) {
        for y in rect.y..rect.bottom() {
            self.clean(rect.x, y);
            if rect.right() < self.width {
                self.clean(rect.right(), y);
            }
        }
    }

    fn swap_row_segment(&mut self, row_a: usize, row_b: usize, x0: usize, x1: usize) {
        for x in x0..x1 {
            let a = self.idx(x, row_a);
            let b = self.idx(x, row_b);
            self.cells.swap(a, b);
        }
    }
}
