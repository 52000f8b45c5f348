#![forbid(unsafe_code)]

//! The cell: one grid position holding a styled grapheme cluster.
//!
//! A glyph wider than one column occupies a *head* cell (the grapheme,
//! `width >= 2`) followed by `width - 1` *placeholder* cells (empty content,
//! width 0). The [`Buffer`](crate::buffer::Buffer) maintains that pairing;
//! nothing here enforces it.

use cellwire_vt::width::cluster_width;

use crate::link::Link;
use crate::style::Style;

/// A single terminal cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cell {
    /// The grapheme cluster as text. Empty only for placeholders.
    pub content: String,
    pub style: Style,
    pub link: Link,
    /// Display columns: 0 for a placeholder, 1 for normal, 2+ for wide.
    pub width: u8,
}

impl Default for Cell {
    /// The blank cell: a plain space.
    fn default() -> Self {
        Self::blank()
    }
}

impl Cell {
    /// A blank cell: one space, default style, no link.
    pub fn blank() -> Self {
        Self {
            content: " ".to_string(),
            style: Style::default(),
            link: Link::NONE,
            width: 1,
        }
    }

    /// The trailing portion of a wide cell.
    pub fn placeholder() -> Self {
        Self {
            content: String::new(),
            style: Style::default(),
            link: Link::NONE,
            width: 0,
        }
    }

    /// A cell holding one grapheme cluster, measuring its width.
    pub fn new(grapheme: impl Into<String>) -> Self {
        let content = grapheme.into();
        let width = cluster_width(&content).min(u8::MAX as usize) as u8;
        Self {
            content,
            style: Style::default(),
            link: Link::NONE,
            width,
        }
    }

    /// A space cell carrying an existing style and link; used when repainting
    /// a partially overwritten wide cell.
    pub fn space_with(style: Style, link: Link) -> Self {
        Self {
            content: " ".to_string(),
            style,
            link,
            width: 1,
        }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_link(mut self, link: Link) -> Self {
        self.link = link;
        self
    }

    /// Whether this cell is visually and semantically the blank: a default-
    /// styled, unlinked single space (or empty-but-width-1 equivalent).
    #[inline]
    pub fn is_blank(&self) -> bool {
        self.width == 1
            && self.style.is_empty()
            && self.link.is_none()
            && (self.content == " " || self.content.is_empty())
    }

    /// Whether this cell is the trailing part of a wide cell.
    #[inline]
    pub fn is_placeholder(&self) -> bool {
        self.width == 0 && self.content.is_empty()
    }
}
