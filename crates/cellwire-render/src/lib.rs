#![forbid(unsafe_code)]

//! Styled cell grid and diff engine for flicker-free terminal redraws.
//!
//! The pipeline has three stages:
//!
//! 1. Build a [`Buffer`]: a grid of styled cells, written either cell by
//!    cell ([`Buffer::set_cell`]) or by replaying a styled string
//!    ([`Buffer::set_content`]). Wide graphemes occupy a head cell plus
//!    placeholder cells, and the buffer keeps that pairing intact through
//!    every edit.
//! 2. Diff two buffers with [`changes`] to get the minimal ordered list of
//!    [`Change`]s between frames.
//! 3. Replay the list through a [`Renderer`], which tracks the terminal's
//!    cursor, pen, and open hyperlink and emits the cheapest byte sequence
//!    for each step.
//!
//! ```
//! use cellwire_render::{changes, Buffer, Renderer};
//!
//! let mut prev = Buffer::new(20, 2);
//! prev.set_content("\x1b[1mhello\x1b[m world");
//!
//! let mut cur = Buffer::new(20, 2);
//! cur.set_content("\x1b[1mhello\x1b[m there");
//!
//! let mut out = Vec::new();
//! let mut renderer = Renderer::new();
//! renderer.render(&mut out, &cur, &changes(&prev, &cur))?;
//! # Ok::<(), std::io::Error>(())
//! ```

pub mod buffer;
pub mod cell;
pub mod content;
pub mod diff;
pub mod link;
pub mod render;
pub mod seq;
pub mod style;

pub use buffer::{Buffer, Rect};
pub use cell::Cell;
pub use diff::{changes, full_repaint, Change};
pub use link::Link;
pub use render::Renderer;
pub use style::{AttrFlags, Color, Style, UnderlineStyle};
