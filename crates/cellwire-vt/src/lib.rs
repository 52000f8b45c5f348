//! VT/ANSI control-sequence parsing for terminal applications.
//!
//! This crate recognizes the VT500-series grammar (ESC, CSI, OSC, DCS,
//! SOS/PM/APC) extended for UTF-8 streams, and measures display widths of
//! graphemes and strings. It makes no policy decisions: completed units are
//! handed to a [`Handler`] and interpretation is the caller's business.
//!
//! Two entry points:
//!
//! - [`Parser`]: stateful, byte-at-a-time, for live terminal input that
//!   arrives in arbitrary chunks.
//! - [`decode`]: single-shot, for slicing or measuring a buffer already in
//!   hand.
//!
//! ```
//! use cellwire_vt::{Handler, Parser};
//!
//! #[derive(Default)]
//! struct Plain(String);
//!
//! impl Handler for Plain {
//!     fn print(&mut self, grapheme: &str, _width: usize) {
//!         self.0.push_str(grapheme);
//!     }
//! }
//!
//! let mut parser = Parser::new();
//! let mut plain = Plain::default();
//! parser.feed(&mut plain, b"\x1b[1;31mhot\x1b[0m");
//! assert_eq!(plain.0, "hot");
//! ```

#![forbid(unsafe_code)]

pub mod command;
pub mod decode;
pub mod handler;
pub mod params;
pub mod parser;
pub mod table;
pub mod width;

pub use command::Command;
pub use decode::{decode, decode_with, Decoded};
pub use handler::{Handler, NoopHandler, StringKind};
pub use params::{Param, Params, MAX_PARAMS};
pub use parser::{Limits, Parser, MAX_INTERMEDIATES, MAX_OSC_FIELDS};
pub use table::State;
pub use width::{char_width, cluster_width, string_width, WidthMethod};
