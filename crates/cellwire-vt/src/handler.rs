//! Parser event callbacks.

use crate::command::Command;
use crate::params::Params;

/// Which control-string introducer opened a SOS/PM/APC payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringKind {
    /// Start of String (`ESC X` / 0x98).
    Sos,
    /// Privacy Message (`ESC ^` / 0x9E).
    Pm,
    /// Application Program Command (`ESC _` / 0x9F).
    Apc,
}

/// Receiver for parsed terminal events.
///
/// All methods default to no-ops so consumers implement only what they need.
/// Slice arguments (`fields`, `data`) borrow the parser's internal buffers
/// and are only valid for the duration of the call.
///
/// Malformed-but-recognizable sequences (excess parameters, extra
/// intermediates) are dispatched with `ignored = true` rather than dropped;
/// the policy is the caller's choice.
pub trait Handler {
    /// A printable grapheme and its display width in columns.
    fn print(&mut self, _grapheme: &str, _width: usize) {}

    /// A C0 or C1 control code.
    fn execute(&mut self, _byte: u8) {}

    /// A completed escape sequence (`ESC intermediates final`).
    fn esc_dispatch(&mut self, _intermediates: &[u8], _final_byte: u8, _ignored: bool) {}

    /// A completed CSI sequence.
    fn csi_dispatch(&mut self, _cmd: Command, _params: &Params, _ignored: bool) {}

    /// A completed OSC sequence, split on `;` into fields.
    ///
    /// `bell_terminated` is true for BEL termination (some consumers echo the
    /// same terminator back). `cancelled` is true when the string ended via
    /// CAN/SUB; the fields still hold whatever was accumulated.
    fn osc_dispatch(&mut self, _fields: &[&[u8]], _bell_terminated: bool, _cancelled: bool) {}

    /// A DCS sequence header was recognized; payload bytes follow via
    /// [`Handler::dcs_put`].
    fn dcs_hook(&mut self, _cmd: Command, _params: &Params, _ignored: bool) {}

    /// One DCS payload byte.
    fn dcs_put(&mut self, _byte: u8) {}

    /// The DCS payload ended (`cancelled` via CAN/SUB rather than ST).
    fn dcs_unhook(&mut self, _cancelled: bool) {}

    /// A completed SOS/PM/APC string.
    fn sos_pm_apc_dispatch(&mut self, _kind: StringKind, _data: &[u8], _cancelled: bool) {}
}

/// A handler that drops every event. Useful for skipping input and for
/// measuring with [`decode`](crate::decode::decode)-style scans.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHandler;

impl Handler for NoopHandler {}
