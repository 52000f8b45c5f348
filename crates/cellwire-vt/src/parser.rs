//! Stateful VT/ANSI sequence parser.
//!
//! The parser consumes one byte at a time, walks the [`table`](crate::table)
//! state machine, and invokes [`Handler`] callbacks for each completed unit:
//! printable grapheme, control code, escape/CSI sequence, or OSC/DCS/APC/PM/
//! SOS string. It holds no heap state besides its string-payload buffer, so
//! a caller keeps one parser per terminal session and calls [`Parser::reset`]
//! to reuse it.
//!
//! Truncated input is not an error: a chunk ending mid-sequence simply
//! leaves the parser in a non-ground state, ready to resume on the next
//! chunk.

use crate::command::Command;
use crate::handler::{Handler, StringKind};
use crate::params::{Param, Params};
use crate::table::{self, Action, State};
use crate::width::char_width;

/// Maximum collected intermediate bytes. More than this sets the `ignored`
/// flag on dispatch (the sequence is still recognizable).
pub const MAX_INTERMEDIATES: usize = 2;

/// Maximum `;`-separated OSC fields exposed per dispatch. Further separators
/// are kept as literal bytes of the last field.
pub const MAX_OSC_FIELDS: usize = 16;

/// Resource caps for the parser's string buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Byte cap for buffered OSC (and SOS/PM/APC) payloads. Bytes past the
    /// cap are consumed and dropped, never an unbounded allocation. Hosts
    /// that expect large OSC 52 clipboard payloads raise this.
    pub max_string_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_string_bytes: 1024,
        }
    }
}

/// Byte-at-a-time VT500 parser.
#[derive(Debug, Clone)]
pub struct Parser {
    state: State,
    params: Params,
    accum: u32,
    accum_digits: bool,
    slot_open: bool,
    ignored: bool,
    marker: u8,
    intermediates: [u8; MAX_INTERMEDIATES],
    num_intermediates: usize,
    /// OSC / SOS/PM/APC payload, bounded by `limits.max_string_bytes`.
    data: Vec<u8>,
    /// Byte ranges of `;`-separated OSC fields within `data`.
    fields: [(usize, usize); MAX_OSC_FIELDS],
    num_fields: usize,
    string_kind: StringKind,
    utf8: [u8; 4],
    utf8_len: u8,
    utf8_need: u8,
    limits: Limits,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// Create a parser in ground state with default [`Limits`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_limits(Limits::default())
    }

    /// Create a parser with explicit resource caps.
    #[must_use]
    pub fn with_limits(limits: Limits) -> Self {
        Self {
            state: State::Ground,
            params: Params::new(),
            accum: 0,
            accum_digits: false,
            slot_open: false,
            ignored: false,
            marker: 0,
            intermediates: [0; MAX_INTERMEDIATES],
            num_intermediates: 0,
            data: Vec::with_capacity(limits.max_string_bytes.min(1024)),
            fields: [(0, 0); MAX_OSC_FIELDS],
            num_fields: 0,
            string_kind: StringKind::Sos,
            utf8: [0; 4],
            utf8_len: 0,
            utf8_need: 0,
            limits,
        }
    }

    /// The current state. Ground means "between sequences".
    #[inline]
    pub fn state(&self) -> State {
        self.state
    }

    /// Return to ground state and clear all accumulators.
    ///
    /// Dispatched events borrow the internal buffers, so reset (and reuse)
    /// only after the current `advance` call has returned.
    pub fn reset(&mut self) {
        self.state = State::Ground;
        self.clear_sequence();
        self.data.clear();
        self.num_fields = 0;
        self.utf8_len = 0;
        self.utf8_need = 0;
    }

    /// Feed a whole chunk.
    pub fn feed<H: Handler>(&mut self, handler: &mut H, bytes: &[u8]) {
        for &b in bytes {
            self.advance(handler, b);
        }
    }

    /// Advance the state machine by one byte, dispatching any completed
    /// events to `handler`.
    pub fn advance<H: Handler>(&mut self, handler: &mut H, byte: u8) {
        if self.state == State::Utf8 {
            self.advance_utf8(handler, byte);
            return;
        }

        // Terminators and cancellation need bookkeeping the table cannot
        // express, so they are intercepted here.
        match byte {
            0x1B => {
                self.terminate_string(handler, false);
                self.state = State::Escape;
                self.clear_sequence();
                return;
            }
            0x18 | 0x1A => {
                // CAN/SUB abort whatever is in flight; the handler still
                // sees accumulated string data, flagged as cancelled.
                self.terminate_string(handler, true);
                handler.execute(byte);
                self.state = State::Ground;
                return;
            }
            0x9C => {
                // 8-bit ST: ends a string, otherwise a standalone no-op.
                self.terminate_string(handler, false);
                self.state = State::Ground;
                return;
            }
            0x07 if self.state == State::OscString => {
                self.dispatch_osc(handler, true, false);
                self.state = State::Ground;
                return;
            }
            _ => {}
        }

        let (action, next) = table::lookup(self.state, byte);

        match action {
            Action::Ignore => {}
            Action::Print => {
                let mut buf = [0u8; 4];
                let s = (byte as char).encode_utf8(&mut buf);
                handler.print(s, 1);
            }
            Action::Execute => handler.execute(byte),
            Action::Collect => {
                if next == State::Utf8 {
                    self.utf8[0] = byte;
                    self.utf8_len = 1;
                    self.utf8_need = utf8_len(byte);
                } else {
                    self.collect(byte);
                }
            }
            Action::Param => self.param(byte),
            Action::EscDispatch => {
                handler.esc_dispatch(
                    &self.intermediates[..self.num_intermediates],
                    byte,
                    self.ignored,
                );
            }
            Action::CsiDispatch => {
                self.flush_param();
                let ignored = self.ignored || self.num_intermediates > 1;
                handler.csi_dispatch(self.command(byte), &self.params, ignored);
            }
            Action::Put => handler.dcs_put(byte),
            Action::OscPut => self.osc_put(byte),
            Action::StrPut => {
                if self.data.len() < self.limits.max_string_bytes {
                    self.data.push(byte);
                }
            }
        }

        if next != self.state {
            self.enter_state(handler, next, byte);
        }
        self.state = next;
    }

    // ── Transitions ─────────────────────────────────────────────────

    fn enter_state<H: Handler>(&mut self, handler: &mut H, next: State, byte: u8) {
        match next {
            State::Escape | State::CsiEntry | State::DcsEntry => self.clear_sequence(),
            State::OscString => {
                self.data.clear();
                self.num_fields = 1;
                self.fields[0] = (0, 0);
            }
            State::SosPmApcString => {
                self.data.clear();
                self.string_kind = match byte {
                    b'X' | 0x98 => StringKind::Sos,
                    b'^' | 0x9E => StringKind::Pm,
                    _ => StringKind::Apc,
                };
            }
            State::DcsPassthrough => {
                self.flush_param();
                let ignored = self.ignored || self.num_intermediates > 1;
                handler.dcs_hook(self.command(byte), &self.params, ignored);
            }
            _ => {}
        }
    }

    /// Fire the exit event for a string state, if one is active.
    fn terminate_string<H: Handler>(&mut self, handler: &mut H, cancelled: bool) {
        match self.state {
            State::OscString => self.dispatch_osc(handler, false, cancelled),
            State::DcsPassthrough => handler.dcs_unhook(cancelled),
            State::SosPmApcString => {
                handler.sos_pm_apc_dispatch(self.string_kind, &self.data, cancelled);
            }
            _ => {}
        }
    }

    // ── Accumulators ────────────────────────────────────────────────

    fn clear_sequence(&mut self) {
        self.params.clear();
        self.accum = 0;
        self.accum_digits = false;
        self.slot_open = false;
        self.ignored = false;
        self.marker = 0;
        self.num_intermediates = 0;
    }

    fn collect(&mut self, byte: u8) {
        if (0x3C..=0x3F).contains(&byte) {
            if self.marker == 0 {
                self.marker = byte;
            } else {
                self.ignored = true;
            }
        } else if self.num_intermediates < MAX_INTERMEDIATES {
            self.intermediates[self.num_intermediates] = byte;
            self.num_intermediates += 1;
        } else {
            self.ignored = true;
        }
    }

    fn param(&mut self, byte: u8) {
        match byte {
            b'0'..=b'9' => {
                // Saturating fold; hostile "999999999" stays at u16::MAX.
                self.accum = (self.accum * 10 + u32::from(byte - b'0')).min(0xFFFF);
                self.accum_digits = true;
                self.slot_open = true;
            }
            b';' => self.close_slot(false),
            b':' => self.close_slot(true),
            _ => {}
        }
    }

    fn close_slot(&mut self, has_more: bool) {
        let param = if self.accum_digits {
            Param::new(self.accum as u16)
        } else {
            Param::MISSING
        };
        let param = if has_more { param.with_more() } else { param };
        if !self.params.push(param) {
            self.ignored = true;
        }
        self.accum = 0;
        self.accum_digits = false;
        self.slot_open = true;
    }

    /// Apply the trailing parameter (if any) ahead of dispatch.
    fn flush_param(&mut self) {
        if self.slot_open {
            let param = if self.accum_digits {
                Param::new(self.accum as u16)
            } else {
                Param::MISSING
            };
            if !self.params.push(param) {
                self.ignored = true;
            }
            self.accum = 0;
            self.accum_digits = false;
            self.slot_open = false;
        }
    }

    fn command(&self, final_byte: u8) -> Command {
        let intermediate = if self.num_intermediates > 0 {
            self.intermediates[0]
        } else {
            0
        };
        Command::new(self.marker, intermediate, final_byte)
    }

    // ── OSC ─────────────────────────────────────────────────────────

    fn osc_put(&mut self, byte: u8) {
        if byte == b';' && self.num_fields < MAX_OSC_FIELDS {
            let end = self.data.len();
            self.fields[self.num_fields - 1].1 = end;
            self.fields[self.num_fields] = (end, end);
            self.num_fields += 1;
            return;
        }
        if self.data.len() < self.limits.max_string_bytes {
            self.data.push(byte);
        }
    }

    fn dispatch_osc<H: Handler>(&mut self, handler: &mut H, bell: bool, cancelled: bool) {
        if self.num_fields == 0 {
            return;
        }
        self.fields[self.num_fields - 1].1 = self.data.len();

        // Fields are slices into the payload buffer: no copies, valid for
        // the duration of the callback only.
        let mut out: [&[u8]; MAX_OSC_FIELDS] = [&[]; MAX_OSC_FIELDS];
        for (slot, &(start, end)) in out.iter_mut().zip(&self.fields[..self.num_fields]) {
            *slot = &self.data[start..end];
        }
        handler.osc_dispatch(&out[..self.num_fields], bell, cancelled);
        self.num_fields = 0;
    }

    // ── UTF-8 ───────────────────────────────────────────────────────

    fn advance_utf8<H: Handler>(&mut self, handler: &mut H, byte: u8) {
        if !(0x80..=0xBF).contains(&byte) {
            // Malformed sequence: drop it and reprocess this byte fresh.
            self.utf8_len = 0;
            self.state = State::Ground;
            self.advance(handler, byte);
            return;
        }

        self.utf8[self.utf8_len as usize] = byte;
        self.utf8_len += 1;
        if self.utf8_len < self.utf8_need {
            return;
        }

        let len = self.utf8_len as usize;
        self.utf8_len = 0;
        self.state = State::Ground;
        if let Ok(s) = core::str::from_utf8(&self.utf8[..len]) {
            let width = s.chars().next().map(char_width).unwrap_or(0);
            handler.print(s, width);
        }
        // Overlong or out-of-range encodings fail the decode and are dropped.
    }
}

/// Total byte length of a UTF-8 sequence, from its lead byte's high bits.
#[inline]
const fn utf8_len(lead: u8) -> u8 {
    match lead {
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        _ => 4,
    }
}
