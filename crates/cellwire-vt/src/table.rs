//! The VT500-series state machine as static data.
//!
//! The grammar is a dense function of `(state, byte)`, so it is expressed as
//! a compile-time 2D table: one 256-entry row per state, each entry packing
//! an [`Action`] in the high nibble and the next [`State`] in the low nibble.
//! The table is read-only after construction.
//!
//! Deviations from the literal VT500 diagram, to tolerate modern streams:
//!
//! - UTF-8 lead bytes (0xC2-0xF4) transition to the [`State::Utf8`] buffering
//!   state from any non-string state, so multi-byte characters are decoded
//!   whole instead of leaking continuation bytes as C1 controls.
//! - OSC, DCS-passthrough, and SOS/PM/APC data ranges are widened from 0x7E
//!   to 0xFF so UTF-8 payload bytes are collected rather than misrouted
//!   (0x9C still terminates, as the 8-bit ST).
//! - `:` (0x3A) is a parameter byte, not a route to the ignore state, so
//!   SGR sub-parameters (`38:2::r:g:b`, `4:3`) parse.
//!
//! ESC, CAN, SUB, BEL-in-OSC, and 8-bit ST need terminator/cancellation
//! bookkeeping, so the parser intercepts them before the table lookup; their
//! table entries are never consulted.

/// Parser states.
///
/// `Ground` is both the initial state and the steady state between sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum State {
    #[default]
    Ground = 0,
    Escape = 1,
    EscapeIntermediate = 2,
    CsiEntry = 3,
    CsiParam = 4,
    CsiIntermediate = 5,
    CsiIgnore = 6,
    DcsEntry = 7,
    DcsParam = 8,
    DcsIntermediate = 9,
    DcsPassthrough = 10,
    DcsIgnore = 11,
    OscString = 12,
    SosPmApcString = 13,
    /// Buffering a multi-byte UTF-8 sequence (handled in code, not via the
    /// table).
    Utf8 = 14,
}

/// Number of states, and rows in the transition table.
pub const STATE_COUNT: usize = 15;

impl State {
    /// Whether the parser is inside an OSC/DCS/SOS/PM/APC string body.
    #[inline]
    pub const fn is_string(self) -> bool {
        matches!(
            self,
            State::DcsPassthrough | State::DcsIgnore | State::OscString | State::SosPmApcString
        )
    }

    #[inline]
    pub(crate) const fn from_u8(v: u8) -> Self {
        match v {
            1 => State::Escape,
            2 => State::EscapeIntermediate,
            3 => State::CsiEntry,
            4 => State::CsiParam,
            5 => State::CsiIntermediate,
            6 => State::CsiIgnore,
            7 => State::DcsEntry,
            8 => State::DcsParam,
            9 => State::DcsIntermediate,
            10 => State::DcsPassthrough,
            11 => State::DcsIgnore,
            12 => State::OscString,
            13 => State::SosPmApcString,
            14 => State::Utf8,
            _ => State::Ground,
        }
    }
}

/// Per-byte actions encoded in the table.
///
/// Entry/exit work (clearing accumulators, hooking/unhooking DCS, opening
/// and dispatching strings) is keyed off the state *transition* in the
/// parser, not off table entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Action {
    /// Consume and drop the byte.
    Ignore = 0,
    /// Emit the byte as printable text.
    Print = 1,
    /// Emit a C0/C1 control code.
    Execute = 2,
    /// Append to intermediates / private marker, or start UTF-8 buffering.
    Collect = 3,
    /// Fold a digit into the parameter accumulator, or close a slot.
    Param = 4,
    /// Dispatch a completed ESC sequence.
    EscDispatch = 5,
    /// Dispatch a completed CSI sequence.
    CsiDispatch = 6,
    /// Stream one DCS payload byte.
    Put = 7,
    /// Buffer one OSC payload byte.
    OscPut = 8,
    /// Buffer one SOS/PM/APC payload byte.
    StrPut = 9,
}

impl Action {
    #[inline]
    pub(crate) const fn from_u8(v: u8) -> Self {
        match v {
            1 => Action::Print,
            2 => Action::Execute,
            3 => Action::Collect,
            4 => Action::Param,
            5 => Action::EscDispatch,
            6 => Action::CsiDispatch,
            7 => Action::Put,
            8 => Action::OscPut,
            9 => Action::StrPut,
            _ => Action::Ignore,
        }
    }
}

/// Pack an action and next state into one table entry.
const fn pack(action: Action, state: State) -> u8 {
    ((action as u8) << 4) | (state as u8)
}

/// Unpack a table entry.
#[inline]
pub(crate) const fn unpack(entry: u8) -> (Action, State) {
    (Action::from_u8(entry >> 4), State::from_u8(entry & 0x0F))
}

const fn fill(
    table: &mut [[u8; 256]; STATE_COUNT],
    state: State,
    lo: u8,
    hi: u8,
    action: Action,
    next: State,
) {
    let mut b = lo as usize;
    while b <= hi as usize {
        table[state as usize][b] = pack(action, next);
        b += 1;
    }
}

const fn set(
    table: &mut [[u8; 256]; STATE_COUNT],
    state: State,
    byte: u8,
    action: Action,
    next: State,
) {
    table[state as usize][byte as usize] = pack(action, next);
}

/// Shared suffix for non-string states: C1 controls and UTF-8 lead bytes.
const fn fill_high(table: &mut [[u8; 256]; STATE_COUNT], state: State) {
    use Action::*;
    use State::*;
    // C1 controls execute in place...
    fill(table, state, 0x80, 0x9F, Execute, Ground);
    // ...except the introducers, which open their sequence, and ST, which the
    // parser intercepts.
    set(table, state, 0x90, Ignore, DcsEntry);
    set(table, state, 0x98, Ignore, SosPmApcString);
    set(table, state, 0x9B, Ignore, CsiEntry);
    set(table, state, 0x9C, Ignore, Ground);
    set(table, state, 0x9D, Ignore, OscString);
    set(table, state, 0x9E, Ignore, SosPmApcString);
    set(table, state, 0x9F, Ignore, SosPmApcString);
    // Stray GR bytes are dropped; valid UTF-8 lead bytes start buffering.
    fill(table, state, 0xA0, 0xFF, Ignore, Ground);
    fill(table, state, 0xC2, 0xF4, Collect, Utf8);
}

const fn build_table() -> [[u8; 256]; STATE_COUNT] {
    use Action::*;
    use State::*;

    let mut t = [[0u8; 256]; STATE_COUNT];

    // ── Ground ──────────────────────────────────────────────────────
    fill(&mut t, Ground, 0x00, 0x1F, Execute, Ground);
    fill(&mut t, Ground, 0x20, 0x7E, Print, Ground);
    set(&mut t, Ground, 0x7F, Ignore, Ground);
    fill_high(&mut t, Ground);

    // ── Escape ──────────────────────────────────────────────────────
    fill(&mut t, Escape, 0x00, 0x1F, Execute, Escape);
    fill(&mut t, Escape, 0x20, 0x2F, Collect, EscapeIntermediate);
    fill(&mut t, Escape, 0x30, 0x7E, EscDispatch, Ground);
    set(&mut t, Escape, b'P', Ignore, DcsEntry);
    set(&mut t, Escape, b'X', Ignore, SosPmApcString);
    set(&mut t, Escape, b'[', Ignore, CsiEntry);
    set(&mut t, Escape, b']', Ignore, OscString);
    set(&mut t, Escape, b'^', Ignore, SosPmApcString);
    set(&mut t, Escape, b'_', Ignore, SosPmApcString);
    set(&mut t, Escape, 0x7F, Ignore, Escape);
    fill_high(&mut t, Escape);

    // ── Escape intermediate ─────────────────────────────────────────
    fill(&mut t, EscapeIntermediate, 0x00, 0x1F, Execute, EscapeIntermediate);
    fill(&mut t, EscapeIntermediate, 0x20, 0x2F, Collect, EscapeIntermediate);
    fill(&mut t, EscapeIntermediate, 0x30, 0x7E, EscDispatch, Ground);
    set(&mut t, EscapeIntermediate, 0x7F, Ignore, EscapeIntermediate);
    fill_high(&mut t, EscapeIntermediate);

    // ── CSI entry ───────────────────────────────────────────────────
    fill(&mut t, CsiEntry, 0x00, 0x1F, Execute, CsiEntry);
    fill(&mut t, CsiEntry, 0x20, 0x2F, Collect, CsiIntermediate);
    fill(&mut t, CsiEntry, 0x30, 0x3B, Param, CsiParam);
    fill(&mut t, CsiEntry, 0x3C, 0x3F, Collect, CsiParam);
    fill(&mut t, CsiEntry, 0x40, 0x7E, CsiDispatch, Ground);
    set(&mut t, CsiEntry, 0x7F, Ignore, CsiEntry);
    fill_high(&mut t, CsiEntry);

    // ── CSI param ───────────────────────────────────────────────────
    fill(&mut t, CsiParam, 0x00, 0x1F, Execute, CsiParam);
    fill(&mut t, CsiParam, 0x20, 0x2F, Collect, CsiIntermediate);
    fill(&mut t, CsiParam, 0x30, 0x3B, Param, CsiParam);
    // A private marker after parameters is malformed; swallow the rest.
    fill(&mut t, CsiParam, 0x3C, 0x3F, Ignore, CsiIgnore);
    fill(&mut t, CsiParam, 0x40, 0x7E, CsiDispatch, Ground);
    set(&mut t, CsiParam, 0x7F, Ignore, CsiParam);
    fill_high(&mut t, CsiParam);

    // ── CSI intermediate ────────────────────────────────────────────
    fill(&mut t, CsiIntermediate, 0x00, 0x1F, Execute, CsiIntermediate);
    fill(&mut t, CsiIntermediate, 0x20, 0x2F, Collect, CsiIntermediate);
    fill(&mut t, CsiIntermediate, 0x30, 0x3F, Ignore, CsiIgnore);
    fill(&mut t, CsiIntermediate, 0x40, 0x7E, CsiDispatch, Ground);
    set(&mut t, CsiIntermediate, 0x7F, Ignore, CsiIntermediate);
    fill_high(&mut t, CsiIntermediate);

    // ── CSI ignore ──────────────────────────────────────────────────
    fill(&mut t, CsiIgnore, 0x00, 0x1F, Execute, CsiIgnore);
    fill(&mut t, CsiIgnore, 0x20, 0x3F, Ignore, CsiIgnore);
    fill(&mut t, CsiIgnore, 0x40, 0x7E, Ignore, Ground);
    set(&mut t, CsiIgnore, 0x7F, Ignore, CsiIgnore);
    fill_high(&mut t, CsiIgnore);

    // ── DCS entry ───────────────────────────────────────────────────
    fill(&mut t, DcsEntry, 0x00, 0x1F, Ignore, DcsEntry);
    fill(&mut t, DcsEntry, 0x20, 0x2F, Collect, DcsIntermediate);
    fill(&mut t, DcsEntry, 0x30, 0x3B, Param, DcsParam);
    fill(&mut t, DcsEntry, 0x3C, 0x3F, Collect, DcsParam);
    fill(&mut t, DcsEntry, 0x40, 0x7E, Ignore, DcsPassthrough);
    set(&mut t, DcsEntry, 0x7F, Ignore, DcsEntry);
    fill_high(&mut t, DcsEntry);

    // ── DCS param ───────────────────────────────────────────────────
    fill(&mut t, DcsParam, 0x00, 0x1F, Ignore, DcsParam);
    fill(&mut t, DcsParam, 0x20, 0x2F, Collect, DcsIntermediate);
    fill(&mut t, DcsParam, 0x30, 0x3B, Param, DcsParam);
    fill(&mut t, DcsParam, 0x3C, 0x3F, Ignore, DcsIgnore);
    fill(&mut t, DcsParam, 0x40, 0x7E, Ignore, DcsPassthrough);
    set(&mut t, DcsParam, 0x7F, Ignore, DcsParam);
    fill_high(&mut t, DcsParam);

    // ── DCS intermediate ────────────────────────────────────────────
    fill(&mut t, DcsIntermediate, 0x00, 0x1F, Ignore, DcsIntermediate);
    fill(&mut t, DcsIntermediate, 0x20, 0x2F, Collect, DcsIntermediate);
    fill(&mut t, DcsIntermediate, 0x30, 0x3F, Ignore, DcsIgnore);
    fill(&mut t, DcsIntermediate, 0x40, 0x7E, Ignore, DcsPassthrough);
    set(&mut t, DcsIntermediate, 0x7F, Ignore, DcsIntermediate);
    fill_high(&mut t, DcsIntermediate);

    // ── DCS passthrough ─────────────────────────────────────────────
    // C0 data is streamed too (sixel uses raw control bytes); the payload
    // range runs to 0xFF for UTF-8. ESC/CAN/SUB/ST are intercepted.
    fill(&mut t, DcsPassthrough, 0x00, 0x7F, Put, DcsPassthrough);
    fill(&mut t, DcsPassthrough, 0x80, 0xFF, Put, DcsPassthrough);

    // ── DCS ignore ──────────────────────────────────────────────────
    fill(&mut t, DcsIgnore, 0x00, 0xFF, Ignore, DcsIgnore);

    // ── OSC string ──────────────────────────────────────────────────
    // BEL termination is intercepted in the parser; other C0 is dropped.
    fill(&mut t, OscString, 0x00, 0x1F, Ignore, OscString);
    fill(&mut t, OscString, 0x20, 0xFF, OscPut, OscString);

    // ── SOS/PM/APC string ───────────────────────────────────────────
    fill(&mut t, SosPmApcString, 0x00, 0x1F, Ignore, SosPmApcString);
    fill(&mut t, SosPmApcString, 0x20, 0xFF, StrPut, SosPmApcString);

    t
}

/// The transition table, indexed `TABLE[state as usize][byte as usize]`.
pub(crate) static TABLE: [[u8; 256]; STATE_COUNT] = build_table();

/// Look up the `(action, next_state)` pair for a byte in a state.
#[inline]
pub(crate) fn lookup(state: State, byte: u8) -> (Action, State) {
    unpack(TABLE[state as usize][byte as usize])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ground_printables_print() {
        for b in 0x20..=0x7E_u8 {
            assert_eq!(lookup(State::Ground, b), (Action::Print, State::Ground));
        }
    }

    #[test]
    fn ground_c0_executes() {
        assert_eq!(lookup(State::Ground, 0x07), (Action::Execute, State::Ground));
        assert_eq!(lookup(State::Ground, b'\n'), (Action::Execute, State::Ground));
        assert_eq!(lookup(State::Ground, 0x7F), (Action::Ignore, State::Ground));
    }

    #[test]
    fn c1_introducers_route() {
        assert_eq!(lookup(State::Ground, 0x9B).1, State::CsiEntry);
        assert_eq!(lookup(State::Ground, 0x90).1, State::DcsEntry);
        assert_eq!(lookup(State::Ground, 0x9D).1, State::OscString);
        assert_eq!(lookup(State::Ground, 0x98).1, State::SosPmApcString);
        assert_eq!(lookup(State::Ground, 0x9E).1, State::SosPmApcString);
        assert_eq!(lookup(State::Ground, 0x9F).1, State::SosPmApcString);
        // 8-bit ST alone is a no-op terminator.
        assert_eq!(lookup(State::Ground, 0x9C), (Action::Ignore, State::Ground));
    }

    #[test]
    fn utf8_lead_bytes_enter_buffering() {
        assert_eq!(lookup(State::Ground, 0xC2).1, State::Utf8);
        assert_eq!(lookup(State::Ground, 0xE4).1, State::Utf8);
        assert_eq!(lookup(State::Ground, 0xF0).1, State::Utf8);
        // Overlong / out-of-range leads never do.
        assert_eq!(lookup(State::Ground, 0xC0).1, State::Ground);
        assert_eq!(lookup(State::Ground, 0xC1).1, State::Ground);
        assert_eq!(lookup(State::Ground, 0xF5).1, State::Ground);
        assert_eq!(lookup(State::Ground, 0xFF).1, State::Ground);
    }

    #[test]
    fn escape_routes_to_sequence_states() {
        assert_eq!(lookup(State::Escape, b'['), (Action::Ignore, State::CsiEntry));
        assert_eq!(lookup(State::Escape, b']').1, State::OscString);
        assert_eq!(lookup(State::Escape, b'P').1, State::DcsEntry);
        assert_eq!(lookup(State::Escape, b'X').1, State::SosPmApcString);
        assert_eq!(lookup(State::Escape, b'_').1, State::SosPmApcString);
        // Everything else in the final range dispatches.
        assert_eq!(lookup(State::Escape, b'7'), (Action::EscDispatch, State::Ground));
        assert_eq!(lookup(State::Escape, b'\\'), (Action::EscDispatch, State::Ground));
    }

    #[test]
    fn csi_private_markers_collect_only_at_entry() {
        assert_eq!(lookup(State::CsiEntry, b'?'), (Action::Collect, State::CsiParam));
        assert_eq!(lookup(State::CsiParam, b'?').1, State::CsiIgnore);
    }

    #[test]
    fn csi_colon_is_a_param_byte() {
        assert_eq!(lookup(State::CsiEntry, b':'), (Action::Param, State::CsiParam));
        assert_eq!(lookup(State::CsiParam, b':'), (Action::Param, State::CsiParam));
    }

    #[test]
    fn csi_ignore_swallows_until_final() {
        assert_eq!(lookup(State::CsiIgnore, b'5'), (Action::Ignore, State::CsiIgnore));
        assert_eq!(lookup(State::CsiIgnore, b'm'), (Action::Ignore, State::Ground));
    }

    #[test]
    fn dcs_final_enters_passthrough() {
        assert_eq!(lookup(State::DcsEntry, b'q').1, State::DcsPassthrough);
        assert_eq!(lookup(State::DcsParam, b'q').1, State::DcsPassthrough);
        assert_eq!(lookup(State::DcsIntermediate, b'q').1, State::DcsPassthrough);
    }

    #[test]
    fn string_bodies_collect_high_bytes() {
        // UTF-8 payload bytes must be data, not C1 reroutes.
        assert_eq!(lookup(State::OscString, 0xC3), (Action::OscPut, State::OscString));
        assert_eq!(lookup(State::OscString, 0x9D), (Action::OscPut, State::OscString));
        assert_eq!(lookup(State::DcsPassthrough, 0xF0), (Action::Put, State::DcsPassthrough));
        assert_eq!(lookup(State::SosPmApcString, 0xA9), (Action::StrPut, State::SosPmApcString));
    }

    #[test]
    fn every_entry_decodes() {
        // No table slot may unpack to an out-of-range state or action.
        for state in 0..STATE_COUNT {
            for byte in 0..=255u8 {
                let (_, next) = unpack(TABLE[state][byte as usize]);
                assert!((next as usize) < STATE_COUNT);
            }
        }
    }
}
