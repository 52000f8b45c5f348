//! Single-shot sequence decoding.
//!
//! For callers that already hold a whole buffer (slicing a styled string,
//! measuring its display width, skipping over escape sequences) a stateful
//! [`Parser`](crate::parser::Parser) is overkill. [`decode`] takes a byte
//! slice and a start state and returns exactly one unit: a grapheme cluster
//! with its display width, or a complete control/escape sequence with width
//! zero. The returned state lets truncated input resume on the next call.
//!
//! String bodies (OSC, DCS, SOS/PM/APC) are skipped with `memchr` rather
//! than walked byte by byte; payloads routinely dwarf their framing.

use memchr::{memchr2, memchr3};

use crate::table::{self, State};
use crate::width::{char_width, cluster_width, WidthMethod};
use unicode_segmentation::UnicodeSegmentation;

/// One decoded unit of a byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded<'a> {
    /// The bytes of this unit (grapheme cluster or control sequence).
    pub seq: &'a [u8],
    /// Display columns this unit occupies. Zero for control sequences and
    /// invalid bytes.
    pub width: usize,
    /// Bytes consumed; always `seq.len()`, kept separate for cursor math.
    pub n: usize,
    /// State to pass to the next call. [`State::Ground`] means the unit is
    /// complete; anything else means the buffer ended mid-sequence.
    pub state: State,
}

/// Decode one unit under the grapheme width policy.
#[inline]
pub fn decode(bytes: &[u8], state: State) -> Decoded<'_> {
    decode_with(bytes, state, WidthMethod::Grapheme)
}

/// Decode one unit: a grapheme cluster (or single codepoint under
/// [`WidthMethod::Wcwidth`]) or one complete control sequence.
///
/// An empty input returns a zero-length unit with the state unchanged. A
/// buffer ending mid-sequence returns everything consumed so far along with
/// the resume state; feed the remaining bytes with that state to continue.
/// Resuming mid-scalar ([`State::Utf8`]) cannot recover the stashed lead
/// bytes, so the continuation is consumed with width zero.
pub fn decode_with(bytes: &[u8], state: State, method: WidthMethod) -> Decoded<'_> {
    let Some(&first) = bytes.first() else {
        return Decoded {
            seq: bytes,
            width: 0,
            n: 0,
            state,
        };
    };

    if state == State::Utf8 {
        let n = bytes
            .iter()
            .take(3)
            .take_while(|&&b| (0x80..=0xBF).contains(&b))
            .count();
        if n == 0 {
            return decode_with(bytes, State::Ground, method);
        }
        return Decoded {
            seq: &bytes[..n],
            width: 0,
            n,
            state: State::Ground,
        };
    }

    if state == State::Ground && ((0x20..=0x7E).contains(&first) || first >= 0xC2) {
        return decode_text(bytes, method);
    }

    decode_sequence(bytes, state)
}

/// Decode a printable unit from the front of the buffer.
fn decode_text(bytes: &[u8], method: WidthMethod) -> Decoded<'_> {
    let Some(chunk) = bytes.utf8_chunks().next() else {
        return Decoded {
            seq: &bytes[..0],
            width: 0,
            n: 0,
            state: State::Ground,
        };
    };

    let valid = chunk.valid();
    if valid.is_empty() {
        let bad = chunk.invalid();
        if bad.len() == bytes.len() && is_incomplete_scalar(bad) {
            // Truncated at the end of the buffer, not malformed.
            return Decoded {
                seq: bytes,
                width: 0,
                n: bytes.len(),
                state: State::Utf8,
            };
        }
        return Decoded {
            seq: &bytes[..1],
            width: 0,
            n: 1,
            state: State::Ground,
        };
    }

    let (n, width) = match method {
        WidthMethod::Grapheme => match valid.graphemes(true).next() {
            Some(g) => (g.len(), cluster_width(g)),
            None => (0, 0),
        },
        WidthMethod::Wcwidth => match valid.chars().next() {
            Some(c) => (c.len_utf8(), char_width(c)),
            None => (0, 0),
        },
    };
    Decoded {
        seq: &bytes[..n],
        width,
        n,
        state: State::Ground,
    }
}

/// Walk one control/escape sequence to completion or end of buffer.
fn decode_sequence(bytes: &[u8], mut state: State) -> Decoded<'_> {
    let mut i = 0;
    while i < bytes.len() {
        if i > 0 && state == State::Ground {
            break;
        }
        if state.is_string() {
            // Fast-forward the payload to the next terminator candidate.
            match next_terminator(&bytes[i..], state == State::OscString) {
                Some(skip) => i += skip,
                None => {
                    i = bytes.len();
                    break;
                }
            }
        }
        let b = bytes[i];
        i += 1;
        state = step(state, b);
    }
    Decoded {
        seq: &bytes[..i],
        width: 0,
        n: i,
        state,
    }
}

/// One transition, with the same interceptors the stateful parser applies
/// before its table lookup.
fn step(state: State, byte: u8) -> State {
    match byte {
        0x1B => State::Escape,
        0x18 | 0x1A | 0x9C => State::Ground,
        0x07 if state == State::OscString => State::Ground,
        _ => table::lookup(state, byte).1,
    }
}

/// Offset of the next byte that can end a string body: ESC, 8-bit ST,
/// CAN/SUB, and for OSC also BEL.
fn next_terminator(bytes: &[u8], bel_terminates: bool) -> Option<usize> {
    let st = if bel_terminates {
        memchr3(0x1B, 0x9C, 0x07, bytes)
    } else {
        memchr2(0x1B, 0x9C, bytes)
    };
    let cancel = memchr2(0x18, 0x1A, bytes);
    match (st, cancel) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

/// Whether `bytes` is a proper prefix of one UTF-8 scalar.
fn is_incomplete_scalar(bytes: &[u8]) -> bool {
    let Some(&lead) = bytes.first() else {
        return false;
    };
    let need = match lead {
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => return false,
    };
    bytes.len() < need && bytes[1..].iter().all(|&b| (0x80..=0xBF).contains(&b))
}
