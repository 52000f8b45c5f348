//! Compact identifier for a completed CSI/DCS/escape sequence.
//!
//! A sequence is identified by three orthogonal fields: the final byte, an
//! optional private-marker byte (`<`, `=`, `>`, `?`), and an optional single
//! intermediate byte (0x20-0x2F). They pack into one `u32`:
//!
//! ```text
//! [23-16: marker] [15-8: intermediate] [7-0: final byte]
//! ```
//!
//! Zero in the marker/intermediate positions means "absent" (neither range
//! contains NUL).

/// Packed command identity for CSI/DCS/ESC dispatch.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Command(u32);

impl Command {
    /// Build a command from its parts. Absent marker/intermediate are 0.
    #[inline]
    pub const fn new(marker: u8, intermediate: u8, final_byte: u8) -> Self {
        Self(((marker as u32) << 16) | ((intermediate as u32) << 8) | final_byte as u32)
    }

    /// The final byte (0x40-0x7E for CSI, 0x30-0x7E for ESC).
    #[inline]
    pub const fn final_byte(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    /// The intermediate byte, or 0 if none was collected.
    #[inline]
    pub const fn intermediate(self) -> u8 {
        ((self.0 >> 8) & 0xFF) as u8
    }

    /// The private-marker byte (`<`/`=`/`>`/`?`), or 0 if none.
    #[inline]
    pub const fn marker(self) -> u8 {
        ((self.0 >> 16) & 0xFF) as u8
    }

    /// Raw packed value, for use as a match key.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl core::fmt::Debug for Command {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Command(")?;
        if self.marker() != 0 {
            write!(f, "{}", self.marker() as char)?;
        }
        if self.intermediate() != 0 {
            write!(f, "{} ", self.intermediate() as char)?;
        }
        write!(f, "{:?})", self.final_byte() as char)
    }
}
