//! CSI/DCS parameter storage.
//!
//! Parameters are accumulated into fixed storage while a sequence is being
//! parsed, so a hostile stream can never force an allocation. Each slot packs
//! a 16-bit value plus two flag bits into a `u32`:
//!
//! ```text
//! [17: has-more] [16: missing] [15-0: value]
//! ```
//!
//! A `;` boundary starts a new top-level parameter; a `:` boundary starts a
//! sub-parameter of the current one, recorded by setting the has-more bit on
//! the slot being closed. An empty slot (`1;;3`) is stored as the MISSING
//! sentinel, never as zero, so consumers can tell "omitted" from "explicit 0".

/// Maximum number of stored parameters per sequence.
///
/// Once the cap is reached further parameter bytes are consumed but dropped,
/// and the sequence is dispatched with its `ignored` flag set.
pub const MAX_PARAMS: usize = 32;

/// A single parsed parameter slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Param(u32);

impl Param {
    const VALUE_MASK: u32 = 0xFFFF;
    const MISSING_BIT: u32 = 1 << 16;
    const MORE_BIT: u32 = 1 << 17;

    /// The sentinel for an omitted parameter (`CSI ;5H` row slot).
    pub const MISSING: Self = Self(Self::MISSING_BIT);

    /// Create a parameter with an explicit value.
    #[inline]
    pub const fn new(value: u16) -> Self {
        Self(value as u32)
    }

    /// The stored value. Missing parameters read as 0.
    #[inline]
    pub const fn value(self) -> u16 {
        (self.0 & Self::VALUE_MASK) as u16
    }

    /// The stored value, or `default` if the parameter was omitted.
    #[inline]
    pub const fn value_or(self, default: u16) -> u16 {
        if self.is_missing() {
            default
        } else {
            (self.0 & Self::VALUE_MASK) as u16
        }
    }

    /// Whether this slot was omitted (`;;`).
    #[inline]
    pub const fn is_missing(self) -> bool {
        self.0 & Self::MISSING_BIT != 0
    }

    /// Whether this slot is followed by a sub-parameter of the same group
    /// (the boundary after it was `:` rather than `;`).
    #[inline]
    pub const fn has_more(self) -> bool {
        self.0 & Self::MORE_BIT != 0
    }

    /// Return a copy with the has-more bit set.
    #[inline]
    pub(crate) const fn with_more(self) -> Self {
        Self(self.0 | Self::MORE_BIT)
    }
}

impl core::fmt::Debug for Param {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_missing() {
            write!(f, "Param(missing)")?;
        } else {
            write!(f, "Param({})", self.value())?;
        }
        if self.has_more() {
            write!(f, "+")?;
        }
        Ok(())
    }
}

/// Fixed-capacity parameter list for one CSI/DCS sequence.
#[derive(Clone, Copy)]
pub struct Params {
    buf: [Param; MAX_PARAMS],
    len: usize,
}

impl Params {
    /// Create an empty list.
    pub const fn new() -> Self {
        Self {
            buf: [Param::MISSING; MAX_PARAMS],
            len: 0,
        }
    }

    /// Number of stored parameters (top-level and sub-parameters combined).
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether no parameters were supplied.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the storage cap has been reached.
    #[inline]
    pub const fn is_full(&self) -> bool {
        self.len == MAX_PARAMS
    }

    /// Get the parameter at `index`, if present.
    #[inline]
    pub fn get(&self, index: usize) -> Option<Param> {
        self.as_slice().get(index).copied()
    }

    /// The value at `index`, or `default` when absent or omitted.
    ///
    /// This is the common accessor for CSI handlers ("Ps defaults to 1").
    #[inline]
    pub fn value_or(&self, index: usize, default: u16) -> u16 {
        match self.get(index) {
            Some(p) => p.value_or(default),
            None => default,
        }
    }

    /// All stored slots in order, sub-parameters inline.
    #[inline]
    pub fn as_slice(&self) -> &[Param] {
        &self.buf[..self.len]
    }

    /// Iterate over stored slots.
    pub fn iter(&self) -> impl Iterator<Item = Param> + '_ {
        self.as_slice().iter().copied()
    }

    /// Append a slot. Returns false (dropping the value) when full.
    pub(crate) fn push(&mut self, param: Param) -> bool {
        if self.len == MAX_PARAMS {
            return false;
        }
        self.buf[self.len] = param;
        self.len += 1;
        true
    }

    /// Mark the most recently pushed slot as having sub-parameters.
    pub(crate) fn mark_more(&mut self) {
        if self.len > 0 {
            self.buf[self.len - 1] = self.buf[self.len - 1].with_more();
        }
    }

    /// Remove all slots.
    pub(crate) fn clear(&mut self) {
        self.len = 0;
    }
}

impl Default for Params {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Params {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl PartialEq for Params {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for Params {}
