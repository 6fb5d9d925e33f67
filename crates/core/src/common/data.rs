//! Cache/memory data word: a 16-bit value encoded as 4 lowercase hex digits.
//!
//! This module defines the fixed-width word type moved around by memory reads,
//! writes, and coherence transfers. It provides:
//! 1. **Fixed encoding:** every word is exactly 4 lowercase hex digits, zero-padded,
//!    matching the observation surface's normative encoding.
//! 2. **Parsing:** `HexWord::from_hex` rejects malformed input rather than truncating.

use std::fmt;

use super::error::SimError;

/// A 16-bit data word, displayed as 4 zero-padded lowercase hex digits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HexWord(pub u16);

impl HexWord {
    /// The all-zero word every cache block and memory word starts as.
    pub const ZERO: HexWord = HexWord(0);

    /// Wraps a raw 16-bit value.
    #[inline]
    pub fn new(value: u16) -> Self {
        Self(value)
    }

    /// The raw 16-bit value.
    #[inline]
    pub fn value(&self) -> u16 {
        self.0
    }

    /// Parses exactly 4 lowercase hex digits into a word.
    pub fn from_hex(s: &str) -> Result<Self, SimError> {
        if s.len() != 4 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(SimError::InvalidAddress(format!(
                "expected 4 hex digits, got \"{s}\""
            )));
        }
        let value = u16::from_str_radix(s, 16)
            .map_err(|_| SimError::InvalidAddress(format!("not hex: \"{s}\"")))?;
        Ok(Self(value))
    }

    /// Renders as 4 zero-padded lowercase hex digits, e.g. `"00ff"`.
    pub fn to_hex(&self) -> String {
        format!("{:04x}", self.0)
    }
}

impl fmt::Display for HexWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<u16> for HexWord {
    fn from(value: u16) -> Self {
        Self(value)
    }
}
