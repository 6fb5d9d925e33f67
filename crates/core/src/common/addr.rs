//! Cache/memory address type: a fixed-width bit string over the shared address space.
//!
//! This module defines a strong type for memory block addresses so that a raw `usize`
//! index and an address never get mixed up across cache, memory, and coherence code.
//! It provides:
//! 1. **Width tracking:** every address carries the bit width (`log2` of memory size)
//!    it was constructed with, so mismatched configurations are caught rather than
//!    silently truncated.
//! 2. **Bit-string conversion:** `Address` round-trips through the zero-padded binary
//!    strings the external observation surface uses (`"0011"`, not `3`).

use std::fmt;

use super::error::SimError;

/// A memory block address: an index plus the bit width it was encoded with.
///
/// Two addresses only compare equal if both the index and the width match, which is
/// what the protocol needs: an address from a 16-word memory and one from a 4-word
/// memory are never the same line even if their integer index happens to coincide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Address {
    index: u32,
    width: u32,
}

impl Address {
    /// Creates an address from a raw block index and bit width.
    ///
    /// # Panics
    ///
    /// Panics if `index` does not fit in `width` bits. Callers that accept indices
    /// from outside the crate should use [`Address::checked_new`] instead.
    pub fn new(index: u32, width: u32) -> Self {
        Self::checked_new(index, width).expect("address index out of range for width")
    }

    /// Fallible constructor used at system boundaries (parsed input, config values).
    pub fn checked_new(index: u32, width: u32) -> Result<Self, SimError> {
        if width == 0 || width >= 32 {
            return Err(SimError::NotPowerOfTwo(1usize << width.min(31)));
        }
        if index >= (1u32 << width) {
            return Err(SimError::InvalidAddress(format!(
                "index {index} does not fit in {width} bits"
            )));
        }
        Ok(Self { index, width })
    }

    /// Parses a zero-padded binary string (e.g. `"0011"`) into an address.
    pub fn from_bits(bits: &str, width: u32) -> Result<Self, SimError> {
        if bits.len() != width as usize {
            return Err(SimError::InvalidAddress(format!(
                "expected {width} bits, got \"{bits}\" ({} bits)",
                bits.len()
            )));
        }
        let index = u32::from_str_radix(bits, 2)
            .map_err(|_| SimError::InvalidAddress(format!("not a binary string: \"{bits}\"")))?;
        Self::checked_new(index, width)
    }

    /// The zero-based block index this address refers to.
    #[inline]
    pub fn index(&self) -> usize {
        self.index as usize
    }

    /// The bit width this address was encoded with.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Renders the address as a zero-padded binary string, e.g. `"0011"`.
    pub fn to_bits(&self) -> String {
        format!("{:0width$b}", self.index, width = self.width as usize)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_bits())
    }
}

/// Computes the address bit width for a given memory size.
///
/// Memory size must be a power of two (so every index maps onto a fixed-width bit
/// string with no wasted or ambiguous encodings).
pub fn addr_width_for(memory_size: usize) -> Result<u32, SimError> {
    if memory_size == 0 || !memory_size.is_power_of_two() {
        return Err(SimError::NotPowerOfTwo(memory_size));
    }
    Ok(memory_size.trailing_zeros())
}
