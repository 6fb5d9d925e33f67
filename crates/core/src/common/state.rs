//! MOESI cache line coherence state.
//!
//! The five states a cache line can be in, and the small set of queries the
//! coherence engine and cache need on them (§3, §4.3 of the design).

use std::fmt;

/// Coherence state of a single cache line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheLineState {
    /// Exclusive, dirty; memory is stale. Sole writer.
    Modified,
    /// Shared, dirty; this cache is responsible for the eventual writeback.
    Owned,
    /// Sole copy, clean.
    Exclusive,
    /// One of several clean copies.
    Shared,
    /// Line contents are meaningless.
    Invalid,
}

impl CacheLineState {
    /// `true` for every state except `Invalid`.
    #[inline]
    pub fn is_valid(&self) -> bool {
        !matches!(self, CacheLineState::Invalid)
    }

    /// `true` for the two dirty states, `Modified` and `Owned`.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        matches!(self, CacheLineState::Modified | CacheLineState::Owned)
    }

    /// The single-character code used by the observation surface (`M`, `O`, `E`, `S`, `I`).
    pub fn as_char(&self) -> char {
        match self {
            CacheLineState::Modified => 'M',
            CacheLineState::Owned => 'O',
            CacheLineState::Exclusive => 'E',
            CacheLineState::Shared => 'S',
            CacheLineState::Invalid => 'I',
        }
    }
}

impl fmt::Display for CacheLineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl Default for CacheLineState {
    fn default() -> Self {
        CacheLineState::Invalid
    }
}
