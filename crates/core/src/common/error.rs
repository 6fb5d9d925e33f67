//! Simulator error type.
//!
//! This module defines the crate-wide error representation (§7/§11 of the design).
//! Configuration and boundary errors are returned as `Result<_, SimError>`; they are
//! never panics. A detected coherence invariant violation is represented here too,
//! but is a distinct, fail-fast class: see `coherence::check_invariants`.

use thiserror::Error;

/// Errors surfaced by the simulator's control and observation surfaces.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    /// `set_frequency` was called with a value outside `(0, 8)` Hz.
    #[error("frequency {0} Hz is outside the valid range (0, 8)")]
    InvalidFrequency(f64),

    /// A bit-string or hex-word address/data field failed to parse.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// A memory/cache size was not a power of two, so no address width exists for it.
    #[error("size {0} is not a power of two")]
    NotPowerOfTwo(usize),

    /// `System::new` was asked to build zero processors.
    #[error("processor count must be at least 1, got {0}")]
    InvalidProcessorCount(usize),

    /// `System::new` was asked to build a cache with zero capacity.
    #[error("cache capacity must be at least 1, got {0}")]
    InvalidCacheCapacity(usize),

    /// An observation call referenced a processor index outside `0..processor_count()`.
    #[error("processor index {index} out of range (have {count} processors)")]
    ProcessorIndexOutOfRange {
        /// The index that was requested.
        index: usize,
        /// The number of processors actually configured.
        count: usize,
    },

    /// A coherence invariant (§3/§8) was found to be violated. This is a bug, not a
    /// recoverable runtime condition: callers that see this should treat the system
    /// as halted.
    #[error("coherence invariant violated: {0}")]
    InvariantViolation(String),
}
