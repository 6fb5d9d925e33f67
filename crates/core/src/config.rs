//! Configuration for the MOESI multiprocessor simulator.
//!
//! This module defines the configuration structure used to parameterize the
//! simulator (§10). It provides:
//! 1. **Defaults:** baseline constants matching the canonical scenario in the design
//!    (16-word memory, 4-block caches, 2-way informational associativity, 1 Hz).
//! 2. **Validation:** `SystemConfig::validate` rejects impossible configurations
//!    (non-power-of-two memory, zero processors, out-of-range frequency) before a
//!    `System` is ever built.

use serde::{Deserialize, Serialize};

use crate::common::{SimError, addr_width_for};

/// Default configuration constants for the simulator.
pub mod defaults {
    /// Number of processors when unset.
    pub const N_PROCESSORS: usize = 2;

    /// Number of addressable memory words (must be a power of two).
    pub const MEMORY_SIZE: usize = 16;

    /// Number of blocks each processor's private cache holds.
    pub const CACHE_CAPACITY: usize = 4;

    /// Informational associativity reported alongside a cache (§4.2; replacement
    /// policy itself is always random-among-non-M/O regardless of this value).
    pub const ASSOCIATIVITY: usize = 2;

    /// Default free-run clock frequency in Hz.
    pub const FREQUENCY_HZ: f64 = 1.0;

    /// Open interval bound the clock frequency must fall within, §4.6.
    pub const MAX_FREQUENCY_HZ: f64 = 8.0;
}

/// Top-level simulator configuration.
///
/// Constructed via `SystemConfig::default()` for the canonical scenario, or
/// deserialized from a JSON scenario file passed to the CLI.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Number of processors sharing the bus.
    pub n_processors: usize,
    /// Number of addressable memory words; must be a power of two.
    pub memory_size: usize,
    /// Number of blocks in each processor's private cache.
    pub cache_capacity: usize,
    /// Informational associativity (does not affect the eviction rule).
    pub associativity: usize,
    /// Free-run clock frequency in Hz; must lie in `(0, 8)`.
    pub frequency_hz: f64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            n_processors: defaults::N_PROCESSORS,
            memory_size: defaults::MEMORY_SIZE,
            cache_capacity: defaults::CACHE_CAPACITY,
            associativity: defaults::ASSOCIATIVITY,
            frequency_hz: defaults::FREQUENCY_HZ,
        }
    }
}

impl SystemConfig {
    /// Validates this configuration, returning the derived address bit width on success.
    pub fn validate(&self) -> Result<u32, SimError> {
        if self.n_processors == 0 {
            return Err(SimError::InvalidProcessorCount(self.n_processors));
        }
        if self.cache_capacity == 0 {
            return Err(SimError::InvalidCacheCapacity(self.cache_capacity));
        }
        if !(0.0 < self.frequency_hz && self.frequency_hz < defaults::MAX_FREQUENCY_HZ) {
            return Err(SimError::InvalidFrequency(self.frequency_hz));
        }
        addr_width_for(self.memory_size)
    }
}
