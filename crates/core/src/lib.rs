//! MOESI multiprocessor cache-coherence simulator library.
//!
//! This crate implements a small shared-memory multiprocessor with a MOESI
//! coherence protocol:
//! 1. **Common:** address/data word types, coherence states, and the crate's
//!    error type.
//! 2. **Config:** validated system configuration (`SystemConfig`).
//! 3. **Instruction:** the `CALC`/`READ`/`WRITE` instructions processors generate
//!    and issue.
//! 4. **Cache:** each processor's private, fully-associative cache.
//! 5. **Bus/Memory:** the shared bus arbiter and the single backing memory.
//! 6. **Coherence:** the read-miss/write-miss/write-hit protocol engine.
//! 7. **Processor/System:** a single processor and the thread-per-processor
//!    driver that free-runs the whole machine.
//! 8. **Snapshot/Stats:** frozen views and run statistics for observers.

/// Address, data, state, and error types shared across the simulator.
pub mod common;
/// Simulator configuration (defaults and `SystemConfig`).
pub mod config;
/// Each processor's private cache.
pub mod cache;
/// The shared bus arbiter.
pub mod bus;
/// Shared main memory.
pub mod memory;
/// The MOESI coherence engine.
pub mod coherence;
/// Instructions processors generate and execute.
pub mod instruction;
/// A single processor.
pub mod processor;
/// The whole simulated system and its driver threads.
pub mod system;
/// Frozen views of the system for observers.
pub mod snapshot;
/// Run statistics.
pub mod stats;

/// Address/data/state/error types.
pub use crate::common::{Address, CacheLineState, HexWord, SimError};
/// Validated top-level configuration.
pub use crate::config::SystemConfig;
/// The coherence protocol engine.
pub use crate::coherence::CoherenceEngine;
/// Generated/issued instructions.
pub use crate::instruction::{Instruction, InstructionKind};
/// The whole simulated system; construct with `System::new`.
pub use crate::system::System;
