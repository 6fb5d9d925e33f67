//! Frozen, consistent views of the whole system, built for the observation
//! surface (§6). A snapshot never holds a lock once built, so the CLI/UI layer
//! can hang onto it for as long as it likes without blocking a running system.

use crate::cache::BlockView;
use crate::common::{Address, CacheLineState, HexWord};
use crate::instruction::format_instruction;

/// One cache line, as reported to an observer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CacheLineSnapshot {
    /// The line's tag address (meaningless when `state` is `Invalid`).
    pub address: Address,
    /// The line's data (meaningless when `state` is `Invalid`).
    pub data: HexWord,
    /// The line's coherence state.
    pub state: CacheLineState,
}

impl From<BlockView> for CacheLineSnapshot {
    fn from(view: BlockView) -> Self {
        Self {
            address: view.address,
            data: view.data,
            state: view.state,
        }
    }
}

/// One processor, as reported to an observer.
#[derive(Clone, Debug, PartialEq)]
pub struct ProcessorSnapshot {
    /// 1-based processor identifier (§3).
    pub display_id: usize,
    /// `processor_state(i)` (§6): one of the execution state names, or
    /// `"MISS <addr>"` while parked on a miss.
    pub state: String,
    /// The instruction currently in flight, pre-formatted per §6 (`"NOP"` if
    /// this processor is `IDLE`).
    pub current_instruction: String,
    /// The last instruction this processor completed, pre-formatted per §6
    /// (`"NOP"` if it has never completed one).
    pub last_instruction: String,
    /// This processor's private cache, one entry per block, in block order.
    pub cache: Vec<CacheLineSnapshot>,
    /// The informational associativity this processor's cache was built with.
    pub associativity: usize,
}

/// The whole system, as reported to an observer.
#[derive(Clone, Debug, PartialEq)]
pub struct SystemSnapshot {
    /// Every processor, in ascending display-id order.
    pub processors: Vec<ProcessorSnapshot>,
    /// Every word of shared memory, in address order.
    pub memory: Vec<HexWord>,
    /// `true` if no processor currently holds the bus.
    pub bus_free: bool,
    /// The clock frequency in effect when this snapshot was taken.
    pub frequency_hz: f64,
}

pub(crate) fn processor_snapshot(
    display_id: usize,
    state: String,
    current_instruction: Option<crate::instruction::Instruction>,
    last_instruction: Option<crate::instruction::Instruction>,
    cache: Vec<BlockView>,
    associativity: usize,
) -> ProcessorSnapshot {
    ProcessorSnapshot {
        display_id,
        state,
        current_instruction: format_instruction(current_instruction.as_ref()),
        last_instruction: format_instruction(last_instruction.as_ref()),
        cache: cache.into_iter().map(CacheLineSnapshot::from).collect(),
        associativity,
    }
}
