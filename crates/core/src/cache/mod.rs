//! A processor's private cache: a fixed-size set of blocks (§4.2).
//!
//! Lookup, installation (with eviction), and per-line state transitions all live
//! here. The cache is privately owned by exactly one processor; every other
//! processor only ever touches it through the coherence engine (§4.3), which
//! borrows the same public methods this module exposes.

/// A single cache line.
pub mod block;

use rand::Rng;

pub use block::BlockView;
use block::CacheBlock;

use crate::common::{Address, CacheLineState, HexWord};

/// A processor's private, fixed-size cache.
pub struct Cache {
    blocks: Vec<CacheBlock>,
    associativity: usize,
}

impl Cache {
    /// Builds a cache of `capacity` blocks, all starting `Invalid`. `associativity`
    /// is informational only — it is reported to the observer UI but does not
    /// change the eviction rule (§4.2).
    pub fn new(capacity: usize, associativity: usize, addr_width: u32) -> Self {
        let placeholder = Address::new(0, addr_width);
        let blocks = (0..capacity)
            .map(|_| CacheBlock::new(placeholder))
            .collect();
        Self {
            blocks,
            associativity,
        }
    }

    /// Number of blocks in this cache.
    pub fn capacity(&self) -> usize {
        self.blocks.len()
    }

    /// The informational associativity this cache was configured with.
    pub fn associativity(&self) -> usize {
        self.associativity
    }

    /// Returns the block for `address` iff it holds a valid (`state != Invalid`) line.
    pub fn lookup(&self, address: Address) -> Option<BlockView> {
        self.blocks
            .iter()
            .find(|block| block.matches(address))
            .map(|block| block.view())
    }

    /// Installs `(address, data, state)` into the cache, selecting a victim per
    /// §4.2: (a) an existing block already tagged with `address`, else (b) any
    /// `Invalid` block, else (c) a uniformly random block among those that are not
    /// `Modified`/`Owned`, or a uniformly random block at all if every line is dirty.
    pub fn install(
        &self,
        address: Address,
        data: HexWord,
        state: CacheLineState,
        rng: &mut impl Rng,
    ) {
        if let Some(block) = self
            .blocks
            .iter()
            .find(|block| block.view().address == address)
        {
            block.install(address, data, state);
            return;
        }

        if let Some(block) = self.blocks.iter().find(|block| !block.is_valid()) {
            block.install(address, data, state);
            return;
        }

        let clean_candidates: Vec<usize> = self
            .blocks
            .iter()
            .enumerate()
            .filter(|(_, block)| !block.is_dirty())
            .map(|(idx, _)| idx)
            .collect();

        let victim = if clean_candidates.is_empty() {
            rng.gen_range(0..self.blocks.len())
        } else {
            clean_candidates[rng.gen_range(0..clean_candidates.len())]
        };

        self.blocks[victim].install(address, data, state);
    }

    /// Transitions the existing line for `address` to `state`. A no-op if no block
    /// currently holds a valid line for `address` (§4.2: "undefined if not present";
    /// the coherence engine never calls this except on lines it has just observed
    /// to be valid, so this defensive no-op should never actually trigger).
    pub fn set_state(&self, address: Address, state: CacheLineState) {
        if let Some(block) = self.blocks.iter().find(|block| block.matches(address)) {
            block.set_state(state);
        }
    }

    /// Overwrites the data of the existing line for `address` and sets its new
    /// state, without touching any other block. Used for a local write hit on an
    /// `Modified`/`Exclusive` line, which never needs the bus (§4.3).
    pub fn write_local(&self, address: Address, data: HexWord, state: CacheLineState) {
        if let Some(block) = self.blocks.iter().find(|block| block.matches(address)) {
            block.write_local(data, state);
        }
    }

    /// A frozen snapshot of every block, for the observer UI (§6).
    pub fn snapshot(&self) -> Vec<BlockView> {
        self.blocks.iter().map(|block| block.view()).collect()
    }

    /// Invalidates every block, discarding all cached state (§7: system reset).
    pub fn reset(&self) {
        for block in &self.blocks {
            block.set_state(CacheLineState::Invalid);
        }
    }
}
