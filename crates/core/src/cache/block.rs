//! A single cache line: tag, data, coherence state, and the local guard that
//! protects it from the observer UI reading mid-mutation (§3, §5).

use std::sync::Mutex;

use crate::common::{Address, CacheLineState, HexWord};

/// A frozen, consistent view of one cache line, safe to hand to an observer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockView {
    /// The line's tag address. Meaningless (left over from a prior tenant) when
    /// `state` is `Invalid`.
    pub address: Address,
    /// The line's data word. Meaningless when `state` is `Invalid`.
    pub data: HexWord,
    /// The line's coherence state.
    pub state: CacheLineState,
}

struct BlockData {
    address: Address,
    data: HexWord,
    state: CacheLineState,
}

/// One cache line. All reads and writes go through the internal lock so that a
/// snapshot taken by the observer UI never sees a half-updated line (§5, point 3).
pub struct CacheBlock {
    inner: Mutex<BlockData>,
}

impl CacheBlock {
    /// Creates a block in state `Invalid` with zeroed data, tagged with `placeholder`
    /// (never looked up until the block is installed into, since lookups require
    /// `state != Invalid`).
    pub fn new(placeholder: Address) -> Self {
        Self {
            inner: Mutex::new(BlockData {
                address: placeholder,
                data: HexWord::ZERO,
                state: CacheLineState::Invalid,
            }),
        }
    }

    /// Takes a consistent snapshot of the line.
    pub fn view(&self) -> BlockView {
        let guard = self.inner.lock().expect("cache block lock poisoned");
        BlockView {
            address: guard.address,
            data: guard.data,
            state: guard.state,
        }
    }

    /// `true` if this block currently holds a valid line for `address`.
    pub fn matches(&self, address: Address) -> bool {
        let guard = self.inner.lock().expect("cache block lock poisoned");
        guard.state.is_valid() && guard.address == address
    }

    /// `true` if this block holds a valid line (regardless of address).
    pub fn is_valid(&self) -> bool {
        self.inner
            .lock()
            .expect("cache block lock poisoned")
            .state
            .is_valid()
    }

    /// `true` if this block is dirty (`Modified` or `Owned`).
    pub fn is_dirty(&self) -> bool {
        self.inner
            .lock()
            .expect("cache block lock poisoned")
            .state
            .is_dirty()
    }

    /// Overwrites the block wholesale — used on allocation (miss service).
    pub fn install(&self, address: Address, data: HexWord, state: CacheLineState) {
        let mut guard = self.inner.lock().expect("cache block lock poisoned");
        guard.address = address;
        guard.data = data;
        guard.state = state;
    }

    /// Transitions this block's state in place, leaving its address/data untouched.
    /// Used by the coherence engine when snooping peer lines.
    pub fn set_state(&self, state: CacheLineState) {
        self.inner.lock().expect("cache block lock poisoned").state = state;
    }

    /// Overwrites the data of an already-present line and sets its state, used for
    /// a local write hit that does not need the bus (§4.3).
    pub fn write_local(&self, data: HexWord, state: CacheLineState) {
        let mut guard = self.inner.lock().expect("cache block lock poisoned");
        guard.data = data;
        guard.state = state;
    }
}
