//! Shared main memory: the single backing store every cache miss eventually
//! reads from or writes back to (§4.1, §4.3).

use std::sync::RwLock;

use crate::common::{Address, HexWord};

/// The system's single shared memory. Every processor's coherence engine reads
/// and writes through here while holding the bus; `Memory` itself does no
/// arbitration — that's the [`crate::bus::Bus`]'s job.
pub struct Memory {
    words: RwLock<Vec<HexWord>>,
}

impl Memory {
    /// Creates a zeroed memory of `size` words.
    pub fn new(size: usize) -> Self {
        Self {
            words: RwLock::new(vec![HexWord::ZERO; size]),
        }
    }

    /// Number of addressable words.
    pub fn size(&self) -> usize {
        self.words.read().expect("memory lock poisoned").len()
    }

    /// Reads the word at `address`.
    pub fn read(&self, address: Address) -> HexWord {
        self.words.read().expect("memory lock poisoned")[address.index()]
    }

    /// Writes `data` to `address`.
    pub fn write(&self, address: Address, data: HexWord) {
        self.words.write().expect("memory lock poisoned")[address.index()] = data;
    }

    /// A frozen snapshot of every word, for the observer UI (§6).
    pub fn snapshot(&self) -> Vec<HexWord> {
        self.words.read().expect("memory lock poisoned").clone()
    }

    /// Zeroes every word (§7: system reset).
    pub fn reset(&self) {
        let mut words = self.words.write().expect("memory lock poisoned");
        words.iter_mut().for_each(|word| *word = HexWord::ZERO);
    }
}
