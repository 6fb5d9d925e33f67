//! The MOESI coherence engine: read-miss, write-miss, and write-upgrade
//! service (§4.3). Every method here assumes the caller already holds the bus
//! (a processor only calls in from its `READING_MEMORY`/`WRITING_MEMORY` tick);
//! the engine itself never blocks or arbitrates. Peers are always snooped or
//! invalidated in ascending processor-id order.

use std::collections::HashMap;

use rand::Rng;

use crate::cache::Cache;
use crate::common::{Address, CacheLineState, HexWord, SimError};
use crate::memory::Memory;

/// Borrows every processor's cache plus the shared memory, and services
/// misses/upgrades on their behalf. Stateless itself — it is cheap to build
/// fresh for each transaction.
pub struct CoherenceEngine<'a> {
    caches: &'a [Cache],
    memory: &'a Memory,
}

impl<'a> CoherenceEngine<'a> {
    /// Borrows the shared state a coherence transaction needs.
    pub fn new(caches: &'a [Cache], memory: &'a Memory) -> Self {
        Self { caches, memory }
    }

    /// Services a read miss for `requester`: snoops peers in ascending id order,
    /// supplies the data from the cleanest available source, and installs the
    /// line locally as `Shared` (if any peer held it) or `Exclusive` (if not).
    /// Memory is never written here, even when a `Modified` peer downgrades to
    /// `Owned` — the dirty data only ever moves cache-to-cache.
    pub fn read_miss(&self, requester: usize, address: Address, rng: &mut impl Rng) -> HexWord {
        let mut owner: Option<(usize, CacheLineState)> = None;
        for peer in self.peer_ids(requester) {
            if let Some(view) = self.caches[peer].lookup(address) {
                if matches!(
                    view.state,
                    CacheLineState::Modified | CacheLineState::Owned | CacheLineState::Exclusive
                ) {
                    owner = Some((peer, view.state));
                }
            }
        }

        let data = match owner {
            Some((peer, CacheLineState::Modified)) => {
                let view = self.caches[peer]
                    .lookup(address)
                    .expect("owner line vanished mid-snoop");
                self.caches[peer].set_state(address, CacheLineState::Owned);
                view.data
            }
            Some((peer, CacheLineState::Owned)) => self.caches[peer]
                .lookup(address)
                .expect("owner line vanished mid-snoop")
                .data,
            Some((peer, CacheLineState::Exclusive)) => {
                self.caches[peer].set_state(address, CacheLineState::Shared);
                self.memory.read(address)
            }
            Some((_, CacheLineState::Shared | CacheLineState::Invalid)) => {
                unreachable!("snoop only ever records Modified/Owned/Exclusive owners")
            }
            None => self.memory.read(address),
        };

        let new_state = if owner.is_some() {
            CacheLineState::Shared
        } else {
            CacheLineState::Exclusive
        };
        self.caches[requester].install(address, data, new_state, rng);
        data
    }

    /// Services a write miss for `requester`: invalidates every peer's copy,
    /// writes `data` through to memory, then installs it locally as `Modified`.
    /// A peer's dirty data, if any, is simply discarded on invalidation — this
    /// simulation has no writeback-on-evict latency model. Returns the number
    /// of peers invalidated, for the caller's bus/invalidation counters.
    pub fn write_miss(&self, requester: usize, address: Address, data: HexWord, rng: &mut impl Rng) -> usize {
        let invalidated = self.invalidate_peers(requester, address);
        self.memory.write(address, data);
        self.caches[requester].install(address, data, CacheLineState::Modified, rng);
        invalidated
    }

    /// Services a write hit on a line `requester` holds `Owned`/`Shared`:
    /// invalidates every peer's copy and writes `data` through to memory, the
    /// same as a write miss, since this is the first write this line has seen
    /// since `requester` last needed the bus for it. The caller performs the
    /// local write itself once this returns. Returns the number of peers
    /// invalidated.
    pub fn write_upgrade(&self, requester: usize, address: Address, data: HexWord) -> usize {
        let invalidated = self.invalidate_peers(requester, address);
        self.memory.write(address, data);
        invalidated
    }

    /// Invalidates every peer's copy of `address`, returning how many peers
    /// actually held a valid line for it.
    fn invalidate_peers(&self, requester: usize, address: Address) -> usize {
        let mut invalidated = 0;
        for peer in self.peer_ids(requester) {
            if self.caches[peer].lookup(address).is_some() {
                self.caches[peer].set_state(address, CacheLineState::Invalid);
                invalidated += 1;
            }
        }
        invalidated
    }

    /// Every processor index except `requester`, in ascending order (§4.3: peers
    /// are always snooped/invalidated lowest-id-first).
    fn peer_ids(&self, requester: usize) -> impl Iterator<Item = usize> + 'a {
        let count = self.caches.len();
        (0..count).filter(move |&i| i != requester)
    }
}

/// Checks the MOESI mutual-exclusion invariant across every cache: for any given
/// address, at most one cache may hold it `Modified`, `Owned`, or `Exclusive`, and
/// an `Exclusive` holder must be the line's sole copy anywhere. Intended for tests
/// and property checks only — never called on the hot path.
pub fn check_invariants(caches: &[Cache]) -> Result<(), SimError> {
    let mut holders: HashMap<usize, Vec<CacheLineState>> = HashMap::new();
    for cache in caches {
        for view in cache.snapshot() {
            if view.state.is_valid() {
                holders
                    .entry(view.address.index())
                    .or_default()
                    .push(view.state);
            }
        }
    }

    for (address, states) in holders {
        let exclusive_like = states
            .iter()
            .filter(|state| {
                matches!(
                    state,
                    CacheLineState::Modified | CacheLineState::Owned | CacheLineState::Exclusive
                )
            })
            .count();
        if exclusive_like > 1 {
            return Err(SimError::InvariantViolation(format!(
                "address {address} is Modified/Owned/Exclusive in {exclusive_like} caches at once"
            )));
        }
        let has_exclusive = states.contains(&CacheLineState::Exclusive);
        if has_exclusive && states.len() > 1 {
            return Err(SimError::InvariantViolation(format!(
                "address {address} is Exclusive in one cache but also present in {} others",
                states.len() - 1
            )));
        }
    }
    Ok(())
}
