//! The five literal end-to-end coherence scenarios: 2 processors, memory size
//! 4 (2-bit addresses). Driven directly against `CoherenceEngine`/`Cache`,
//! which *are* the coherence engine under test — the full `System` adds
//! threading and instruction generation on top, covered in `unit::system`.

use moesi_core::cache::Cache;
use moesi_core::coherence::{CoherenceEngine, check_invariants};
use moesi_core::memory::Memory;
use moesi_core::{Address, CacheLineState, HexWord};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rstest::{fixture, rstest};

struct Scenario {
    caches: Vec<Cache>,
    memory: Memory,
    rng: StdRng,
}

impl Scenario {
    fn addr(index: u32) -> Address {
        Address::new(index, 2)
    }
}

/// Builds a `CoherenceEngine` borrowing only `caches`/`memory`, never `rng` —
/// kept as a free function (rather than a method on `Scenario`) so call sites
/// can still borrow `scenario.rng` mutably in the same statement.
fn engine<'a>(caches: &'a [Cache], memory: &'a Memory) -> CoherenceEngine<'a> {
    CoherenceEngine::new(caches, memory)
}

#[fixture]
fn scenario() -> Scenario {
    Scenario {
        caches: vec![Cache::new(4, 1, 2), Cache::new(4, 1, 2)],
        memory: Memory::new(4),
        rng: StdRng::seed_from_u64(1),
    }
}

#[rstest]
fn scenario_1_cold_read(mut scenario: Scenario) {
    let addr = Scenario::addr(0);
    engine(&scenario.caches, &scenario.memory).read_miss(0, addr, &mut scenario.rng);

    let p1 = scenario.caches[0].lookup(addr).unwrap();
    assert_eq!(p1.state, CacheLineState::Exclusive);
    assert_eq!(p1.data, HexWord::ZERO);
    assert_eq!(scenario.memory.read(addr), HexWord::ZERO);
    assert!(scenario.caches[1].lookup(addr).is_none());
}

#[rstest]
fn scenario_2_shared_read(mut scenario: Scenario) {
    let addr = Scenario::addr(0);
    engine(&scenario.caches, &scenario.memory).read_miss(0, addr, &mut scenario.rng);
    engine(&scenario.caches, &scenario.memory).read_miss(1, addr, &mut scenario.rng);

    assert_eq!(scenario.caches[0].lookup(addr).unwrap().state, CacheLineState::Shared);
    let p2 = scenario.caches[1].lookup(addr).unwrap();
    assert_eq!(p2.state, CacheLineState::Shared);
    assert_eq!(p2.data, HexWord::ZERO);
}

#[rstest]
fn scenario_3_write_after_shared(mut scenario: Scenario) {
    let addr = Scenario::addr(0);
    engine(&scenario.caches, &scenario.memory).read_miss(0, addr, &mut scenario.rng);
    engine(&scenario.caches, &scenario.memory).read_miss(1, addr, &mut scenario.rng);

    engine(&scenario.caches, &scenario.memory).write_upgrade(0, addr, HexWord::new(0xbeef));
    scenario.caches[0].write_local(addr, HexWord::new(0xbeef), CacheLineState::Modified);

    let p1 = scenario.caches[0].lookup(addr).unwrap();
    assert_eq!(p1.state, CacheLineState::Modified);
    assert_eq!(p1.data, HexWord::new(0xbeef));
    assert!(scenario.caches[1].lookup(addr).is_none());
    assert_eq!(scenario.memory.read(addr), HexWord::new(0xbeef));
}

#[rstest]
fn scenario_4_owned_transition(mut scenario: Scenario) {
    let addr = Scenario::addr(1);
    engine(&scenario.caches, &scenario.memory).write_miss(0, addr, HexWord::new(0xcafe), &mut scenario.rng);
    assert_eq!(scenario.caches[0].lookup(addr).unwrap().state, CacheLineState::Modified);
    assert_eq!(scenario.memory.read(addr), HexWord::new(0xcafe));

    let data = engine(&scenario.caches, &scenario.memory).read_miss(1, addr, &mut scenario.rng);
    assert_eq!(data, HexWord::new(0xcafe));
    assert_eq!(scenario.caches[0].lookup(addr).unwrap().state, CacheLineState::Owned);
    let p2 = scenario.caches[1].lookup(addr).unwrap();
    assert_eq!(p2.state, CacheLineState::Shared);
    assert_eq!(p2.data, HexWord::new(0xcafe));
    assert_eq!(scenario.memory.read(addr), HexWord::new(0xcafe));
    assert!(check_invariants(&scenario.caches).is_ok());
}

#[rstest]
fn scenario_5_invalidation_on_write_miss(mut scenario: Scenario) {
    let addr = Scenario::addr(1);
    engine(&scenario.caches, &scenario.memory).write_miss(0, addr, HexWord::new(0xcafe), &mut scenario.rng);
    engine(&scenario.caches, &scenario.memory).read_miss(1, addr, &mut scenario.rng);

    engine(&scenario.caches, &scenario.memory).write_miss(1, addr, HexWord::new(0xdead), &mut scenario.rng);

    assert!(scenario.caches[0].lookup(addr).is_none());
    let p2 = scenario.caches[1].lookup(addr).unwrap();
    assert_eq!(p2.state, CacheLineState::Modified);
    assert_eq!(p2.data, HexWord::new(0xdead));
    assert_eq!(scenario.memory.read(addr), HexWord::new(0xdead));
    assert!(check_invariants(&scenario.caches).is_ok());
}

#[test]
fn round_trip_write_then_read_observes_the_written_data() {
    let mut state = scenario();
    let addr = Scenario::addr(2);
    engine(&state.caches, &state.memory).write_miss(0, addr, HexWord::new(0x1357), &mut state.rng);
    let observed = engine(&state.caches, &state.memory).read_miss(1, addr, &mut state.rng);
    assert_eq!(observed, HexWord::new(0x1357));
}

proptest! {
    /// After any sequence of random read/write misses across 3 processors and
    /// 4 addresses, the MOESI mutual-exclusion invariant must still hold: at
    /// most one cache may be Modified/Owned/Exclusive for a given address, and
    /// an Exclusive holder must be the line's sole copy.
    #[test]
    fn random_interleavings_never_violate_moesi_invariants(
        ops in proptest::collection::vec((0usize..3, 0u32..4, any::<bool>(), any::<u16>()), 1..100)
    ) {
        let caches: Vec<Cache> = (0..3).map(|_| Cache::new(4, 2, 2)).collect();
        let memory = Memory::new(4);
        let mut rng = StdRng::seed_from_u64(99);
        let coherence = CoherenceEngine::new(&caches, &memory);

        for (processor, raw_addr, is_write, raw_data) in ops {
            let address = Address::new(raw_addr, 2);
            if is_write {
                match caches[processor].lookup(address) {
                    Some(view) if matches!(view.state, CacheLineState::Modified | CacheLineState::Exclusive) => {
                        caches[processor].write_local(address, HexWord::new(raw_data), CacheLineState::Modified);
                    }
                    Some(_) => {
                        coherence.write_upgrade(processor, address, HexWord::new(raw_data));
                        caches[processor].write_local(address, HexWord::new(raw_data), CacheLineState::Modified);
                    }
                    None => coherence.write_miss(processor, address, HexWord::new(raw_data), &mut rng),
                }
            } else if caches[processor].lookup(address).is_none() {
                coherence.read_miss(processor, address, &mut rng);
            }
            prop_assert!(check_invariants(&caches).is_ok());
        }
    }
}
