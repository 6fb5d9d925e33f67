use moesi_core::memory::Memory;
use moesi_core::{Address, HexWord};
use proptest::prelude::*;

#[test]
fn fresh_memory_is_zeroed_and_correctly_sized() {
    let memory = Memory::new(16);
    assert_eq!(memory.size(), 16);
    assert!(memory.snapshot().iter().all(|word| *word == HexWord::ZERO));
}

#[test]
fn reset_zeroes_previously_written_words() {
    let memory = Memory::new(4);
    memory.write(Address::new(2, 2), HexWord::new(0xbeef));
    memory.reset();
    assert_eq!(memory.read(Address::new(2, 2)), HexWord::ZERO);
}

proptest! {
    /// Writing a word and reading it back always returns exactly what was
    /// written, regardless of address or value.
    #[test]
    fn write_then_read_round_trips(index in 0u32..16, value in 0u16..=u16::MAX) {
        let memory = Memory::new(16);
        let addr = Address::new(index, 4);
        memory.write(addr, HexWord::new(value));
        prop_assert_eq!(memory.read(addr), HexWord::new(value));
    }

    /// Writing one word never disturbs any other word.
    #[test]
    fn write_is_local_to_its_address(a in 0u32..16, b in 0u32..16, value in 0u16..=u16::MAX) {
        prop_assume!(a != b);
        let memory = Memory::new(16);
        memory.write(Address::new(a, 4), HexWord::new(value));
        prop_assert_eq!(memory.read(Address::new(b, 4)), HexWord::ZERO);
    }
}
