use moesi_core::instruction::{InstructionKind, format_instruction};
use moesi_core::{Address, HexWord, Instruction};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

#[test]
fn display_formats_match_the_observation_surface_convention() {
    let addr = Address::from_bits("0011", 4).unwrap();
    assert_eq!(Instruction::calc(1).to_string(), "P1: CALC");
    assert_eq!(Instruction::read(1, addr).to_string(), "P1: READ 0011");
    assert_eq!(
        Instruction::write(2, addr, HexWord::new(0xbeef)).to_string(),
        "P2: WRITE 0011, beef"
    );
}

#[test]
fn absent_instruction_formats_as_nop() {
    assert_eq!(format_instruction(None), "NOP");
}

proptest! {
    /// Every generated READ/WRITE address fits the requested width, and every
    /// generated kind is one of the three defined variants.
    #[test]
    fn generated_instructions_always_fit_the_address_width(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        for _ in 0..200 {
            let instruction = Instruction::generate(1, 4, &mut rng);
            match instruction.kind {
                InstructionKind::Calc => {
                    prop_assert!(instruction.address.is_none());
                    prop_assert!(instruction.data.is_none());
                }
                InstructionKind::Read => {
                    prop_assert!(instruction.address.unwrap().index() < 16);
                    prop_assert!(instruction.data.is_none());
                }
                InstructionKind::Write => {
                    prop_assert!(instruction.address.unwrap().index() < 16);
                    prop_assert!(instruction.data.is_some());
                }
            }
        }
    }
}
