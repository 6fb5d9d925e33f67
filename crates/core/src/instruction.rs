//! Instructions: the records processors generate and service (§3, §4.5, §6).
//!
//! An `Instruction` is an immutable, tagged record — never the loose dictionary
//! with sentinel `{}` the original source used. Absence of an instruction is
//! `Option::None`, not a special variant.

use std::fmt;

use rand::Rng;

use crate::common::{Address, HexWord};

/// The three instruction kinds a processor can generate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstructionKind {
    /// Load the word at `address` into the processor's cache.
    Read,
    /// Store `data` to `address`.
    Write,
    /// A local computation with no memory effect.
    Calc,
}

/// An immutable instruction issued by a processor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Instruction {
    /// The processor that issued this instruction (1-based, per §3).
    pub processor: usize,
    /// The instruction kind.
    pub kind: InstructionKind,
    /// Target address, present for `Read` and `Write`.
    pub address: Option<Address>,
    /// Data to store, present only for `Write`.
    pub data: Option<HexWord>,
}

impl Instruction {
    /// Builds a `CALC` instruction.
    pub fn calc(processor: usize) -> Self {
        Self {
            processor,
            kind: InstructionKind::Calc,
            address: None,
            data: None,
        }
    }

    /// Builds a `READ` instruction.
    pub fn read(processor: usize, address: Address) -> Self {
        Self {
            processor,
            kind: InstructionKind::Read,
            address: Some(address),
            data: None,
        }
    }

    /// Builds a `WRITE` instruction.
    pub fn write(processor: usize, address: Address, data: HexWord) -> Self {
        Self {
            processor,
            kind: InstructionKind::Write,
            address: Some(address),
            data: Some(data),
        }
    }

    /// Generates a random instruction for `processor`, whose address space is
    /// `addr_width` bits wide.
    ///
    /// Uses a Gaussian-biased selector (§4.5): sampling `x ~ N(0,1)`, `READ` if
    /// `x < -1`, `WRITE` if `x > 1`, otherwise `CALC` — so `CALC` dominates the
    /// middle of the distribution and `READ`/`WRITE` occupy the tails.
    pub fn generate(processor: usize, addr_width: u32, rng: &mut impl Rng) -> Self {
        let x = standard_normal(rng);
        if x < -1.0 {
            let address = Address::new(rng.gen_range(0..1u32 << addr_width), addr_width);
            Instruction::read(processor, address)
        } else if x > 1.0 {
            let address = Address::new(rng.gen_range(0..1u32 << addr_width), addr_width);
            let data = HexWord::new(rng.gen::<u16>());
            Instruction::write(processor, address, data)
        } else {
            Instruction::calc(processor)
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            InstructionKind::Calc => write!(f, "P{}: CALC", self.processor),
            InstructionKind::Read => write!(
                f,
                "P{}: READ {}",
                self.processor,
                self.address.expect("READ always carries an address")
            ),
            InstructionKind::Write => write!(
                f,
                "P{}: WRITE {}, {}",
                self.processor,
                self.address.expect("WRITE always carries an address"),
                self.data.expect("WRITE always carries data")
            ),
        }
    }
}

/// Formats an optional instruction the way the observation surface's UI expects:
/// the instruction's own display form, or the literal `"NOP"` when none has ever
/// been issued (§6; grounded on the original `utils/formats.py::instr2string`).
pub fn format_instruction(instruction: Option<&Instruction>) -> String {
    match instruction {
        Some(instr) => instr.to_string(),
        None => "NOP".to_string(),
    }
}

/// Samples one value from the standard normal distribution via the Box-Muller
/// transform, using only `rand`'s uniform sampling (no extra distribution crate).
fn standard_normal(rng: &mut impl Rng) -> f64 {
    let u1: f64 = rng.r#gen::<f64>().max(f64::MIN_POSITIVE);
    let u2: f64 = rng.r#gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}
