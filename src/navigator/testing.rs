//! Deterministic decoder for navigation tests.

use crate::core::disassembler::InstructionDecoder;
use crate::core::instruction::DecodedInstruction;

/// Fixed-length instructions on `len`-aligned RVAs within `[lo, hi)`.
pub struct AlignedDecoder {
    base: u64,
    lo: u64,
    hi: u64,
    len: u64,
}

impl AlignedDecoder {
    pub fn new(base: u64, lo: u64, hi: u64, len: u64) -> Self {
        Self { base, lo, hi, len }
    }
}

impl InstructionDecoder for AlignedDecoder {
    fn decode_one(&self, address: u64) -> Option<DecodedInstruction> {
        let rva = address.checked_sub(self.base)?;
        if rva < self.lo || rva + self.len > self.hi || (rva - self.lo) % self.len != 0 {
            return None;
        }
        Some(DecodedInstruction::new(
            address,
            vec![0x90; self.len as usize],
            format!("op{:x}", rva),
        ))
    }

    fn address_bits(&self) -> u32 {
        32
    }

    fn name(&self) -> &str {
        "aligned"
    }
}
