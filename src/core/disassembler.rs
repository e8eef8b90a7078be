//! Decoder capability consumed by the navigator.
//!
//! The navigator treats instruction decoding as an opaque, forward-only
//! operation: given an absolute address, decode the one instruction that
//! starts there, or nothing. Decoding backwards is impossible on x86 and is
//! never asked of an implementation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::instruction::DecodedInstruction;

/// Architecture types the navigator can decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Architecture {
    /// x86 (32-bit)
    X86,
    /// x86-64 (64-bit)
    X86_64,
    /// Anything else found in an image header
    Unknown,
}

impl Architecture {
    /// Address size in bits, or `None` when nothing can decode it.
    pub fn address_bits(&self) -> Option<u32> {
        match self {
            Architecture::X86 => Some(32),
            Architecture::X86_64 => Some(64),
            Architecture::Unknown => None,
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Architecture::X86 => write!(f, "x86"),
            Architecture::X86_64 => write!(f, "x86_64"),
            Architecture::Unknown => write!(f, "unknown"),
        }
    }
}

/// Forward-only instruction decoder over an address space.
pub trait InstructionDecoder {
    /// Decode exactly one instruction starting at `address`.
    ///
    /// Returns `None` when the bytes there do not form a valid instruction
    /// or cannot be read.
    fn decode_one(&self, address: u64) -> Option<DecodedInstruction>;

    /// Decode up to `count` consecutive instructions starting at `address`.
    ///
    /// Best effort: stops at the first address that fails to decode, so the
    /// result may hold fewer than `count` instructions.
    fn decode_n(&self, address: u64, count: usize) -> Vec<DecodedInstruction> {
        let mut out = Vec::with_capacity(count.min(64));
        let mut ip = address;
        while out.len() < count {
            let Some(instr) = self.decode_one(ip) else {
                break;
            };
            ip = instr.end_address();
            out.push(instr);
        }
        out
    }

    /// Address width used when rendering lines.
    fn address_bits(&self) -> u32 {
        64
    }

    /// Get a human-readable name for this decoder
    fn name(&self) -> &str {
        "Generic Decoder"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Decodes 2-byte instructions inside [0x100, 0x108).
    struct PairDecoder;

    impl InstructionDecoder for PairDecoder {
        fn decode_one(&self, address: u64) -> Option<DecodedInstruction> {
            if (0x100..0x108).contains(&address) {
                Some(DecodedInstruction::new(address, vec![0x90, 0x90], "nop2"))
            } else {
                None
            }
        }
    }

    #[test]
    fn test_architecture_display() {
        assert_eq!(format!("{}", Architecture::X86), "x86");
        assert_eq!(format!("{}", Architecture::X86_64), "x86_64");
        assert_eq!(format!("{}", Architecture::Unknown), "unknown");
    }

    #[test]
    fn test_architecture_address_bits() {
        assert_eq!(Architecture::X86.address_bits(), Some(32));
        assert_eq!(Architecture::X86_64.address_bits(), Some(64));
        assert_eq!(Architecture::Unknown.address_bits(), None);
    }

    #[test]
    fn test_default_decode_n_stops_on_failure() {
        let d = PairDecoder;
        let all = d.decode_n(0x100, 10);
        assert_eq!(all.len(), 4);
        assert_eq!(all.last().unwrap().address, 0x106);

        let two = d.decode_n(0x100, 2);
        assert_eq!(two.len(), 2);

        assert!(d.decode_n(0x200, 3).is_empty());
        assert!(d.decode_n(0x100, 0).is_empty());
        assert_eq!(d.name(), "Generic Decoder");
    }
}
