//! Decoded instruction records.
//!
//! A `DecodedInstruction` is transient: produced by a decoder for the
//! duration of one navigation call and dropped afterwards.

use std::fmt;

/// One decoded machine instruction at an absolute address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedInstruction {
    /// Absolute address of the first byte
    pub address: u64,
    /// Raw encoded bytes
    pub bytes: Vec<u8>,
    /// Mnemonic and operands as formatted by the decoder
    pub text: String,
}

impl DecodedInstruction {
    pub fn new(address: u64, bytes: Vec<u8>, text: impl Into<String>) -> Self {
        Self {
            address,
            bytes,
            text: text.into(),
        }
    }

    /// Encoded length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Address of the byte following this instruction
    pub fn end_address(&self) -> u64 {
        self.address.wrapping_add(self.bytes.len() as u64)
    }
}

impl fmt::Display for DecodedInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x} {}", self.address, self.text)
    }
}
