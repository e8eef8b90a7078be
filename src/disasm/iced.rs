use std::cell::RefCell;

use iced_x86::{Decoder, DecoderOptions, Formatter, IntelFormatter};
use tracing::trace;

use crate::analysis::memory::MemoryView;
use crate::config::FormatConfig;
use crate::core::disassembler::{Architecture, InstructionDecoder};
use crate::core::instruction::DecodedInstruction;
use crate::error::{NavError, Result};

/// Longest legal x86 encoding.
pub const MAX_INSTRUCTION_LEN: usize = 15;

/// iced-x86 decoder reading an image through a `MemoryView`.
///
/// Addresses handed to `decode_one` are absolute; `module_base` maps them
/// back to the RVAs the memory view understands. The formatter is built once
/// and reused for every decoded line.
pub struct IcedDecoder<M: MemoryView> {
    memory: M,
    module_base: u64,
    bitness: u32,
    arch: Architecture,
    formatter: RefCell<IntelFormatter>,
}

impl<M: MemoryView> IcedDecoder<M> {
    pub fn new(memory: M, module_base: u64, arch: Architecture) -> Result<Self> {
        let bitness = arch
            .address_bits()
            .ok_or_else(|| NavError::UnsupportedArchitecture(arch.to_string()))?;
        Ok(Self {
            memory,
            module_base,
            bitness,
            arch,
            formatter: RefCell::new(build_formatter(&FormatConfig::default())),
        })
    }

    /// Replace the formatting options used for decoded text.
    pub fn with_format(mut self, format: FormatConfig) -> Self {
        self.formatter = RefCell::new(build_formatter(&format));
        self
    }

    pub fn module_base(&self) -> u64 {
        self.module_base
    }

    pub fn architecture(&self) -> Architecture {
        self.arch
    }

    pub fn memory(&self) -> &M {
        &self.memory
    }
}

fn build_formatter(format: &FormatConfig) -> IntelFormatter {
    let mut fmt = IntelFormatter::new();
    let opts = fmt.options_mut();
    opts.set_first_operand_char_index(format.first_operand_char_index);
    opts.set_space_after_operand_separator(false);
    opts.set_uppercase_hex(format.uppercase_hex);
    fmt
}

impl<M: MemoryView> InstructionDecoder for IcedDecoder<M> {
    fn decode_one(&self, address: u64) -> Option<DecodedInstruction> {
        let rva = address.checked_sub(self.module_base)?;
        let bytes = self.memory.read_bytes(rva, MAX_INSTRUCTION_LEN).ok()?;

        let mut decoder = Decoder::with_ip(self.bitness, &bytes, address, DecoderOptions::NONE);
        let instr = decoder.decode();
        if instr.is_invalid() {
            trace!("invalid encoding at {:#x}", address);
            return None;
        }

        let mut text = String::new();
        self.formatter.borrow_mut().format(&instr, &mut text);

        let len = instr.len().min(bytes.len());
        Some(DecodedInstruction::new(address, bytes[..len].to_vec(), text))
    }

    fn address_bits(&self) -> u32 {
        self.bitness
    }

    fn name(&self) -> &str {
        "iced-x86"
    }
}
