//! Renderable lines returned by `get_lines`.

use std::fmt;
use std::fmt::Write;

use crate::config::FormatConfig;
use crate::core::instruction::DecodedInstruction;
use crate::core::Rva;

/// What produced a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Fixed content of the header pseudo-region, one line per RVA
    Header,
    /// One decoded instruction
    Instruction,
}

/// A single displayable line at an RVA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLine {
    pub rva: Rva,
    pub kind: LineKind,
    pub text: String,
}

impl TextLine {
    /// Header pseudo-region line for `rva`.
    pub fn header(rva: Rva) -> Self {
        Self {
            rva,
            kind: LineKind::Header,
            text: format!("{:08x} header", rva),
        }
    }

    /// Debugger-style instruction line: address, raw bytes, disassembly.
    ///
    /// The address column is 8 hex digits for 32-bit code and 16 for 64-bit.
    pub fn from_instruction(
        instr: &DecodedInstruction,
        module_base: u64,
        address_bits: u32,
        format: &FormatConfig,
    ) -> Self {
        let digits = if address_bits > 32 { 16 } else { 8 };
        let mut text = String::with_capacity(digits + format.bytes_column_width + instr.text.len() + 2);

        if format.uppercase_hex {
            let _ = write!(text, "{:0w$X} ", instr.address, w = digits);
        } else {
            let _ = write!(text, "{:0w$x} ", instr.address, w = digits);
        }

        if format.show_bytes {
            let mut bytes = String::with_capacity(instr.len() * 2);
            for b in &instr.bytes {
                if format.uppercase_hex {
                    let _ = write!(bytes, "{:02X}", b);
                } else {
                    let _ = write!(bytes, "{:02x}", b);
                }
            }
            // Long encodings still keep one space before the disassembly.
            let width = format.bytes_column_width.max(bytes.len() + 1);
            let _ = write!(text, "{:<w$}", bytes, w = width);
        }

        text.push_str(&instr.text);

        Self {
            rva: instr.address.wrapping_sub(module_base) as Rva,
            kind: LineKind::Instruction,
            text,
        }
    }
}

impl fmt::Display for TextLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
