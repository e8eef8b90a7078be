//! Core data types for codenav.
//!
//! Image layout, the decoder capability the navigator consumes, decoded
//! instruction records and the rendered lines handed back to viewers.

pub mod disassembler;
pub mod instruction;
pub mod layout;
pub mod text_line;

pub use disassembler::{Architecture, InstructionDecoder};
pub use instruction::DecodedInstruction;
pub use layout::{ImageLayout, SectionLayout};
pub use text_line::{LineKind, TextLine};

/// Relative virtual address: an offset from the image's preferred load base.
pub type Rva = i64;
