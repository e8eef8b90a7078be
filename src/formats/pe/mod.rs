//! Minimal PE32/PE32+ reader producing an `ImageLayout`.
//!
//! Only the headers that describe the in-memory layout are read: machine,
//! image base, size of image and headers, and the section table.

pub mod headers;
pub mod sections;
pub mod types;
pub mod utils;

use headers::*;
use sections::*;
pub use types::*;

use crate::core::disassembler::Architecture;
use crate::core::layout::ImageLayout;

impl From<Machine> for Architecture {
    fn from(machine: Machine) -> Self {
        match machine {
            Machine::I386 => Architecture::X86,
            Machine::X86_64 => Architecture::X86_64,
            _ => Architecture::Unknown,
        }
    }
}

/// Parse the layout of a PE image.
pub fn parse_layout(data: &[u8]) -> Result<ImageLayout> {
    let e_lfanew = parse_dos_header(data)? as usize;
    let (coff, optional) = parse_nt_headers(data, e_lfanew)?;

    let section_offset = e_lfanew + 4 + COFF_HEADER_SIZE + coff.size_of_optional_header as usize;
    let section_headers = parse_section_headers(data, section_offset, coff.number_of_sections)?;

    Ok(ImageLayout::new(
        Architecture::from(coff.machine),
        optional.image_base,
        optional.size_of_image,
        optional.size_of_headers,
        create_sections(section_headers),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A PE32 image with a single `.text` section at RVA 0x1000.
    fn tiny_pe32() -> Vec<u8> {
        let mut data = vec![0u8; 0x600];
        data[0..2].copy_from_slice(&DOS_SIGNATURE.to_le_bytes());
        data[60..64].copy_from_slice(&0x80u32.to_le_bytes());
        data[0x80..0x84].copy_from_slice(&PE_SIGNATURE);
        let coff = 0x84;
        data[coff..coff + 2].copy_from_slice(&0x014cu16.to_le_bytes());
        data[coff + 2..coff + 4].copy_from_slice(&1u16.to_le_bytes());
        data[coff + 16..coff + 18].copy_from_slice(&0xE0u16.to_le_bytes());
        let opt = coff + COFF_HEADER_SIZE;
        data[opt..opt + 2].copy_from_slice(&PE32_MAGIC.to_le_bytes());
        data[opt + 20..opt + 24].copy_from_slice(&0x1000u32.to_le_bytes());
        data[opt + 28..opt + 32].copy_from_slice(&0x400000u32.to_le_bytes());
        data[opt + 56..opt + 60].copy_from_slice(&0x2000u32.to_le_bytes());
        data[opt + 60..opt + 64].copy_from_slice(&0x400u32.to_le_bytes());
        let sec = opt + 0xE0;
        data[sec..sec + 5].copy_from_slice(b".text");
        data[sec + 8..sec + 12].copy_from_slice(&0x100u32.to_le_bytes());
        data[sec + 12..sec + 16].copy_from_slice(&0x1000u32.to_le_bytes());
        data[sec + 16..sec + 20].copy_from_slice(&0x200u32.to_le_bytes());
        data[sec + 20..sec + 24].copy_from_slice(&0x400u32.to_le_bytes());
        data[sec + 36..sec + 40]
            .copy_from_slice(&(IMAGE_SCN_CNT_CODE | IMAGE_SCN_MEM_EXECUTE).to_le_bytes());
        data
    }

    #[test]
    fn parse_tiny_layout() {
        let layout = parse_layout(&tiny_pe32()).unwrap();
        assert_eq!(layout.architecture, Architecture::X86);
        assert_eq!(layout.image_base, 0x400000);
        assert_eq!(layout.size_of_image, 0x2000);
        assert_eq!(layout.size_of_headers, 0x400);
        assert_eq!(layout.sections.len(), 1);
        assert_eq!(layout.sections[0].name, ".text");
        assert!(layout.sections[0].executable);
        assert!(layout.validate().is_ok());
    }

    #[test]
    fn reject_non_pe() {
        let data = vec![0u8; 0x200];
        assert_eq!(parse_layout(&data), Err(PeError::InvalidDosSignature));

        let mut data = tiny_pe32();
        data[0x80] = b'X';
        assert_eq!(parse_layout(&data), Err(PeError::InvalidPeSignature));
    }

    #[test]
    fn machine_to_architecture() {
        assert_eq!(Architecture::from(Machine::I386), Architecture::X86);
        assert_eq!(Architecture::from(Machine::X86_64), Architecture::X86_64);
        assert_eq!(Architecture::from(Machine::Arm64), Architecture::Unknown);
    }
}
