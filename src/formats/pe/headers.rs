//! PE header parsing

use crate::formats::pe::types::*;
use crate::formats::pe::utils::{u16_at, u32_at, u64_at};

/// Parse the DOS header and return `e_lfanew`, the file offset of the NT headers.
pub fn parse_dos_header(data: &[u8]) -> Result<u32> {
    if data.len() < DOS_HEADER_SIZE {
        return Err(PeError::TruncatedHeader {
            expected: DOS_HEADER_SIZE,
            actual: data.len(),
        });
    }

    if u16_at(data, 0)? != DOS_SIGNATURE {
        return Err(PeError::InvalidDosSignature);
    }

    u32_at(data, 60)
}

/// Parse COFF header from data at offset
pub fn parse_coff_header(data: &[u8], offset: usize) -> Result<CoffHeader> {
    if offset + COFF_HEADER_SIZE > data.len() {
        return Err(PeError::TruncatedHeader {
            expected: offset + COFF_HEADER_SIZE,
            actual: data.len(),
        });
    }

    Ok(CoffHeader {
        machine: Machine::from(u16_at(data, offset)?),
        number_of_sections: u16_at(data, offset + 2)?,
        size_of_optional_header: u16_at(data, offset + 16)?,
        characteristics: u16_at(data, offset + 18)?,
    })
}

/// Parse the layout fields of the optional header at offset.
///
/// PE32 and PE32+ share offsets for everything read here except the image
/// base, which is 4 bytes at +28 for PE32 and 8 bytes at +24 for PE32+.
pub fn parse_optional_header(data: &[u8], offset: usize, size: u16) -> Result<OptionalHeader> {
    if offset + size as usize > data.len() {
        return Err(PeError::TruncatedHeader {
            expected: offset + size as usize,
            actual: data.len(),
        });
    }

    let magic = u16_at(data, offset)?;
    let (min_size, image_base) = match magic {
        PE32_MAGIC => (96usize, u32_at(data, offset + 28)? as u64),
        PE32PLUS_MAGIC => (112usize, u64_at(data, offset + 24)?),
        _ => return Err(PeError::InvalidMagic(magic)),
    };

    if (size as usize) < min_size {
        return Err(PeError::TruncatedHeader {
            expected: offset + min_size,
            actual: offset + size as usize,
        });
    }

    Ok(OptionalHeader {
        magic,
        address_of_entry_point: u32_at(data, offset + 16)?,
        base_of_code: u32_at(data, offset + 20)?,
        image_base,
        section_alignment: u32_at(data, offset + 32)?,
        size_of_image: u32_at(data, offset + 56)?,
        size_of_headers: u32_at(data, offset + 60)?,
    })
}

/// Parse NT headers (PE signature + COFF + Optional)
pub fn parse_nt_headers(data: &[u8], offset: usize) -> Result<(CoffHeader, OptionalHeader)> {
    let signature = data
        .get(offset..offset.saturating_add(4))
        .ok_or(PeError::TruncatedHeader {
            expected: offset.saturating_add(4),
            actual: data.len(),
        })?;

    if signature != PE_SIGNATURE {
        return Err(PeError::InvalidPeSignature);
    }

    let coff_header = parse_coff_header(data, offset + 4)?;
    let opt_offset = offset + 4 + COFF_HEADER_SIZE;
    let optional_header =
        parse_optional_header(data, opt_offset, coff_header.size_of_optional_header)?;

    Ok((coff_header, optional_header))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dos_header() {
        let mut data = vec![0u8; 64];
        data[0] = 0x4D;
        data[1] = 0x5A;
        data[60] = 0x80;

        assert_eq!(parse_dos_header(&data).unwrap(), 0x80);

        data[0] = 0xFF;
        assert_eq!(parse_dos_header(&data), Err(PeError::InvalidDosSignature));

        let short_data = vec![0u8; 10];
        assert!(matches!(
            parse_dos_header(&short_data),
            Err(PeError::TruncatedHeader { .. })
        ));
    }

    #[test]
    fn test_parse_coff_header() {
        let mut data = vec![0u8; 100];
        let offset = 10;
        data[offset] = 0x4C;
        data[offset + 1] = 0x01;
        data[offset + 2] = 0x05;
        data[offset + 16] = 0xE0;

        let header = parse_coff_header(&data, offset).unwrap();
        assert_eq!(header.machine, Machine::I386);
        assert_eq!(header.number_of_sections, 5);
        assert_eq!(header.size_of_optional_header, 0xE0);
    }

    #[test]
    fn test_parse_optional_header32() {
        let mut data = vec![0u8; 224];
        data[0..2].copy_from_slice(&PE32_MAGIC.to_le_bytes());
        data[20..24].copy_from_slice(&0x1000u32.to_le_bytes());
        data[28..32].copy_from_slice(&0x4b28_0000u32.to_le_bytes());
        data[56..60].copy_from_slice(&0x5000u32.to_le_bytes());
        data[60..64].copy_from_slice(&0x400u32.to_le_bytes());

        let header = parse_optional_header(&data, 0, 224).unwrap();
        assert!(!header.is_64bit());
        assert_eq!(header.base_of_code, 0x1000);
        assert_eq!(header.image_base, 0x4b28_0000);
        assert_eq!(header.size_of_image, 0x5000);
        assert_eq!(header.size_of_headers, 0x400);
    }

    #[test]
    fn test_parse_optional_header64() {
        let mut data = vec![0u8; 240];
        data[0..2].copy_from_slice(&PE32PLUS_MAGIC.to_le_bytes());
        data[24..32].copy_from_slice(&0x1_8000_0000u64.to_le_bytes());
        data[56..60].copy_from_slice(&0x9000u32.to_le_bytes());

        let header = parse_optional_header(&data, 0, 240).unwrap();
        assert!(header.is_64bit());
        assert_eq!(header.image_base, 0x1_8000_0000);
        assert_eq!(header.size_of_image, 0x9000);
    }

    #[test]
    fn test_optional_header_rejects_bad_magic_and_short_size() {
        let mut data = vec![0u8; 240];
        data[0..2].copy_from_slice(&0x1234u16.to_le_bytes());
        assert_eq!(
            parse_optional_header(&data, 0, 240).unwrap_err(),
            PeError::InvalidMagic(0x1234)
        );

        data[0..2].copy_from_slice(&PE32PLUS_MAGIC.to_le_bytes());
        assert!(matches!(
            parse_optional_header(&data, 0, 96),
            Err(PeError::TruncatedHeader { .. })
        ));
    }
}
