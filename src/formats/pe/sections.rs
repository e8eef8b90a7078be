//! Section table parsing for PE files

use crate::core::layout::SectionLayout;
use crate::formats::pe::types::*;
use crate::formats::pe::utils::u32_at;

/// Parse `count` section headers starting at `offset`.
pub fn parse_section_headers(data: &[u8], offset: usize, count: u16) -> Result<Vec<SectionHeader>> {
    if count > MAX_SECTIONS {
        return Err(PeError::LimitExceeded("number of sections"));
    }

    let mut sections = Vec::with_capacity(count as usize);

    for i in 0..count {
        let section_offset = offset + (i as usize * SECTION_HEADER_SIZE);
        if section_offset + SECTION_HEADER_SIZE > data.len() {
            return Err(PeError::TruncatedHeader {
                expected: section_offset + SECTION_HEADER_SIZE,
                actual: data.len(),
            });
        }

        let mut name = [0u8; 8];
        name.copy_from_slice(&data[section_offset..section_offset + 8]);

        sections.push(SectionHeader {
            name,
            virtual_size: u32_at(data, section_offset + 8)?,
            virtual_address: u32_at(data, section_offset + 12)?,
            size_of_raw_data: u32_at(data, section_offset + 16)?,
            pointer_to_raw_data: u32_at(data, section_offset + 20)?,
            characteristics: u32_at(data, section_offset + 36)?,
        });
    }

    Ok(sections)
}

/// Convert parsed headers into layout entries sorted by virtual address.
pub fn create_sections(headers: Vec<SectionHeader>) -> Vec<SectionLayout> {
    let mut sections: Vec<SectionLayout> = headers
        .into_iter()
        .map(|header| SectionLayout {
            name: header.name(),
            virtual_address: header.virtual_address,
            virtual_size: header.virtual_size,
            pointer_to_raw_data: header.pointer_to_raw_data,
            size_of_raw_data: header.size_of_raw_data,
            executable: header.is_executable() || header.contains_code(),
        })
        .collect();
    sections.sort_by_key(|s| s.virtual_address);
    sections
}
