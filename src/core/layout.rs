//! In-memory layout of a loaded image.
//!
//! `ImageLayout` is what the navigator needs from an executable: the
//! preferred load base, the total size of the mapped image and the section
//! table in ascending RVA order. It is produced by a format reader
//! (`formats::pe`) or built directly for synthetic images.

use serde::{Deserialize, Serialize};

use crate::core::disassembler::Architecture;
use crate::error::{NavError, Result};

/// One section of the image as mapped in memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionLayout {
    pub name: String,
    pub virtual_address: u32,
    pub virtual_size: u32,
    pub pointer_to_raw_data: u32,
    pub size_of_raw_data: u32,
    /// Section is marked executable or as containing code.
    pub executable: bool,
}

impl SectionLayout {
    /// Bytes mapped from the file: the smaller of the raw and virtual sizes,
    /// unless the virtual size is zero (some linkers leave it unset).
    pub fn file_backed_size(&self) -> u32 {
        if self.virtual_size == 0 {
            self.size_of_raw_data
        } else {
            self.size_of_raw_data.min(self.virtual_size)
        }
    }

    /// Size of the section in memory, falling back to the raw size when the
    /// virtual size is unset.
    pub fn mapped_size(&self) -> u32 {
        if self.virtual_size == 0 {
            self.size_of_raw_data
        } else {
            self.virtual_size
        }
    }
}

/// Layout of an image in RVA space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageLayout {
    pub architecture: Architecture,
    /// Preferred load address; RVA 0 maps here.
    pub image_base: u64,
    pub size_of_image: u32,
    pub size_of_headers: u32,
    /// Sections sorted by `virtual_address`.
    pub sections: Vec<SectionLayout>,
}

impl ImageLayout {
    /// Build a layout, sorting sections by virtual address.
    pub fn new(
        architecture: Architecture,
        image_base: u64,
        size_of_image: u32,
        size_of_headers: u32,
        mut sections: Vec<SectionLayout>,
    ) -> Self {
        sections.sort_by_key(|s| s.virtual_address);
        Self {
            architecture,
            image_base,
            size_of_image,
            size_of_headers,
            sections,
        }
    }

    /// RVA of the first section, which is where the header pseudo-region ends.
    pub fn first_section_rva(&self) -> Option<u32> {
        self.sections.first().map(|s| s.virtual_address)
    }

    /// Check the invariants the region table relies on: the first section
    /// leaves room for the header, sections are strictly ascending and all
    /// start inside the image.
    pub fn validate(&self) -> Result<()> {
        if self.size_of_image == 0 {
            return Err(NavError::InvalidInput("size of image is zero".to_string()));
        }
        if let Some(first) = self.first_section_rva() {
            if first == 0 {
                return Err(NavError::InvalidInput(
                    "first section starts at RVA 0; no room for the header".to_string(),
                ));
            }
        }
        for pair in self.sections.windows(2) {
            if pair[0].virtual_address >= pair[1].virtual_address {
                return Err(NavError::InvalidInput(format!(
                    "sections {} and {} share virtual address {:#x}",
                    pair[0].name, pair[1].name, pair[1].virtual_address
                )));
            }
        }
        if let Some(last) = self.sections.last() {
            if last.virtual_address >= self.size_of_image {
                return Err(NavError::InvalidInput(format!(
                    "section {} starts at {:#x}, beyond size of image {:#x}",
                    last.name, last.virtual_address, self.size_of_image
                )));
            }
        }
        Ok(())
    }
}
