//! MemoryView: bounded reads of a loaded image by RVA.
//!
//! Decoders read through this trait so they never need the image to be
//! expanded into its in-memory layout. Implementations are deterministic and
//! enforce bounds instead of panicking.

use crate::core::layout::{ImageLayout, SectionLayout};

/// Errors that can occur during memory reads.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MemoryError {
    #[error("address not mapped: {0:#x}")]
    Unmapped(u64),
}

/// Bounded memory reads by RVA.
pub trait MemoryView {
    /// Read up to `len` bytes starting at `rva`.
    ///
    /// The result is truncated at the end of the mapping that contains `rva`,
    /// so it may be shorter than `len` but is never empty on success.
    fn read_bytes(&self, rva: u64, len: usize) -> Result<Vec<u8>, MemoryError>;
}

/// A flat buffer mapped contiguously at `base_rva`.
pub struct SliceMemoryView<D: AsRef<[u8]>> {
    data: D,
    base_rva: u64,
}

impl<D: AsRef<[u8]>> SliceMemoryView<D> {
    pub fn new(data: D) -> Self {
        Self { data, base_rva: 0 }
    }

    /// Map the buffer at `base_rva` instead of 0.
    pub fn at(mut self, base_rva: u64) -> Self {
        self.base_rva = base_rva;
        self
    }
}

impl<D: AsRef<[u8]>> MemoryView for SliceMemoryView<D> {
    fn read_bytes(&self, rva: u64, len: usize) -> Result<Vec<u8>, MemoryError> {
        let data = self.data.as_ref();
        let start = rva
            .checked_sub(self.base_rva)
            .ok_or(MemoryError::Unmapped(rva))? as usize;
        if len == 0 {
            return Ok(Vec::new());
        }
        if start >= data.len() {
            return Err(MemoryError::Unmapped(rva));
        }
        let end = start.saturating_add(len).min(data.len());
        Ok(data[start..end].to_vec())
    }
}

/// A PE file's bytes viewed through its section table.
///
/// Headers are mapped at RVA 0 up to `size_of_headers`; each section maps its
/// raw data at its virtual address and reads as zeros past the raw data up to
/// its virtual size.
pub struct ImageMemory<D: AsRef<[u8]>> {
    data: D,
    size_of_headers: u64,
    sections: Vec<SectionLayout>,
}

impl<D: AsRef<[u8]>> ImageMemory<D> {
    pub fn new(data: D, layout: &ImageLayout) -> Self {
        Self {
            data,
            size_of_headers: layout.size_of_headers as u64,
            sections: layout.sections.clone(),
        }
    }

    fn section_containing(&self, rva: u64) -> Option<&SectionLayout> {
        let idx = self
            .sections
            .partition_point(|s| (s.virtual_address as u64) <= rva);
        let section = self.sections.get(idx.checked_sub(1)?)?;
        let offset = rva - section.virtual_address as u64;
        (offset < section.mapped_size() as u64).then_some(section)
    }

    fn file_slice(&self, offset: u64, len: usize) -> &[u8] {
        let data = self.data.as_ref();
        let start = (offset as usize).min(data.len());
        let end = start.saturating_add(len).min(data.len());
        &data[start..end]
    }
}

impl<D: AsRef<[u8]>> MemoryView for ImageMemory<D> {
    fn read_bytes(&self, rva: u64, len: usize) -> Result<Vec<u8>, MemoryError> {
        if len == 0 {
            return Ok(Vec::new());
        }

        if let Some(section) = self.section_containing(rva) {
            let offset = rva - section.virtual_address as u64;
            let mapped = section.mapped_size() as u64;
            let backed = section.file_backed_size() as u64;
            let want = (len as u64).min(mapped - offset) as usize;

            let mut out = Vec::with_capacity(want);
            if offset < backed {
                let raw_len = ((backed - offset) as usize).min(want);
                let raw = self.file_slice(section.pointer_to_raw_data as u64 + offset, raw_len);
                out.extend_from_slice(raw);
                if raw.len() < raw_len {
                    // File is shorter than its section table claims.
                    return if out.is_empty() {
                        Err(MemoryError::Unmapped(rva))
                    } else {
                        Ok(out)
                    };
                }
            }
            out.resize(want, 0);
            return Ok(out);
        }

        if rva < self.size_of_headers {
            let want = (len as u64).min(self.size_of_headers - rva) as usize;
            let bytes = self.file_slice(rva, want);
            if bytes.is_empty() {
                return Err(MemoryError::Unmapped(rva));
            }
            return Ok(bytes.to_vec());
        }

        Err(MemoryError::Unmapped(rva))
    }
}
