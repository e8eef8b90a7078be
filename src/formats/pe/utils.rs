//! Utility functions for PE parsing

use crate::formats::pe::types::{PeError, Result};

/// Extension trait for reading primitive types from byte slices
pub trait ReadExt {
    fn read_u16_le_at(&self, offset: usize) -> Option<u16>;
    fn read_u32_le_at(&self, offset: usize) -> Option<u32>;
    fn read_u64_le_at(&self, offset: usize) -> Option<u64>;
}

impl ReadExt for [u8] {
    #[inline(always)]
    fn read_u16_le_at(&self, offset: usize) -> Option<u16> {
        self.get(offset..offset.checked_add(2)?)
            .and_then(|b| b.try_into().ok())
            .map(u16::from_le_bytes)
    }

    #[inline(always)]
    fn read_u32_le_at(&self, offset: usize) -> Option<u32> {
        self.get(offset..offset.checked_add(4)?)
            .and_then(|b| b.try_into().ok())
            .map(u32::from_le_bytes)
    }

    #[inline(always)]
    fn read_u64_le_at(&self, offset: usize) -> Option<u64> {
        self.get(offset..offset.checked_add(8)?)
            .and_then(|b| b.try_into().ok())
            .map(u64::from_le_bytes)
    }
}

fn truncated(data: &[u8], offset: usize, width: usize) -> PeError {
    PeError::TruncatedHeader {
        expected: offset.saturating_add(width),
        actual: data.len(),
    }
}

/// Read a little-endian u16 or report the header as truncated.
pub fn u16_at(data: &[u8], offset: usize) -> Result<u16> {
    data.read_u16_le_at(offset)
        .ok_or_else(|| truncated(data, offset, 2))
}

/// Read a little-endian u32 or report the header as truncated.
pub fn u32_at(data: &[u8], offset: usize) -> Result<u32> {
    data.read_u32_le_at(offset)
        .ok_or_else(|| truncated(data, offset, 4))
}

/// Read a little-endian u64 or report the header as truncated.
pub fn u64_at(data: &[u8], offset: usize) -> Result<u64> {
    data.read_u64_le_at(offset)
        .ok_or_else(|| truncated(data, offset, 8))
}
