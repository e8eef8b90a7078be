//! Common test utilities and helpers.
//!
//! Integration tests build small synthetic PE images in memory instead of
//! shipping sample binaries. The `.text` section is filled with a repeating
//! function body so its instruction boundaries are known in advance.

#![allow(dead_code)]

pub mod test_utils;

/// push ebp; mov ebp, esp; sub esp, 8; pop ebp; ret
pub const BODY32: [u8; 8] = [0x55, 0x8B, 0xEC, 0x83, 0xEC, 0x08, 0x5D, 0xC3];

/// Instruction offsets within `BODY32`.
pub const BODY32_BOUNDARIES: [i64; 5] = [0, 1, 3, 6, 7];

/// xor rax, rax; ret
pub const BODY64: [u8; 4] = [0x48, 0x31, 0xC0, 0xC3];

pub const IMAGE_BASE32: u64 = 0x400000;
pub const IMAGE_BASE64: u64 = 0x1_4000_0000;

const E_LFANEW: usize = 0x80;
const HEADERS_SIZE: u32 = 0x400;
const TEXT_RAW: u32 = 0x400;
const RDATA_RAW: u32 = 0x600;
const RAW_SIZE: u32 = 0x200;

fn put16(data: &mut [u8], at: usize, v: u16) {
    data[at..at + 2].copy_from_slice(&v.to_le_bytes());
}

fn put32(data: &mut [u8], at: usize, v: u32) {
    data[at..at + 4].copy_from_slice(&v.to_le_bytes());
}

fn put64(data: &mut [u8], at: usize, v: u64) {
    data[at..at + 8].copy_from_slice(&v.to_le_bytes());
}

fn put_section(data: &mut [u8], at: usize, name: &[u8], va: u32, raw: u32, flags: u32) {
    data[at..at + name.len()].copy_from_slice(name);
    put32(data, at + 8, 0x1000);
    put32(data, at + 12, va);
    put32(data, at + 16, RAW_SIZE);
    put32(data, at + 20, raw);
    put32(data, at + 36, flags);
}

/// Build an image with `.text` at RVA 0x1000 and `.rdata` at 0x2000.
///
/// Both sections have 0x200 bytes of file data and a virtual size of
/// 0x1000, so the rest of each section reads as zeros. Size of image is
/// 0x3000.
fn build_pe(is_64: bool, body: &[u8]) -> Vec<u8> {
    let mut data = vec![0u8; (RDATA_RAW + RAW_SIZE) as usize];

    data[0..2].copy_from_slice(b"MZ");
    put32(&mut data, 60, E_LFANEW as u32);
    data[E_LFANEW..E_LFANEW + 4].copy_from_slice(b"PE\0\0");

    let coff = E_LFANEW + 4;
    let (machine, opt_size, magic) = if is_64 {
        (0x8664u16, 0xF0u16, 0x20Bu16)
    } else {
        (0x014Cu16, 0xE0u16, 0x10Bu16)
    };
    put16(&mut data, coff, machine);
    put16(&mut data, coff + 2, 2);
    put16(&mut data, coff + 16, opt_size);

    let opt = coff + 20;
    put16(&mut data, opt, magic);
    put32(&mut data, opt + 16, 0x1000);
    put32(&mut data, opt + 20, 0x1000);
    if is_64 {
        put64(&mut data, opt + 24, IMAGE_BASE64);
    } else {
        put32(&mut data, opt + 28, IMAGE_BASE32 as u32);
    }
    put32(&mut data, opt + 32, 0x1000);
    put32(&mut data, opt + 56, 0x3000);
    put32(&mut data, opt + 60, HEADERS_SIZE);

    let sections = opt + opt_size as usize;
    put_section(&mut data, sections, b".text", 0x1000, TEXT_RAW, 0x6000_0020);
    put_section(&mut data, sections + 40, b".rdata", 0x2000, RDATA_RAW, 0x4000_0040);

    let text = TEXT_RAW as usize;
    for chunk in data[text..text + RAW_SIZE as usize].chunks_mut(body.len()) {
        chunk.copy_from_slice(&body[..chunk.len()]);
    }
    for (i, b) in data[RDATA_RAW as usize..].iter_mut().enumerate() {
        *b = i as u8;
    }
    data
}

/// 32-bit image whose `.text` repeats `BODY32`.
pub fn pe32_image() -> Vec<u8> {
    build_pe(false, &BODY32)
}

/// 64-bit image whose `.text` repeats `BODY64`.
pub fn pe64_image() -> Vec<u8> {
    build_pe(true, &BODY64)
}
