//! Instruction decoder backends.
//!
//! - iced-x86 for x86/x64, reading through an `analysis::memory::MemoryView`

pub mod iced;

pub use self::iced::IcedDecoder;
