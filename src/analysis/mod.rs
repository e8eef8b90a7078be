//! Analysis-time views over a loaded image.
//!
//! `MemoryView` provides bounded reads by RVA, either from a flat buffer or
//! through a PE section table.

pub mod memory;
