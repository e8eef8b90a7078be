//! codenav: line-oriented navigation over the disassembly of a PE image.
//!
//! An image's RVA space is split into a header pseudo-region and one
//! decoding region per section. A [`Navigator`] scrolls through it a line at
//! a time, where a header line is one byte and a code line is one decoded
//! instruction, and produces windows of rendered lines for a viewer.
//!
//! ```no_run
//! use codenav::{open_image, NavigatorConfig};
//!
//! let image = open_image("app.exe", &NavigatorConfig::default())?;
//! let mut nav = image.navigator()?;
//! let top = nav.seek_vertical(0x1000);
//! for line in nav.get_lines(top, top + 40) {
//!     println!("{line}");
//! }
//! # Ok::<(), codenav::NavError>(())
//! ```

/// Memory views over a loaded image
pub mod analysis;
pub mod config;
/// Core data types module
pub mod core;
/// Instruction decoder backends
pub mod disasm;
pub mod error;
/// Executable format readers
pub mod formats;
pub mod image;
pub mod io;
pub mod logging;
pub mod navigator;

pub use crate::config::NavigatorConfig;
pub use crate::core::{InstructionDecoder, Rva, TextLine};
pub use crate::error::{NavError, Result};
pub use crate::image::{load_image, open_image, LoadedImage};
pub use crate::navigator::{Navigable, Navigator, Region};
