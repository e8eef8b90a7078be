//! Bounded, memory-mapped access to image files.
//!
//! Images are mapped read-only and never copied; the navigator only ever
//! reads the few bytes it needs to decode around the cursor.

pub mod error;

use crate::config::IOConfig;
use crate::io::error::{IoError, Result};
use memmap2::Mmap;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Defines the resource limits for I/O operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IOLimits {
    /// The absolute maximum file size that can be opened.
    pub max_file_size: u64,
}

impl Default for IOLimits {
    fn default() -> Self {
        IOLimits::from(&IOConfig::default())
    }
}

impl From<&IOConfig> for IOLimits {
    fn from(cfg: &IOConfig) -> Self {
        Self {
            max_file_size: cfg.max_file_size,
        }
    }
}

/// A read-only memory map of an image file, bounded by `IOLimits`.
pub struct SafeReader {
    path: PathBuf,
    mmap: Mmap,
}

impl SafeReader {
    /// Opens a file and memory-maps it.
    ///
    /// Fails if the file is empty or larger than `limits.max_file_size`.
    pub fn open<P: AsRef<Path>>(path: P, limits: IOLimits) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let file_size = file.metadata()?.len();

        debug!(
            path = %path.display(),
            size = file_size,
            limits.max_file_size = limits.max_file_size,
            "Opening image"
        );

        if file_size > limits.max_file_size {
            warn!(
                path = %path.display(),
                size = file_size,
                limit = limits.max_file_size,
                "Image is too large"
            );
            return Err(IoError::FileTooLarge {
                limit: limits.max_file_size,
                found: file_size,
            });
        }
        // memmap cannot map empty files, and an empty file is never an image.
        if file_size == 0 {
            return Err(IoError::Empty);
        }

        // Safety: read-only map of a regular file; callers must not truncate
        // the file while the map is alive.
        let mmap = unsafe { Mmap::map(&file)? };

        Ok(Self {
            path: path.to_path_buf(),
            mmap,
        })
    }

    /// Path the map was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the total size of the underlying file in bytes.
    pub fn size(&self) -> u64 {
        self.mmap.len() as u64
    }

    /// The whole mapped file.
    pub fn data(&self) -> &[u8] {
        &self.mmap
    }
}

impl AsRef<[u8]> for SafeReader {
    fn as_ref(&self) -> &[u8] {
        &self.mmap
    }
}
