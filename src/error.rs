//! Error types for the codenav disassembly navigator.
//!
//! Navigation itself almost never fails: an undecodable address is a signal,
//! not an error. The variants here cover loading an image, building the
//! region table, and the one region transition that has no defined recovery.

use thiserror::Error;

use crate::formats::pe::PeError;
use crate::io::error::IoError;

/// Main error type for codenav operations.
#[derive(Debug, Error)]
pub enum NavError {
    /// Image format parsing errors
    #[error("Invalid image format: {0}")]
    InvalidFormat(String),

    /// Parse error with location information
    #[error("Parse error at offset {offset:#x}: {message}")]
    ParseError { offset: u64, message: String },

    /// Invalid input data (bad layouts, inconsistent section tables)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Architecture not supported by the decoder
    #[error("Unsupported architecture: {0}")]
    UnsupportedArchitecture(String),

    /// Moving up into the end of a code region from a later region.
    /// The last instruction boundary of a code region cannot be derived
    /// without decoding the whole region, so the move is refused.
    #[error("Cannot determine the last instruction boundary of region {region} ({start:#x} - {end:#x})")]
    UnresolvedRegionEnd { region: String, start: i64, end: i64 },

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration (de)serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for codenav operations
pub type Result<T> = std::result::Result<T, NavError>;

impl From<PeError> for NavError {
    fn from(err: PeError) -> Self {
        match err {
            PeError::TruncatedHeader { expected, actual } => NavError::ParseError {
                offset: actual as u64,
                message: format!("truncated header, expected {} bytes", expected),
            },
            PeError::InvalidOffset { offset } => NavError::ParseError {
                offset: offset as u64,
                message: "invalid file offset".to_string(),
            },
            other => NavError::InvalidFormat(other.to_string()),
        }
    }
}

impl From<IoError> for NavError {
    fn from(err: IoError) -> Self {
        match err {
            IoError::StdIo(e) => NavError::Io(e),
            other => NavError::InvalidInput(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for NavError {
    fn from(err: serde_json::Error) -> Self {
        NavError::Serialization(err.to_string())
    }
}
