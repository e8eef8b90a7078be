//! Configuration for the navigator.
//!
//! Centralizes the reverse-search tuning constants, line formatting and I/O
//! limits with defaults matching the empirically tuned values.

use serde::{Deserialize, Serialize};

use crate::error::{NavError, Result};

/// Smallest accepted `max_instruction_len`: the longest legal x86 encoding.
pub const MIN_SEARCH_INSTRUCTION_LEN: i64 = 15;

/// Master configuration for image loading and navigation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Reverse-search window tuning.
    pub search: SearchConfig,
    /// Rendering of instruction lines.
    pub format: FormatConfig,
    /// File loading limits.
    pub io: IOConfig,
}

impl NavigatorConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// `Serialization` for malformed JSON, `InvalidInput` when a value is out
    /// of range.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.search.validate()
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Tuning for the backward boundary search over a forward-only decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Upper bound on the encoded length of one instruction, in bytes.
    pub max_instruction_len: i64,
    /// Extra instructions' worth of bytes decoded ahead of the target, to
    /// absorb the bytes lost while resynchronizing from a mid-instruction start.
    pub window_margin: i64,
    /// Bytes skipped after a failed decode before retrying.
    pub resync_skip: i64,
}

impl SearchConfig {
    /// Reject values that would let the search window miss the target or
    /// stall on undecodable bytes.
    pub fn validate(&self) -> Result<()> {
        if self.max_instruction_len < MIN_SEARCH_INSTRUCTION_LEN {
            return Err(NavError::InvalidInput(format!(
                "search.max_instruction_len must be at least {}, got {}",
                MIN_SEARCH_INSTRUCTION_LEN, self.max_instruction_len
            )));
        }
        if self.window_margin < 0 {
            return Err(NavError::InvalidInput(format!(
                "search.window_margin must not be negative, got {}",
                self.window_margin
            )));
        }
        if self.resync_skip < 1 {
            return Err(NavError::InvalidInput(format!(
                "search.resync_skip must be at least 1, got {}",
                self.resync_skip
            )));
        }
        Ok(())
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_instruction_len: 16,
            window_margin: 3,
            resync_skip: 2,
        }
    }
}

/// Formatting of decoded instruction lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    /// Include the raw instruction bytes column.
    pub show_bytes: bool,
    /// Width of the raw bytes column, in characters.
    pub bytes_column_width: usize,
    /// Render hex digits (addresses, bytes, immediates) in uppercase.
    pub uppercase_hex: bool,
    /// Column at which the first operand starts, relative to the mnemonic.
    pub first_operand_char_index: u32,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            show_bytes: true,
            bytes_column_width: 16,
            uppercase_hex: false,
            first_operand_char_index: 8,
        }
    }
}

/// Configuration for I/O operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IOConfig {
    /// Maximum image file size that will be mapped.
    pub max_file_size: u64,
}

impl Default for IOConfig {
    fn default() -> Self {
        Self {
            max_file_size: 100 * 1024 * 1024, // 100MB
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_defaults() {
        let cfg = SearchConfig::default();
        assert_eq!(cfg.max_instruction_len, 16);
        assert_eq!(cfg.window_margin, 3);
        assert_eq!(cfg.resync_skip, 2);
    }

    #[test]
    fn test_format_defaults() {
        let cfg = FormatConfig::default();
        assert!(cfg.show_bytes);
        assert_eq!(cfg.bytes_column_width, 16);
        assert!(!cfg.uppercase_hex);
        assert_eq!(cfg.first_operand_char_index, 8);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg = NavigatorConfig::from_json(r#"{ "format": { "uppercase_hex": true } }"#)
            .unwrap();
        assert!(cfg.format.uppercase_hex);
        assert!(cfg.format.show_bytes);
        assert_eq!(cfg.search, SearchConfig::default());
        assert_eq!(cfg.io.max_file_size, 100 * 1024 * 1024);
    }

    #[test]
    fn test_json_roundtrip_preserves_values() {
        let mut cfg = NavigatorConfig::default();
        cfg.io.max_file_size = 4096;
        cfg.search.window_margin = 5;
        let text = cfg.to_json().unwrap();
        let back = NavigatorConfig::from_json(&text).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn test_default_search_is_valid() {
        assert!(SearchConfig::default().validate().is_ok());
        assert!(NavigatorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_out_of_range_search_rejected() {
        for json in [
            r#"{"search": {"window_margin": -10}}"#,
            r#"{"search": {"max_instruction_len": 0}}"#,
            r#"{"search": {"max_instruction_len": 14}}"#,
            r#"{"search": {"resync_skip": 0}}"#,
            r#"{"search": {"resync_skip": -2}}"#,
        ] {
            let err = NavigatorConfig::from_json(json).unwrap_err();
            assert!(
                matches!(err, crate::error::NavError::InvalidInput(_)),
                "{json}: {err}"
            );
        }
    }

    #[test]
    fn test_boundary_search_values_accepted() {
        let cfg = SearchConfig {
            max_instruction_len: 15,
            window_margin: 0,
            resync_skip: 1,
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_invalid_json_is_serialization_error() {
        let err = NavigatorConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, crate::error::NavError::Serialization(_)));
    }
}
