//! Unified error handling for N2K Displays
//!
//! This crate provides a single error type used across all N2K Displays components.
//! It uses thiserror for ergonomic error definitions with proper Display and Error trait impls.

use std::io;
use std::path::PathBuf;

/// Result type alias using DisplayError
pub type Result<T> = std::result::Result<T, DisplayError>;

/// Unified error type for all N2K Displays operations
#[derive(thiserror::Error, Debug)]
pub enum DisplayError {
    // ============================================================================
    // I/O and File System Errors
    // ============================================================================
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: io::Error,
    },

    #[error("File too large: {path} ({size} bytes, max {max_size} bytes)")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    // ============================================================================
    // Registry Lookup Errors
    // ============================================================================
    #[error("Unknown {vendor} display group: {key}")]
    UnknownGroup {
        vendor: String,
        key: String,
    },

    #[error("Unknown {vendor} color: {key}")]
    UnknownColor {
        vendor: String,
        key: String,
    },

    #[error("Display group {vendor}.{key} is disabled")]
    DisabledGroup {
        vendor: String,
        key: String,
    },

    #[error("No such control point: {0}")]
    UnknownPoint(String),

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Duplicate group mapping: {vendor} group {key} is mapped more than once")]
    DuplicateMapping {
        vendor: String,
        key: String,
    },

    // ============================================================================
    // Validation Errors
    // ============================================================================
    #[error("Invalid value for {path}: {reason}")]
    InvalidValue {
        path: String,
        reason: String,
    },

    // ============================================================================
    // Host Errors
    // ============================================================================
    #[error("Subscription failed: {0}")]
    Subscription(String),

    #[error("Display bridge is not running")]
    NotRunning,
}

impl DisplayError {
    /// Create a config error from a string
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid value error for a control point path
    pub fn invalid_value(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an unknown group error
    pub fn unknown_group(vendor: impl Into<String>, key: impl Into<String>) -> Self {
        Self::UnknownGroup {
            vendor: vendor.into(),
            key: key.into(),
        }
    }

    /// Create an unknown color error
    pub fn unknown_color(vendor: impl Into<String>, key: impl Into<String>) -> Self {
        Self::UnknownColor {
            vendor: vendor.into(),
            key: key.into(),
        }
    }

    /// Whether this error was caused by the caller's input rather than the bridge.
    ///
    /// Put handlers answer these with a 400 status instead of a 500.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::UnknownGroup { .. }
                | Self::UnknownColor { .. }
                | Self::DisabledGroup { .. }
                | Self::UnknownPoint(_)
                | Self::InvalidValue { .. }
        )
    }
}
