//! Error types for bwds.

use std::path::PathBuf;

use thiserror::Error;

use crate::Split;

/// Result type alias for bwds operations.
pub type Result<T> = std::result::Result<T, BwdsError>;

/// Main error type for bwds operations.
///
/// `Format` and `Config` errors abort the record being generated; the
/// driver reports them and carries on with the next record.
#[derive(Error, Debug)]
pub enum BwdsError {
    /// Malformed or truncated binary input.
    #[error("Format error: {0}")]
    Format(String),

    /// Missing or invalid scene/build configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required input file or directory does not exist.
    #[error("Missing resource: {}", .0.display())]
    MissingResource(PathBuf),

    /// No builder registered under this name.
    #[error("Unknown dataset: {0}")]
    UnknownDataset(String),

    /// The dataset exists but has no config with this name.
    #[error("Unknown config '{config}' for dataset '{dataset}'")]
    UnknownConfig {
        /// Dataset name.
        dataset: String,
        /// Requested config name.
        config: String,
    },

    /// Two records of one split share a key.
    #[error("Duplicate key '{key}' in split '{split}'")]
    DuplicateKey {
        /// Split that contains the duplicate.
        split: Split,
        /// The repeated key.
        key: String,
    },

    /// Array shape does not match what the caller expects.
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        /// Expected shape.
        expected: Vec<usize>,
        /// Actual shape.
        actual: Vec<usize>,
    },

    /// I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl BwdsError {
    /// Whether this error only affects the current record.
    #[must_use]
    pub fn is_record_local(&self) -> bool {
        matches!(
            self,
            Self::Format(_)
                | Self::Config(_)
                | Self::MissingResource(_)
                | Self::ShapeMismatch { .. }
                | Self::Io(_)
        )
    }
}

impl From<ndarray::ShapeError> for BwdsError {
    fn from(err: ndarray::ShapeError) -> Self {
        Self::Format(format!("invalid array shape: {err}"))
    }
}
