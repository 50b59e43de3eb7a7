//! Error types for file format readers and writers.

use bwds_core::BwdsError;
use thiserror::Error;

/// Error type for binary format decoding and encoding.
#[derive(Debug, Error)]
pub enum FormatError {
    /// First line is neither `PF` nor `Pf`.
    #[error("not a recognized float-map header")]
    NotFloatMap,
    /// Dimension line does not hold two positive integers.
    #[error("malformed dimension header")]
    MalformedDimensions,
    /// Scale line is not a number.
    #[error("malformed scale header")]
    MalformedScale,
    /// Fewer sample bytes than the header announces.
    #[error("truncated sample data: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Bytes required by the header.
        expected: usize,
        /// Bytes present.
        actual: usize,
    },
    /// Scale that cannot be encoded.
    #[error("invalid float-map scale {0}")]
    InvalidScale(f32),
    /// Array shape that cannot be written.
    #[error("invalid array shape {0:?}")]
    InvalidShape(Vec<usize>),
    /// Missing or unknown MAT-file header.
    #[error("not a level 5 MAT-file")]
    NotMatFile,
    /// Structurally broken MAT-file.
    #[error("malformed MAT-file: {0}")]
    MalformedMat(String),
    /// Valid MAT-file content this reader does not handle.
    #[error("unsupported MAT-file content: {0}")]
    UnsupportedMat(String),
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error type for scene parameter files.
#[derive(Debug, Error)]
pub enum ParamsError {
    /// Line that is neither a section, an option, nor a comment.
    #[error("line {line}: {message}")]
    Syntax {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },
    /// Section not present.
    #[error("missing section [{0}]")]
    MissingSection(String),
    /// Key not present in the section.
    #[error("missing key '{key}' in section [{section}]")]
    MissingKey {
        /// Section name.
        section: String,
        /// Key name.
        key: String,
    },
    /// Value of the wrong type.
    #[error("invalid value '{value}' for key '{key}' in section [{section}]")]
    InvalidValue {
        /// Section name.
        section: String,
        /// Key name.
        key: String,
        /// Raw value.
        value: String,
    },
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<FormatError> for BwdsError {
    fn from(err: FormatError) -> Self {
        match err {
            FormatError::Io(e) => BwdsError::Io(e),
            other => BwdsError::Format(other.to_string()),
        }
    }
}

impl From<ParamsError> for BwdsError {
    fn from(err: ParamsError) -> Self {
        match err {
            ParamsError::Io(e) => BwdsError::Io(e),
            other => BwdsError::Config(other.to_string()),
        }
    }
}
