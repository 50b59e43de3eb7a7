//! Resolution of downloaded and manually provided resources.

use std::path::{Path, PathBuf};

use crate::{BuildConfig, BwdsError, Result};

/// Locates dataset files on disk.
///
/// Downloading and extracting is done elsewhere; builders only ask where
/// things ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resources {
    manual_dir: PathBuf,
    extract_dir: PathBuf,
}

impl Resources {
    /// Create a resolver from explicit directories.
    pub fn new(manual_dir: impl Into<PathBuf>, extract_dir: impl Into<PathBuf>) -> Self {
        Self {
            manual_dir: manual_dir.into(),
            extract_dir: extract_dir.into(),
        }
    }

    /// Create a resolver from the build configuration.
    #[must_use]
    pub fn from_config(config: &BuildConfig) -> Self {
        Self::new(&config.manual_dir, &config.extract_dir)
    }

    /// Manual download directory.
    #[must_use]
    pub fn manual_dir(&self) -> &Path {
        &self.manual_dir
    }

    /// Extraction directory.
    #[must_use]
    pub fn extract_dir(&self) -> &Path {
        &self.extract_dir
    }

    /// Path below the manual directory (not checked).
    pub fn manual_path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.manual_dir.join(relative)
    }

    /// Path below the extraction directory (not checked).
    pub fn extracted_path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.extract_dir.join(relative)
    }

    /// Path below the manual directory that must exist.
    pub fn require_manual(&self, relative: impl AsRef<Path>) -> Result<PathBuf> {
        require(self.manual_path(relative))
    }

    /// Path below the extraction directory that must exist.
    pub fn require_extracted(&self, relative: impl AsRef<Path>) -> Result<PathBuf> {
        require(self.extracted_path(relative))
    }
}

fn require(path: PathBuf) -> Result<PathBuf> {
    if path.exists() {
        Ok(path)
    } else {
        Err(BwdsError::MissingResource(path))
    }
}
