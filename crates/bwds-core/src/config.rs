//! Configuration types for bwds.

use crate::{BwdsError, ResizeFilter, ViewOrder};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Build configuration shared by every dataset builder.
///
/// Passed explicitly to the registry at startup; nothing in the workspace
/// keeps process-wide mutable state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Directory holding manually downloaded datasets (HCI light fields, Flickr2k, ...).
    #[serde(default = "default_manual_dir")]
    pub manual_dir: PathBuf,

    /// Directory where the download manager extracted archives and files.
    #[serde(default = "default_extract_dir")]
    pub extract_dir: PathBuf,

    /// Directories searched for `<dataset>.txt` checksum files.
    #[serde(default)]
    pub checksum_dirs: Vec<PathBuf>,

    /// Ordering of light-field view files.
    #[serde(default)]
    pub view_order: ViewOrder,

    /// Super-resolution downsampling applied by `set14` and `vid4`.
    #[serde(default)]
    pub downsample: DownsampleConfig,

    /// Side length of the zero placeholder used for missing ground-truth maps.
    #[serde(default = "default_aux_map_size")]
    pub aux_map_size: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            manual_dir: default_manual_dir(),
            extract_dir: default_extract_dir(),
            checksum_dirs: Vec::new(),
            view_order: ViewOrder::default(),
            downsample: DownsampleConfig::default(),
            aux_map_size: default_aux_map_size(),
        }
    }
}

impl BuildConfig {
    /// Create a configuration rooted at `root` (`root/manual`, `root/extracted`).
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            manual_dir: root.join("manual"),
            extract_dir: root.join("extracted"),
            ..Self::default()
        }
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&content)?;
        tracing::info!(path = %path.display(), "Loaded build config");
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> crate::Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> crate::Result<()> {
        if self.downsample.scale == 0 {
            return Err(BwdsError::Config(
                "downsample scale must be at least 1".to_string(),
            ));
        }
        if self.aux_map_size == 0 {
            return Err(BwdsError::Config(
                "aux_map_size must be at least 1".to_string(),
            ));
        }
        tracing::debug!(
            manual_dir = %self.manual_dir.display(),
            extract_dir = %self.extract_dir.display(),
            scale = self.downsample.scale,
            aux_map_size = self.aux_map_size,
            "Validated build config"
        );
        Ok(())
    }
}

/// Downsampling used to derive low-resolution inputs from high-resolution images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownsampleConfig {
    /// Integer downscaling factor.
    #[serde(default = "default_scale")]
    pub scale: u32,

    /// Resampling filter.
    #[serde(default)]
    pub filter: ResizeFilter,
}

impl Default for DownsampleConfig {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            filter: ResizeFilter::default(),
        }
    }
}

fn default_manual_dir() -> PathBuf {
    PathBuf::from("data/manual")
}

fn default_extract_dir() -> PathBuf {
    PathBuf::from("data/extracted")
}

fn default_aux_map_size() -> usize {
    512
}

fn default_scale() -> u32 {
    4
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_default_config() {
        let config = BuildConfig::default();
        assert_eq!(config.aux_map_size, 512);
        assert_eq!(config.downsample.scale, 4);
        assert_eq!(config.downsample.filter, ResizeFilter::Bicubic);
        assert_eq!(config.view_order, ViewOrder::Lexicographic);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_partial_config() {
        let yaml = r#"
manual_dir: /datasets/manual
checksum_dirs:
  - /datasets/checksums
view_order: numeric
downsample:
  scale: 2
"#;
        let config = BuildConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.manual_dir, PathBuf::from("/datasets/manual"));
        assert_eq!(config.extract_dir, PathBuf::from("data/extracted"));
        assert_eq!(config.checksum_dirs.len(), 1);
        assert_eq!(config.view_order, ViewOrder::Numeric);
        assert_eq!(config.downsample.scale, 2);
        assert_eq!(config.downsample.filter, ResizeFilter::Bicubic);
    }

    #[test]
    fn test_zero_scale_rejected() {
        let err = BuildConfig::from_yaml("downsample:\n  scale: 0\n").unwrap_err();
        assert!(matches!(err, BwdsError::Config(_)));
    }

    #[test]
    fn test_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bwds.yaml");
        std::fs::write(&path, "extract_dir: /tmp/extracted\naux_map_size: 64\n").unwrap();

        let config = BuildConfig::from_yaml_file(&path).unwrap();
        assert_eq!(config.extract_dir, PathBuf::from("/tmp/extracted"));
        assert_eq!(config.aux_map_size, 64);
    }

    #[test]
    fn test_yaml_file_loading_is_logged() {
        #[derive(Clone, Default)]
        struct Captured(Arc<Mutex<Vec<u8>>>);

        impl std::io::Write for Captured {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bwds.yaml");
        std::fs::write(&path, "aux_map_size: 32\n").unwrap();

        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            BuildConfig::from_yaml_file(&path).unwrap();
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Validated build config"), "{output}");
        assert!(output.contains("aux_map_size=32"), "{output}");
        assert!(output.contains("Loaded build config"), "{output}");
    }

    #[test]
    fn test_with_root() {
        let config = BuildConfig::with_root("/data");
        assert_eq!(config.manual_dir, PathBuf::from("/data/manual"));
        assert_eq!(config.extract_dir, PathBuf::from("/data/extracted"));
    }
}
