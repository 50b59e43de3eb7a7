//! Common type definitions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Named partition of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    /// Training data.
    Train,
    /// Validation data.
    Validation,
    /// Test data.
    Test,
}

impl Split {
    /// Lower-case split name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::Validation => "validation",
            Self::Test => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Split {
    type Err = crate::BwdsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "train" => Ok(Self::Train),
            "validation" | "val" => Ok(Self::Validation),
            "test" => Ok(Self::Test),
            other => Err(crate::BwdsError::Config(format!("unknown split '{other}'"))),
        }
    }
}

/// Element type of a declared feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dtype {
    /// 8-bit unsigned integer.
    UInt8,
    /// 16-bit unsigned integer.
    UInt16,
    /// 32-bit integer.
    Int32,
    /// 32-bit floating point.
    Float32,
    /// 64-bit floating point.
    Float64,
}

impl Dtype {
    /// Size of the dtype in bytes.
    #[must_use]
    pub const fn size_bytes(&self) -> usize {
        match self {
            Self::UInt8 => 1,
            Self::UInt16 => 2,
            Self::Int32 | Self::Float32 => 4,
            Self::Float64 => 8,
        }
    }
}

/// Ordering applied to light-field view file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewOrder {
    /// Plain string order of the file names (`input_10` sorts before `input_2`).
    #[default]
    Lexicographic,
    /// Order by the integer suffix of the file stem, then by name.
    Numeric,
}

/// Resampling filter for downsampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResizeFilter {
    /// Nearest neighbour.
    Nearest,
    /// Bilinear interpolation.
    Bilinear,
    /// Bicubic (Catmull-Rom) interpolation.
    #[default]
    Bicubic,
}

/// Dataset version (`major.minor.patch`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version {
    /// Major version.
    pub major: u32,
    /// Minor version.
    pub minor: u32,
    /// Patch version.
    pub patch: u32,
}

impl Version {
    /// Create a version.
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Kind of a declared feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    /// `H x W x C` image.
    Image,
    /// `T x H x W x C` frame stack.
    Video,
    /// Arbitrary n-d array.
    Tensor,
}

/// Declared schema entry of one record field.
///
/// `None` dimensions are unknown until a record is generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSpec {
    /// Feature kind.
    pub kind: FeatureKind,
    /// Shape, with `None` for variable dimensions.
    pub shape: Vec<Option<usize>>,
    /// Element type.
    pub dtype: Dtype,
}

impl FeatureSpec {
    /// RGB image of unknown size.
    #[must_use]
    pub fn image(dtype: Dtype) -> Self {
        Self {
            kind: FeatureKind::Image,
            shape: vec![None, None, Some(3)],
            dtype,
        }
    }

    /// RGB video of unknown length and size.
    #[must_use]
    pub fn video(dtype: Dtype) -> Self {
        Self {
            kind: FeatureKind::Video,
            shape: vec![None, None, None, Some(3)],
            dtype,
        }
    }

    /// Tensor of fixed shape.
    #[must_use]
    pub fn tensor(shape: &[usize], dtype: Dtype) -> Self {
        Self {
            kind: FeatureKind::Tensor,
            shape: shape.iter().copied().map(Some).collect(),
            dtype,
        }
    }

    /// Whether a concrete shape fits this declaration.
    #[must_use]
    pub fn accepts_shape(&self, shape: &[usize]) -> bool {
        self.shape.len() == shape.len()
            && self
                .shape
                .iter()
                .zip(shape)
                .all(|(declared, actual)| declared.map_or(true, |d| d == *actual))
    }
}

/// Metadata describing a dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetInfo {
    /// Registry name (`hci_lf`, `set5`, ...).
    pub name: String,
    /// Selected builder config, if the dataset has several.
    pub config: Option<String>,
    /// Dataset version.
    pub version: Version,
    /// Human readable description.
    pub description: String,
    /// Project homepage.
    pub homepage: String,
    /// BibTeX citation.
    pub citation: String,
    /// Record schema.
    pub features: BTreeMap<String, FeatureSpec>,
    /// Release notes keyed by version string.
    #[serde(default)]
    pub release_notes: BTreeMap<String, String>,
    /// Where to put files the user has to fetch by hand.
    #[serde(default)]
    pub manual_download_instructions: Option<String>,
}

impl DatasetInfo {
    /// Create metadata with an empty schema.
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            config: None,
            version,
            description: String::new(),
            homepage: String::new(),
            citation: String::new(),
            features: BTreeMap::new(),
            release_notes: BTreeMap::new(),
            manual_download_instructions: None,
        }
    }

    /// Set the selected builder config.
    #[must_use]
    pub fn with_config(mut self, config: impl Into<String>) -> Self {
        self.config = Some(config.into());
        self
    }

    /// Set the description (surrounding whitespace is trimmed).
    #[must_use]
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.trim().to_string();
        self
    }

    /// Set the homepage.
    #[must_use]
    pub fn with_homepage(mut self, homepage: impl Into<String>) -> Self {
        self.homepage = homepage.into();
        self
    }

    /// Set the citation (surrounding whitespace is trimmed).
    #[must_use]
    pub fn with_citation(mut self, citation: &str) -> Self {
        self.citation = citation.trim().to_string();
        self
    }

    /// Declare a record field.
    #[must_use]
    pub fn with_feature(mut self, name: impl Into<String>, spec: FeatureSpec) -> Self {
        self.features.insert(name.into(), spec);
        self
    }

    /// Add a release note.
    #[must_use]
    pub fn with_release_note(mut self, version: impl Into<String>, note: impl Into<String>) -> Self {
        self.release_notes.insert(version.into(), note.into());
        self
    }

    /// Set instructions for files that must be downloaded by hand.
    #[must_use]
    pub fn with_manual_download_instructions(mut self, instructions: &str) -> Self {
        self.manual_download_instructions = Some(instructions.trim().to_string());
        self
    }
}

/// Description of one builder config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderConfigInfo {
    /// Config name.
    pub name: &'static str,
    /// Description.
    pub description: &'static str,
    /// Version of the config.
    pub version: Version,
}

/// Where the records of one split come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitSource {
    /// A directory to scan.
    Dir(PathBuf),
    /// Several directories to scan in order.
    Dirs(Vec<PathBuf>),
    /// A single file.
    File(PathBuf),
    /// Files keyed by record key.
    Files(BTreeMap<String, PathBuf>),
}

/// A split together with the source it is generated from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitGenerator {
    /// Split name.
    pub split: Split,
    /// Source to read.
    pub source: SplitSource,
}

impl SplitGenerator {
    /// Create a split generator.
    #[must_use]
    pub fn new(split: Split, source: SplitSource) -> Self {
        Self { split, source }
    }
}
