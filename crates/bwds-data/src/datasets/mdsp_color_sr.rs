//! MDSP color video sequences for multi-frame super-resolution.

use bwds_core::{
    BwdsError, DatasetBuilder, DatasetInfo, Dtype, Example, ExampleIter, FeatureSpec,
    FeatureValue, Resources, Result, Split, SplitGenerator, SplitSource, Version,
};
use bwds_formats::{MatFile, MatValue};
use ndarray::{Array4, ArrayD, Ix4, IxDyn};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::expect_files;

const NAME: &str = "mdsp_color_sr";

const VERSION: Version = Version::new(0, 0, 1);

const DESCRIPTION: &str = "
The data sets have been gathered during the past several years in the Multi-Dimensional Signal
Processing Research Group (MDSP).
";

const CITATION: &str = "
@misc{mdsp_milanfar,
  title={Peyman Milanfar},
  url={http://www.soe.ucsc.edu/~milanfar/software/sr-datasets.html},
  journal={MDSP Super-Resolution And Demosaicing Datasets :: Peyman Milanfar}
}
";

const HOMEPAGE: &str = "https://users.soe.ucsc.edu/~milanfar/software/sr-datasets.html";

const DOWNLOAD_BASE: &str = "https://users.soe.ucsc.edu/~milanfar/software/datasets";

/// MAT variable (also the file stem) and display name of every sequence.
pub const SEQUENCES: &[(&str, &str)] = &[
    ("face_adyoron_1", "Color Face 1"),
    ("face_adyoron_2", "Color Face 2"),
    ("Adyoron_small", "Surveillance (Small)"),
    ("Book_case1_small", "Bookcase 1 (Small)"),
    ("Book_case1", "Bookcase 1"),
];

/// Five color sequences stored as MATLAB `H x W x 3 x T` arrays.
#[derive(Debug, Clone, Default)]
pub struct MdspColorSr;

impl MdspColorSr {
    /// Create the builder.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn display_name(variable: &str) -> Option<&'static str> {
    SEQUENCES
        .iter()
        .find(|(name, _)| *name == variable)
        .map(|(_, display)| *display)
}

/// Convert a MATLAB `H x W x 3 x T` array into a `T x H x W x 3` video.
///
/// `uint8` data is taken as is; other numeric classes are rounded and
/// clamped to `0..=255`.
pub(crate) fn matlab_video(value: MatValue) -> Result<Array4<u8>> {
    let data: ArrayD<u8> = match value {
        MatValue::UInt8(data) => data,
        other => match other.to_f64() {
            Some(data) => data.mapv(|v| v.round().clamp(0.0, 255.0) as u8),
            None => {
                return Err(BwdsError::Format(format!(
                    "video has non-numeric class {}",
                    other.class_name()
                )))
            }
        },
    };
    if data.ndim() != 4 || data.shape()[2] != 3 {
        return Err(BwdsError::ShapeMismatch {
            expected: vec![0, 0, 3, 0],
            actual: data.shape().to_vec(),
        });
    }
    let video = data
        .permuted_axes(IxDyn(&[3, 0, 1, 2]))
        .as_standard_layout()
        .into_owned();
    Ok(video.into_dimensionality::<Ix4>()?)
}

fn load_sequence(variable: &str, path: &Path) -> Result<Example> {
    let key = display_name(variable)
        .ok_or_else(|| BwdsError::Config(format!("unknown sequence '{variable}'")))?;
    let mut mat = MatFile::from_file(path)?;
    let value = mat.take(variable).ok_or_else(|| {
        BwdsError::Format(format!("{} has no variable '{variable}'", path.display()))
    })?;
    let video = matlab_video(value)?;

    tracing::debug!(sequence = key, shape = ?video.shape(), "Loaded sequence");
    Ok(Example::new(key, [("video", FeatureValue::Video(video))]))
}

impl DatasetBuilder for MdspColorSr {
    fn name(&self) -> &'static str {
        NAME
    }

    fn info(&self) -> DatasetInfo {
        DatasetInfo::new(NAME, VERSION)
            .with_description(DESCRIPTION)
            .with_homepage(HOMEPAGE)
            .with_citation(CITATION)
            .with_release_note("0.0.1", "Alpha release.")
            .with_feature("video", FeatureSpec::video(Dtype::UInt8))
    }

    fn download_urls(&self) -> Vec<String> {
        SEQUENCES
            .iter()
            .map(|(variable, _)| format!("{DOWNLOAD_BASE}/{variable}.mat"))
            .collect()
    }

    fn split_generators(&self, resources: &Resources) -> Result<Vec<SplitGenerator>> {
        let files: BTreeMap<String, PathBuf> = SEQUENCES
            .iter()
            .map(|(variable, _)| {
                let path = resources.require_extracted(format!("{variable}.mat"))?;
                Ok((variable.to_string(), path))
            })
            .collect::<Result<_>>()?;
        Ok(vec![SplitGenerator::new(Split::Test, SplitSource::Files(files))])
    }

    fn generate_examples<'a>(&'a self, source: &SplitSource) -> Result<ExampleIter<'a>> {
        let files = expect_files(source)?.clone();
        Ok(Box::new(
            files
                .into_iter()
                .map(|(variable, path)| load_sequence(&variable, &path)),
        ))
    }
}
