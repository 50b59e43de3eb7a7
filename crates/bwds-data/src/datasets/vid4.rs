//! Vid4 for video super-resolution.

use bwds_core::{
    BuildConfig, BwdsError, DatasetBuilder, DatasetInfo, Dtype, Example, ExampleIter,
    FeatureSpec, FeatureValue, Resources, Result, Split, SplitGenerator, SplitSource, Version,
};
use ndarray::{stack, Array3, Array4, Axis};
use std::path::Path;

use super::expect_dir;
use crate::image_io::load_rgb8;
use crate::image_processing::Downsampler;

const NAME: &str = "vid4";

const VERSION: Version = Version::new(0, 1, 0);

const DESCRIPTION: &str = "
Classical dataset for testing video super-resolution consisting of 4 image sequences.

The sequences are
* walk (740x480, 47 frames)
* foliage (740x480, 49 frames)
* city (704x576, 34 frames)
* calendar (720x576, 41 frames)
";

const CITATION: &str = "
@inproceedings{liu2011bayesian,
  title={A bayesian approach to adaptive video super resolution},
  author={Liu, Ce and Sun, Deqing},
  booktitle={CVPR 2011},
  pages={209--216},
  year={2011},
  organization={IEEE}
}
";

const HOMEPAGE: &str =
    "https://github.com/YounggjuuChoi/Deep-Video-Super-Resolution/blob/master/Doc/Dataset.md#1-vid4";

const DOWNLOAD_URL: &str =
    "https://github.com/HedgehogCode/tensorflow-datasets-bw/releases/download/0.10.0/Vid4.zip";

/// Sequence names; each has a `<name>.txt` frame list.
pub const SEQUENCES: &[&str] = &["walk", "foliage", "city", "calendar"];

/// Four video sequences with derived low-resolution frames.
#[derive(Debug, Clone)]
pub struct Vid4 {
    downsampler: Downsampler,
}

impl Vid4 {
    /// Create the builder; downsampling follows `build.downsample`.
    pub fn new(build: &BuildConfig) -> Result<Self> {
        Ok(Self {
            downsampler: Downsampler::from_config(&build.downsample)?,
        })
    }

    fn load_sequence(&self, dir: &Path, sequence: &str) -> Result<Example> {
        let list = std::fs::read_to_string(dir.join(format!("{sequence}.txt")))?;
        let frames = list
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|file| load_rgb8(dir.join(file)))
            .collect::<Result<Vec<Array3<u8>>>>()?;
        let video = stack_frames(&frames)?;
        let (hr, lr) = self.downsampler.downsample_video(&video)?;

        tracing::debug!(sequence, frames = frames.len(), lr = ?lr.shape(), "Loaded sequence");
        Ok(Example::new(
            sequence,
            [("hr", FeatureValue::Video(hr)), ("lr", FeatureValue::Video(lr))],
        ))
    }
}

/// Stack equally sized frames into a `(frames, height, width, 3)` video.
pub(crate) fn stack_frames<T: Clone>(frames: &[Array3<T>]) -> Result<Array4<T>> {
    let Some(first) = frames.first() else {
        return Err(BwdsError::Config("sequence has no frames".to_string()));
    };
    if let Some(odd) = frames.iter().find(|f| f.dim() != first.dim()) {
        return Err(BwdsError::ShapeMismatch {
            expected: first.shape().to_vec(),
            actual: odd.shape().to_vec(),
        });
    }
    let views: Vec<_> = frames.iter().map(|f| f.view()).collect();
    Ok(stack(Axis(0), &views)?)
}

impl DatasetBuilder for Vid4 {
    fn name(&self) -> &'static str {
        NAME
    }

    fn info(&self) -> DatasetInfo {
        DatasetInfo::new(NAME, VERSION)
            .with_description(DESCRIPTION)
            .with_homepage(HOMEPAGE)
            .with_citation(CITATION)
            .with_release_note("0.1.0", "Initial release.")
            .with_feature("hr", FeatureSpec::video(Dtype::UInt8))
            .with_feature("lr", FeatureSpec::video(Dtype::UInt8))
    }

    fn download_urls(&self) -> Vec<String> {
        vec![DOWNLOAD_URL.to_string()]
    }

    fn split_generators(&self, resources: &Resources) -> Result<Vec<SplitGenerator>> {
        Ok(vec![SplitGenerator::new(
            Split::Test,
            SplitSource::Dir(resources.require_extracted("Vid4")?),
        )])
    }

    fn generate_examples<'a>(&'a self, source: &SplitSource) -> Result<ExampleIter<'a>> {
        let dir = expect_dir(source)?.to_path_buf();
        Ok(Box::new(
            SEQUENCES
                .iter()
                .map(move |sequence| self.load_sequence(&dir, sequence)),
        ))
    }
}
