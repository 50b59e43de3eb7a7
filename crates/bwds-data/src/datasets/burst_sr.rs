//! BurstSR for multi-frame super-resolution.

use bwds_core::{
    DatasetBuilder, DatasetInfo, Dtype, Example, ExampleIter, FeatureSpec, FeatureValue,
    Resources, Result, Split, SplitGenerator, SplitSource, Version,
};
use ndarray::Array3;
use std::path::Path;

use super::vid4::stack_frames;
use super::{expect_dir, list_dirs};
use crate::image_io::load_rgb16;

const NAME: &str = "burst_sr";

const VERSION: Version = Version::new(0, 0, 1);

const DESCRIPTION: &str = "
The BurstSR dataset contains RAW bursts captured from a Samsung Galaxy S8 and corresponding HR
ground truths captured using a DSLR camera.
";

const CITATION: &str = "
@inproceedings{bhat2021deep,
  title={Deep burst super-resolution},
  author={Bhat, Goutam and Danelljan, Martin and Van Gool, Luc and Timofte, Radu},
  booktitle={Proceedings of the IEEE/CVF Conference on Computer Vision and Pattern Recognition},
  pages={9209--9218},
  year={2021}
}
";

const HOMEPAGE: &str = "https://github.com/goutamgmb/deep-burst-sr";

const DOWNLOAD_URL: &str = "https://data.vision.ee.ethz.ch/bhatg/BurstSRChallenge/val.zip";

const RAW_IMAGE: &str = "im_raw.png";
const HR_CAMERA: &str = "canon";
const LR_CAMERA_PREFIX: &str = "samsung_";

/// Validation bursts: one DSLR ground truth and a stack of phone frames each.
#[derive(Debug, Clone, Default)]
pub struct BurstSr;

impl BurstSr {
    /// Create the builder.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn load_burst(key: String, dir: &Path) -> Result<Example> {
    let hr = load_rgb16(dir.join(HR_CAMERA).join(RAW_IMAGE))?;
    let frames = list_dirs(dir)?
        .into_iter()
        .filter(|(name, _)| name.starts_with(LR_CAMERA_PREFIX))
        .map(|(_, frame_dir)| load_rgb16(frame_dir.join(RAW_IMAGE)))
        .collect::<Result<Vec<Array3<u16>>>>()?;
    let lr = stack_frames(&frames)?;

    tracing::debug!(burst = %key, frames = frames.len(), "Loaded burst");
    Ok(Example::new(
        key,
        [
            ("hr", FeatureValue::Image16(hr)),
            ("lr", FeatureValue::Video16(lr)),
        ],
    ))
}

impl DatasetBuilder for BurstSr {
    fn name(&self) -> &'static str {
        NAME
    }

    fn info(&self) -> DatasetInfo {
        DatasetInfo::new(NAME, VERSION)
            .with_description(DESCRIPTION)
            .with_homepage(HOMEPAGE)
            .with_citation(CITATION)
            .with_release_note("0.0.1", "Alpha release.")
            .with_feature("hr", FeatureSpec::image(Dtype::UInt16))
            .with_feature("lr", FeatureSpec::video(Dtype::UInt16))
    }

    fn download_urls(&self) -> Vec<String> {
        vec![DOWNLOAD_URL.to_string()]
    }

    fn split_generators(&self, resources: &Resources) -> Result<Vec<SplitGenerator>> {
        Ok(vec![SplitGenerator::new(
            Split::Validation,
            SplitSource::Dir(resources.require_extracted("val")?),
        )])
    }

    fn generate_examples<'a>(&'a self, source: &SplitSource) -> Result<ExampleIter<'a>> {
        let bursts = list_dirs(expect_dir(source)?)?;
        Ok(Box::new(
            bursts
                .into_iter()
                .map(|(key, dir)| load_burst(key, &dir)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};
    use std::fs;

    fn write_raw(dir: &Path, value: u16) {
        fs::create_dir_all(dir).unwrap();
        let image: ImageBuffer<Rgb<u16>, Vec<u16>> =
            ImageBuffer::from_pixel(6, 4, Rgb([value, value + 1, value + 2]));
        image.save(dir.join(RAW_IMAGE)).unwrap();
    }

    #[test]
    fn test_burst_record() {
        let root = tempfile::tempdir().unwrap();
        let burst = root.path().join("0000");
        write_raw(&burst.join("canon"), 1000);
        write_raw(&burst.join("samsung_01"), 20);
        write_raw(&burst.join("samsung_00"), 10);

        let examples: Vec<Example> = BurstSr::new()
            .generate_examples(&SplitSource::Dir(root.path().to_path_buf()))
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(examples.len(), 1);
        assert_eq!(examples[0].key, "0000");

        let Some(FeatureValue::Image16(hr)) = examples[0].get("hr") else {
            panic!("hr is not a 16-bit image");
        };
        assert_eq!(hr.shape(), &[4, 6, 3]);
        assert_eq!(hr[[0, 0, 2]], 1002);

        let Some(FeatureValue::Video16(lr)) = examples[0].get("lr") else {
            panic!("lr is not a 16-bit video");
        };
        assert_eq!(lr.shape(), &[2, 4, 6, 3]);
        assert_eq!(lr[[0, 0, 0, 0]], 10);
        assert_eq!(lr[[1, 0, 0, 0]], 20);
    }

    #[test]
    fn test_missing_ground_truth_fails_record() {
        let root = tempfile::tempdir().unwrap();
        write_raw(&root.path().join("0001").join("samsung_00"), 10);

        let results: Vec<Result<Example>> = BurstSr::new()
            .generate_examples(&SplitSource::Dir(root.path().to_path_buf()))
            .unwrap()
            .collect();
        assert_eq!(results.len(), 1);
        assert!(results[0].as_ref().is_err_and(|e| e.is_record_local()));
    }
}
