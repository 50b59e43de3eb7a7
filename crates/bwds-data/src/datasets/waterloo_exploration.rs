//! Waterloo Exploration database (pristine images).

use bwds_core::{
    DatasetBuilder, DatasetInfo, Dtype, ExampleIter, FeatureSpec, Resources, Result, Split,
    SplitGenerator, SplitSource, Version,
};

use super::{expect_dir, image_examples, list_files};

const NAME: &str = "waterloo_exploration";

const VERSION: Version = Version::new(0, 0, 1);

const DESCRIPTION: &str = "
The Waterloo Exploration database contains 4,744 pristine natural images and 94,880 distorted
images and was created to evaluate image quality assessment models.

Only the pristine natural images are provided, all in the 'train' split.
";

const CITATION: &str = "
@article{ma2016waterloo,
  title={Waterloo exploration database: New challenges for image quality assessment models},
  author={Ma, Kede and Duanmu, Zhengfang and Wu, Qingbo and Wang, Zhou and Yong, Hongwei and Li, Hongliang and Zhang, Lei},
  journal={IEEE Transactions on Image Processing},
  volume={26},
  number={2},
  pages={1004--1016},
  year={2016},
  publisher={IEEE}
}
";

const HOMEPAGE: &str = "https://ece.uwaterloo.ca/~k29ma/exploration/";

const MANUAL_DOWNLOAD_INSTRUCTIONS: &str = "
The manual directory should contain the folder 'exploration_database_and_code'. Download and
extract the dataset from https://ece.uwaterloo.ca/~k29ma/exploration/.
";

/// Pristine Waterloo Exploration images. Alpha channels are dropped on load.
#[derive(Debug, Clone, Default)]
pub struct WaterlooExploration;

impl WaterlooExploration {
    /// Create the builder.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DatasetBuilder for WaterlooExploration {
    fn name(&self) -> &'static str {
        NAME
    }

    fn info(&self) -> DatasetInfo {
        DatasetInfo::new(NAME, VERSION)
            .with_description(DESCRIPTION)
            .with_homepage(HOMEPAGE)
            .with_citation(CITATION)
            .with_release_note("0.0.1", "Alpha release.")
            .with_manual_download_instructions(MANUAL_DOWNLOAD_INSTRUCTIONS)
            .with_feature("image", FeatureSpec::image(Dtype::UInt8))
    }

    fn split_generators(&self, resources: &Resources) -> Result<Vec<SplitGenerator>> {
        Ok(vec![SplitGenerator::new(
            Split::Train,
            SplitSource::Dir(
                resources.require_manual("exploration_database_and_code/pristine_images")?,
            ),
        )])
    }

    fn generate_examples<'a>(&'a self, source: &SplitSource) -> Result<ExampleIter<'a>> {
        let files = list_files(expect_dir(source)?, "bmp")?;
        Ok(image_examples(files, "image"))
    }
}
