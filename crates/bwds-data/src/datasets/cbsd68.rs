//! Color BSD68 for image denoising benchmarks.

use bwds_core::{
    DatasetBuilder, DatasetInfo, Dtype, ExampleIter, FeatureSpec, Resources, Result, Split,
    SplitGenerator, SplitSource, Version,
};

use super::{expect_dir, image_examples, list_files};

const NAME: &str = "cbsd68";

const VERSION: Version = Version::new(0, 0, 1);

const DESCRIPTION: &str = "
Color BSD68 dataset for image denoising benchmarks.
It is part of The Berkeley Segmentation Dataset and
Benchmark https://www2.eecs.berkeley.edu/Research/Projects/CS/vision/bsds/
";

const CITATION: &str = "
@inproceedings{martin2001database,
  title={A database of human segmented natural images and its application to evaluating
        segmentation algorithms and measuring ecological statistics},
  author={Martin, David and Fowlkes, Charless and Tal, Doron and Malik, Jitendra},
  booktitle={Proceedings Eighth IEEE International Conference on Computer Vision. ICCV 2001},
  volume={2},
  pages={416--423},
  year={2001},
  organization={IEEE}
}
";

const HOMEPAGE: &str = "https://github.com/clausmichele/CBSD68-dataset";

const REVISION: &str = "51a07a95884ac7c8bdd5d1614f9da781adc3c4a0";

/// The 68 clean test images.
#[derive(Debug, Clone, Default)]
pub struct Cbsd68;

impl Cbsd68 {
    /// Create the builder.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DatasetBuilder for Cbsd68 {
    fn name(&self) -> &'static str {
        NAME
    }

    fn info(&self) -> DatasetInfo {
        DatasetInfo::new(NAME, VERSION)
            .with_description(DESCRIPTION)
            .with_homepage(HOMEPAGE)
            .with_citation(CITATION)
            .with_release_note("0.0.1", "Alpha release.")
            .with_feature("image", FeatureSpec::image(Dtype::UInt8))
    }

    fn download_urls(&self) -> Vec<String> {
        vec![format!("{HOMEPAGE}/archive/{REVISION}.zip")]
    }

    fn split_generators(&self, resources: &Resources) -> Result<Vec<SplitGenerator>> {
        let dir = resources.require_extracted(format!(
            "CBSD68-dataset-{REVISION}/CBSD68/original_png"
        ))?;
        Ok(vec![SplitGenerator::new(Split::Test, SplitSource::Dir(dir))])
    }

    fn generate_examples<'a>(&'a self, source: &SplitSource) -> Result<ExampleIter<'a>> {
        let files = list_files(expect_dir(source)?, "png")?;
        Ok(image_examples(files, "image"))
    }
}
