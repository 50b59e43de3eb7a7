//! The McMaster dataset for image demosaicking.

use bwds_core::{
    DatasetBuilder, DatasetInfo, Dtype, ExampleIter, FeatureSpec, Resources, Result, Split,
    SplitGenerator, SplitSource, Version,
};

use super::{expect_dir, image_examples, list_files};

const NAME: &str = "mc_master";

const VERSION: Version = Version::new(0, 0, 1);

const DESCRIPTION: &str =
    "The McMaster dataset for color demosaicking (CDM) and color image processing.";

const CITATION: &str = "
@article{zhang2011color,
  title={Color demosaicking by local directional interpolation and nonlocal adaptive thresholding},
  author={Zhang, Lei and Wu, Xiaolin and Buades, Antoni and Li, Xin},
  journal={Journal of Electronic imaging},
  volume={20},
  number={2},
  pages={023016},
  year={2011},
  publisher={International Society for Optics and Photonics}
}
";

const HOMEPAGE: &str = "https://www4.comp.polyu.edu.hk/~cslzhang/CDM_Dataset.htm";

const MANUAL_DOWNLOAD_INSTRUCTIONS: &str = "
The manual directory should contain the folder 'McM'. Download and extract the dataset from
https://www4.comp.polyu.edu.hk/~cslzhang/CDM_Dataset.htm.
";

/// The 18 McMaster TIFF images.
#[derive(Debug, Clone, Default)]
pub struct McMaster;

impl McMaster {
    /// Create the builder.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DatasetBuilder for McMaster {
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
            Split::Test,
            SplitSource::Dir(resources.require_manual("McM")?),
        )])
    }

    fn generate_examples<'a>(&'a self, source: &SplitSource) -> Result<ExampleIter<'a>> {
        let files = list_files(expect_dir(source)?, "tif")?;
        Ok(image_examples(files, "image"))
    }
}
