//! Flickr2K high-resolution images.

use bwds_core::{
    DatasetBuilder, DatasetInfo, Dtype, ExampleIter, FeatureSpec, Resources, Result, Split,
    SplitGenerator, SplitSource, Version,
};

use super::{expect_dir, image_examples, list_files};

const NAME: &str = "flickr2k";

const VERSION: Version = Version::new(0, 0, 1);

const DESCRIPTION: &str = "
The Flickr2k dataset was collected using the Flickr API. It contains 2650 images. Each image is
available in high resolution, low resolution with bicubic downsampling and low resolution with
unknown downsampling. Downsampling factors are 2x, 3x and 4x.

Only the high resolution images are provided, all in the 'train' split.
";

const CITATION: &str = "
@InProceedings{Lim_2017_CVPR_Workshops,
  author = {Lim, Bee and Son, Sanghyun and Kim, Heewon and Nah, Seungjun and Lee, Kyoung Mu},
  title = {Enhanced Deep Residual Networks for Single Image Super-Resolution},
  booktitle = {The IEEE Conference on Computer Vision and Pattern Recognition (CVPR) Workshops},
  month = {July},
  year = {2017}
}
";

const HOMEPAGE: &str = "https://github.com/limbee/NTIRE2017";

const MANUAL_DOWNLOAD_INSTRUCTIONS: &str = "
The manual directory should contain the folder 'Flickr2k'. Download and extract the dataset
from https://cv.snu.ac.kr/research/EDSR/Flickr2K.tar.
";

/// Flickr2K training images.
#[derive(Debug, Clone, Default)]
pub struct Flickr2k;

impl Flickr2k {
    /// Create the builder.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DatasetBuilder for Flickr2k {
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
            .with_feature("hr", FeatureSpec::image(Dtype::UInt8))
    }

    fn split_generators(&self, resources: &Resources) -> Result<Vec<SplitGenerator>> {
        Ok(vec![SplitGenerator::new(
            Split::Train,
            SplitSource::Dir(resources.require_manual("Flickr2k/Flickr2k_HR")?),
        )])
    }

    fn generate_examples<'a>(&'a self, source: &SplitSource) -> Result<ExampleIter<'a>> {
        let files = list_files(expect_dir(source)?, "png")?;
        Ok(image_examples(files, "hr"))
    }
}
