//! Set14 for single image super-resolution.

use bwds_core::{
    BuildConfig, DatasetBuilder, DatasetInfo, Dtype, Example, ExampleIter, FeatureSpec,
    FeatureValue, Resources, Result, Split, SplitGenerator, SplitSource, Version,
};

use super::{expect_dir, list_files};
use crate::image_io::load_rgb8;
use crate::image_processing::Downsampler;

const NAME: &str = "set14";

const VERSION: Version = Version::new(0, 3, 0);

const DESCRIPTION: &str = "A set of 14 images to evaluate single image super-resolution.";

const CITATION: &str = "
@incollection{Zeyde2012,
  doi = {10.1007/978-3-642-27413-8_47},
  url = {https://doi.org/10.1007/978-3-642-27413-8_47},
  year = {2012},
  publisher = {Springer Berlin Heidelberg},
  pages = {711--730},
  author = {Roman Zeyde and Michael Elad and Matan Protter},
  title = {On Single Image Scale-Up Using Sparse-Representations},
  booktitle = {Curves and Surfaces}
}
";

const HOMEPAGE: &str = "https://doi.org/10.1007/978-3-642-27413-8_47";

const DOWNLOAD_URL: &str =
    "https://github.com/HedgehogCode/tensorflow-datasets-bw/releases/download/0.0.1rc/Set14.zip";

/// Fourteen test images with derived low-resolution inputs.
#[derive(Debug, Clone)]
pub struct Set14 {
    downsampler: Downsampler,
}

impl Set14 {
    /// Create the builder; downsampling follows `build.downsample`.
    pub fn new(build: &BuildConfig) -> Result<Self> {
        Ok(Self {
            downsampler: Downsampler::from_config(&build.downsample)?,
        })
    }
}

impl DatasetBuilder for Set14 {
    fn name(&self) -> &'static str {
        NAME
    }

    fn info(&self) -> DatasetInfo {
        DatasetInfo::new(NAME, VERSION)
            .with_description(DESCRIPTION)
            .with_homepage(HOMEPAGE)
            .with_citation(CITATION)
            .with_feature("hr", FeatureSpec::image(Dtype::UInt8))
            .with_feature("lr", FeatureSpec::image(Dtype::UInt8))
    }

    fn download_urls(&self) -> Vec<String> {
        vec![DOWNLOAD_URL.to_string()]
    }

    fn split_generators(&self, resources: &Resources) -> Result<Vec<SplitGenerator>> {
        Ok(vec![SplitGenerator::new(
            Split::Test,
            SplitSource::Dir(resources.require_extracted("Set14")?),
        )])
    }

    fn generate_examples<'a>(&'a self, source: &SplitSource) -> Result<ExampleIter<'a>> {
        let files = list_files(expect_dir(source)?, "png")?;
        Ok(Box::new(files.into_iter().map(move |(key, path)| {
            let (hr, lr) = self.downsampler.downsample_image(&load_rgb8(&path)?)?;
            Ok(Example::new(
                key,
                [("hr", FeatureValue::Image(hr)), ("lr", FeatureValue::Image(lr))],
            ))
        })))
    }
}
