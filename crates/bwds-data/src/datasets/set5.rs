//! Set5 for single image super-resolution.

use bwds_core::{
    BuildConfig, BuilderConfigInfo, DatasetBuilder, DatasetInfo, Dtype, ExampleIter,
    FeatureSpec, Resources, Result, Split, SplitGenerator, SplitSource, Version,
};

use super::{expect_dir, image_examples, list_files, select_config};

const NAME: &str = "set5";

const DESCRIPTION: &str = "A set of 5 images to evaluate single image super-resolution.";

const CITATION: &str = "
@inproceedings{Bevilacqua2012,
  doi = {10.5244/c.26.135},
  url = {https://doi.org/10.5244/c.26.135},
  year = {2012},
  publisher = {British Machine Vision Association},
  author = {Marco Bevilacqua and Aline Roumy and Christine Guillemot and Marie-line Alberi Morel},
  title = {Low-Complexity Single-Image Super-Resolution based on Nonnegative Neighbor Embedding},
  booktitle = {Procedings of the British Machine Vision Conference 2012}
}
";

const HOMEPAGE: &str = "http://people.rennes.inria.fr/Aline.Roumy/results/SR_BMVC12.html";

const DOWNLOAD_URL: &str =
    "https://github.com/HedgehogCode/tensorflow-datasets-bw/releases/download/0.0.1rc/Set5.zip";

const CONFIGS: &[BuilderConfigInfo] = &[BuilderConfigInfo {
    name: "bicubic_x4",
    description: "Uses bicubic_x4 data.",
    version: Version::new(0, 1, 0),
}];

/// Five high-resolution test images.
#[derive(Debug, Clone)]
pub struct Set5 {
    config: &'static BuilderConfigInfo,
}

impl Set5 {
    /// Create the builder (`bicubic_x4` is the only config).
    pub fn new(config: Option<&str>, _build: &BuildConfig) -> Result<Self> {
        Ok(Self {
            config: select_config(NAME, CONFIGS, config)?,
        })
    }
}

impl DatasetBuilder for Set5 {
    fn name(&self) -> &'static str {
        NAME
    }

    fn info(&self) -> DatasetInfo {
        DatasetInfo::new(NAME, self.config.version)
            .with_config(self.config.name)
            .with_description(DESCRIPTION)
            .with_homepage(HOMEPAGE)
            .with_citation(CITATION)
            .with_feature("hr", FeatureSpec::image(Dtype::UInt8))
    }

    fn configs(&self) -> &[BuilderConfigInfo] {
        CONFIGS
    }

    fn download_urls(&self) -> Vec<String> {
        vec![DOWNLOAD_URL.to_string()]
    }

    fn split_generators(&self, resources: &Resources) -> Result<Vec<SplitGenerator>> {
        Ok(vec![SplitGenerator::new(
            Split::Test,
            SplitSource::Dir(resources.require_extracted("Set5")?),
        )])
    }

    fn generate_examples<'a>(&'a self, source: &SplitSource) -> Result<ExampleIter<'a>> {
        let files = list_files(expect_dir(source)?, "png")?;
        Ok(image_examples(files, "hr"))
    }
}
