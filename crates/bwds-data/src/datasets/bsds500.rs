//! The Berkeley dataset for contour detection and image segmentation.

use bwds_core::{
    BuildConfig, BuilderConfigInfo, DatasetBuilder, DatasetInfo, Dtype, ExampleIter,
    FeatureSpec, Resources, Result, Split, SplitGenerator, SplitSource, Version,
};

use super::{expect_dir, image_examples, list_files, select_config};

const NAME: &str = "bsds500";

const DESCRIPTION: &str = "
The goal of this work is to provide an empirical basis for research on image
segmentation and boundary detection. In order to promote scientific progress in
the study of visual grouping, we provide the following resources:

* A large dataset of natural images that have been manually segmented. The
  human annotations serve as ground truth for learning grouping cues as well as
  a benchmark for comparing different segmentation and boundary detection
  algorithms.
* The most recent algorithms our group has developed for contour detection and
  image segmentation.
* Performance evaluation of the leading computational approaches to grouping.
";

const CITATION: &str = "
@Article{amfm_pami2011,
 author = {Arbelaez, Pablo and Maire, Michael and Fowlkes, Charless and Malik, Jitendra},
 title = {Contour Detection and Hierarchical Image Segmentation},
 journal = {IEEE Trans. Pattern Anal. Mach. Intell.},
 issue_date = {May 2011},
 volume = {33},
 number = {5},
 month = may,
 year = {2011},
 issn = {0162-8828},
 pages = {898--916},
 numpages = {19},
 url = {http://dx.doi.org/10.1109/TPAMI.2010.161},
 doi = {10.1109/TPAMI.2010.161},
 acmid = {1963088},
 publisher = {IEEE Computer Society},
 address = {Washington, DC, USA},
 keywords = {Contour detection, image segmentation, computer vision.},
}
";

const HOMEPAGE: &str =
    "https://www2.eecs.berkeley.edu/Research/Projects/CS/vision/grouping/resources.html";

const DOWNLOAD_URL: &str =
    "https://www2.eecs.berkeley.edu/Research/Projects/CS/vision/grouping/BSR/BSR_full.tgz";

const IMAGES_DIR: &str = "BSR/BSDS500/data/images";

/// Validation images used in the DMSP paper.
const DMSP_IMAGE_IDS: &[&str] = &[
    "101085", "108070", "130026", "148089", "167083", "196073", "220075", "241048", "295087",
    "304074",
];

const CONFIGS: &[BuilderConfigInfo] = &[
    BuilderConfigInfo {
        name: "all",
        description: "Use all images.",
        version: Version::new(0, 2, 0),
    },
    BuilderConfigInfo {
        name: "dmsp",
        description: "Use only the images used in the DMSP paper.",
        version: Version::new(0, 2, 0),
    },
];

/// BSDS500 natural images.
#[derive(Debug, Clone)]
pub struct Bsds500 {
    config: &'static BuilderConfigInfo,
}

impl Bsds500 {
    /// Create the builder for a config (`all` when `None`).
    pub fn new(config: Option<&str>, _build: &BuildConfig) -> Result<Self> {
        Ok(Self {
            config: select_config(NAME, CONFIGS, config)?,
        })
    }

    fn dmsp_subset(&self) -> bool {
        self.config.name == "dmsp"
    }
}

impl DatasetBuilder for Bsds500 {
    fn name(&self) -> &'static str {
        NAME
    }

    fn info(&self) -> DatasetInfo {
        DatasetInfo::new(NAME, self.config.version)
            .with_config(self.config.name)
            .with_description(DESCRIPTION)
            .with_homepage(HOMEPAGE)
            .with_citation(CITATION)
            .with_feature("image", FeatureSpec::image(Dtype::UInt8))
    }

    fn configs(&self) -> &[BuilderConfigInfo] {
        CONFIGS
    }

    fn download_urls(&self) -> Vec<String> {
        vec![DOWNLOAD_URL.to_string()]
    }

    fn split_generators(&self, resources: &Resources) -> Result<Vec<SplitGenerator>> {
        let dir = |name: &str| -> Result<SplitSource> {
            Ok(SplitSource::Dir(
                resources.require_extracted(format!("{IMAGES_DIR}/{name}"))?,
            ))
        };

        if self.dmsp_subset() {
            return Ok(vec![SplitGenerator::new(Split::Validation, dir("val")?)]);
        }
        Ok(vec![
            SplitGenerator::new(Split::Train, dir("train")?),
            SplitGenerator::new(Split::Validation, dir("val")?),
            SplitGenerator::new(Split::Test, dir("test")?),
        ])
    }

    fn generate_examples<'a>(&'a self, source: &SplitSource) -> Result<ExampleIter<'a>> {
        let mut files = list_files(expect_dir(source)?, "jpg")?;
        if self.dmsp_subset() {
            files.retain(|(key, _)| DMSP_IMAGE_IDS.contains(&key.as_str()));
        }
        Ok(image_examples(files, "image"))
    }
}
