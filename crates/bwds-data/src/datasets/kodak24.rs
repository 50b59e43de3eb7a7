//! The Kodak Lossless True Color Image Suite.

use bwds_core::{
    DatasetBuilder, DatasetInfo, Dtype, Example, ExampleIter, FeatureSpec, FeatureValue,
    Resources, Result, Split, SplitGenerator, SplitSource, Version,
};

use std::collections::BTreeMap;
use std::path::PathBuf;

use super::expect_files;
use crate::image_io::load_rgb8;

const NAME: &str = "kodak24";

const VERSION: Version = Version::new(0, 0, 1);

const DESCRIPTION: &str = "
Lossless, true color images. Released by the Eastman Kodak Company for unrestricted usage.
Commonly used for compression and denoising testing.
";

const CITATION: &str = "
@misc{franzen,
  title={ Kodak Lossless True Color Image Suite},
  url={http://r0k.us/graphics/kodak/},
  journal={True Color Kodak Images},
  author={Franzen, Richard}
}
";

const HOMEPAGE: &str = "http://r0k.us/graphics/kodak/";

const NUM_IMAGES: usize = 24;

fn file_name(index: usize) -> String {
    format!("kodim{index:02}.png")
}

/// The 24 Kodak test images, keyed `01` to `24`.
#[derive(Debug, Clone, Default)]
pub struct Kodak24;

impl Kodak24 {
    /// Create the builder.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DatasetBuilder for Kodak24 {
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
        (1..=NUM_IMAGES)
            .map(|i| format!("{HOMEPAGE}kodak/{}", file_name(i)))
            .collect()
    }

    fn split_generators(&self, resources: &Resources) -> Result<Vec<SplitGenerator>> {
        let files: BTreeMap<String, PathBuf> = (1..=NUM_IMAGES)
            .map(|i| Ok((format!("{i:02}"), resources.require_extracted(file_name(i))?)))
            .collect::<Result<_>>()?;
        Ok(vec![SplitGenerator::new(Split::Test, SplitSource::Files(files))])
    }

    fn generate_examples<'a>(&'a self, source: &SplitSource) -> Result<ExampleIter<'a>> {
        let files = expect_files(source)?.clone();
        Ok(Box::new(files.into_iter().map(|(key, path)| {
            let image = load_rgb8(&path)?;
            Ok(Example::new(key, [("image", FeatureValue::Image(image))]))
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_urls() {
        let urls = Kodak24::new().download_urls();
        assert_eq!(urls.len(), 24);
        assert_eq!(urls[0], "http://r0k.us/graphics/kodak/kodak/kodim01.png");
        assert_eq!(urls[23], "http://r0k.us/graphics/kodak/kodak/kodim24.png");
    }

    #[test]
    fn test_missing_image_is_missing_resource() {
        let dir = tempfile::tempdir().unwrap();
        let resources = Resources::new(dir.path(), dir.path());
        assert!(matches!(
            Kodak24::new().split_generators(&resources),
            Err(bwds_core::BwdsError::MissingResource(_))
        ));
    }
}
