//! 4D Light Field Benchmark (HCI, University of Konstanz).

use bwds_core::{
    BuildConfig, BuilderConfigInfo, DatasetBuilder, DatasetInfo, Dtype, ExampleIter,
    FeatureSpec, Resources, Result, Split, SplitGenerator, SplitSource, Version,
};

use super::{expect_dir, list_dirs, select_config};
use crate::lightfield::{LightFieldOptions, LightFieldScene};

const NAME: &str = "hci_lf";

const DESCRIPTION: &str = "
Data of the 4D Light Field Benchmark.

The dataset consists of
* 4 Stratified Scenes: config 'stratified', split 'test'
* 4 Test Scenes: split 'test'
* 4 Training Scenes: split 'train'
* 12 Additional Scenes: split 'validation'
";

const CITATION: &str = "
@inproceedings{honauer2016dataset,
  title={A dataset and evaluation methodology for depth estimation on 4D light fields},
  author={Honauer, Katrin and Johannsen, Ole and Kondermann, Daniel and Goldluecke, Bastian},
  booktitle={Asian Conference on Computer Vision},
  pages={19--34},
  year={2016},
  organization={Springer}
}
";

const HOMEPAGE: &str = "https://lightfield-analysis.uni-konstanz.de/";

const MANUAL_DOWNLOAD_INSTRUCTIONS: &str = "
The manual directory should contain the folders
* 'hcilf/additional'
* 'hcilf/stratified'
* 'hcilf/test'
* 'hcilf/training'

Request the dataset from https://lightfield-analysis.uni-konstanz.de/ and extract it.
";

const CONFIGS: &[BuilderConfigInfo] = &[
    BuilderConfigInfo {
        name: "simulated",
        description: "All simulated light fields",
        version: Version::new(0, 1, 0),
    },
    BuilderConfigInfo {
        name: "stratified",
        description: "Stratified light fields",
        version: Version::new(0, 1, 0),
    },
];

/// Directory entries that are not scenes.
const NON_SCENE_ENTRIES: &[&str] = &["license.txt"];

/// Light fields of a 9x9 camera grid with depth and disparity ground truth.
#[derive(Debug, Clone)]
pub struct HciLf {
    config: &'static BuilderConfigInfo,
    options: LightFieldOptions,
}

impl HciLf {
    /// Create the builder for a config (`simulated` when `None`).
    pub fn new(config: Option<&str>, build: &BuildConfig) -> Result<Self> {
        Ok(Self {
            config: select_config(NAME, CONFIGS, config)?,
            options: LightFieldOptions::from(build),
        })
    }

    fn stratified(&self) -> bool {
        self.config.name == "stratified"
    }
}

impl DatasetBuilder for HciLf {
    fn name(&self) -> &'static str {
        NAME
    }

    fn info(&self) -> DatasetInfo {
        DatasetInfo::new(NAME, self.config.version)
            .with_config(self.config.name)
            .with_description(DESCRIPTION)
            .with_homepage(HOMEPAGE)
            .with_citation(CITATION)
            .with_manual_download_instructions(MANUAL_DOWNLOAD_INSTRUCTIONS)
            .with_feature("lf", FeatureSpec::tensor(&[9, 9, 512, 512, 3], Dtype::UInt8))
            .with_feature("depth", FeatureSpec::tensor(&[512, 512], Dtype::Float32))
            .with_feature("disparity", FeatureSpec::tensor(&[512, 512], Dtype::Float32))
    }

    fn configs(&self) -> &[BuilderConfigInfo] {
        CONFIGS
    }

    fn split_generators(&self, resources: &Resources) -> Result<Vec<SplitGenerator>> {
        let dir = |name: &str| -> Result<SplitSource> {
            Ok(SplitSource::Dir(resources.require_manual(format!("hcilf/{name}"))?))
        };

        if self.stratified() {
            return Ok(vec![SplitGenerator::new(Split::Test, dir("stratified")?)]);
        }
        Ok(vec![
            SplitGenerator::new(Split::Train, dir("training")?),
            SplitGenerator::new(Split::Test, dir("test")?),
            SplitGenerator::new(Split::Validation, dir("additional")?),
        ])
    }

    fn generate_examples<'a>(&'a self, source: &SplitSource) -> Result<ExampleIter<'a>> {
        let scenes: Vec<_> = list_dirs(expect_dir(source)?)?
            .into_iter()
            .filter(|(name, _)| !NON_SCENE_ENTRIES.contains(&name.as_str()))
            .collect();
        tracing::info!(count = scenes.len(), "Found light-field scenes");

        Ok(Box::new(scenes.into_iter().map(move |(_, path)| {
            LightFieldScene::load(&path, &self.options).map(LightFieldScene::into_example)
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bwds_core::BwdsError;

    #[test]
    fn test_configs() {
        let build = BuildConfig::default();
        let simulated = HciLf::new(None, &build).unwrap();
        assert_eq!(simulated.info().config.as_deref(), Some("simulated"));
        assert!(HciLf::new(Some("stratified"), &build).unwrap().stratified());
        assert!(matches!(
            HciLf::new(Some("real"), &build),
            Err(BwdsError::UnknownConfig { .. })
        ));
    }

    #[test]
    fn test_split_directories() {
        let root = tempfile::tempdir().unwrap();
        let build = BuildConfig::with_root(root.path());
        for dir in ["training", "test", "additional", "stratified"] {
            std::fs::create_dir_all(build.manual_dir.join("hcilf").join(dir)).unwrap();
        }
        let resources = Resources::from_config(&build);

        let splits = HciLf::new(None, &build)
            .unwrap()
            .split_generators(&resources)
            .unwrap();
        assert_eq!(splits.len(), 3);
        assert_eq!(
            splits[2],
            SplitGenerator::new(
                Split::Validation,
                SplitSource::Dir(build.manual_dir.join("hcilf/additional"))
            )
        );

        let stratified = HciLf::new(Some("stratified"), &build)
            .unwrap()
            .split_generators(&resources)
            .unwrap();
        assert_eq!(stratified.len(), 1);
        assert_eq!(stratified[0].split, Split::Test);
    }

    #[test]
    fn test_missing_manual_dir() {
        let root = tempfile::tempdir().unwrap();
        let build = BuildConfig::with_root(root.path());
        let err = HciLf::new(None, &build)
            .unwrap()
            .split_generators(&Resources::from_config(&build))
            .unwrap_err();
        assert!(matches!(err, BwdsError::MissingResource(_)));
    }
}
