//! Dataset builders.
//!
//! Every builder implements [`DatasetBuilder`](bwds_core::DatasetBuilder).
//! Builders with several variants take the config name at construction.

mod bsds500;
mod burst_sr;
mod cbsd68;
mod flickr2k;
mod hci_lf;
mod kodak24;
mod mc_master;
mod mdsp_color_sr;
mod schelten_kernels;
mod set14;
mod set5;
mod vid4;
mod waterloo_exploration;

pub use bsds500::Bsds500;
pub use burst_sr::BurstSr;
pub use cbsd68::Cbsd68;
pub use flickr2k::Flickr2k;
pub use hci_lf::HciLf;
pub use kodak24::Kodak24;
pub use mc_master::McMaster;
pub use mdsp_color_sr::MdspColorSr;
pub use schelten_kernels::ScheltenKernels;
pub use set14::Set14;
pub use set5::Set5;
pub use vid4::Vid4;
pub use waterloo_exploration::WaterlooExploration;

use bwds_core::{
    BuilderConfigInfo, BwdsError, Example, ExampleIter, FeatureValue, Result, SplitSource,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::image_io::load_rgb8;

/// Resolve a requested config name; `None` selects the first config.
pub(crate) fn select_config(
    dataset: &str,
    configs: &'static [BuilderConfigInfo],
    requested: Option<&str>,
) -> Result<&'static BuilderConfigInfo> {
    let unknown = |config: &str| BwdsError::UnknownConfig {
        dataset: dataset.to_string(),
        config: config.to_string(),
    };
    match requested {
        None => configs.first().ok_or_else(|| unknown("")),
        Some(name) => configs
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| unknown(name)),
    }
}

pub(crate) fn expect_dir<'s>(source: &'s SplitSource) -> Result<&'s Path> {
    match source {
        SplitSource::Dir(dir) => Ok(dir),
        other => Err(unexpected_source(other)),
    }
}

pub(crate) fn expect_file<'s>(source: &'s SplitSource) -> Result<&'s Path> {
    match source {
        SplitSource::File(file) => Ok(file),
        other => Err(unexpected_source(other)),
    }
}

pub(crate) fn expect_files(source: &SplitSource) -> Result<&BTreeMap<String, PathBuf>> {
    match source {
        SplitSource::Files(files) => Ok(files),
        other => Err(unexpected_source(other)),
    }
}

fn unexpected_source(source: &SplitSource) -> BwdsError {
    BwdsError::Config(format!("unexpected split source {source:?}"))
}

/// Files in `dir` with the given extension as `(stem, path)`, sorted by name.
pub(crate) fn list_files(dir: &Path, extension: &str) -> Result<Vec<(String, PathBuf)>> {
    let suffix = format!(".{extension}");
    let mut files: Vec<(String, PathBuf)> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|entry| {
            let name = entry.file_name().to_str()?.to_string();
            let stem = name.strip_suffix(&suffix)?.to_string();
            Some((stem, entry.path()))
        })
        .collect();
    files.sort();
    tracing::debug!(dir = %dir.display(), extension, count = files.len(), "Listed files");
    Ok(files)
}

/// Subdirectories of `dir` as `(name, path)`, sorted by name.
pub(crate) fn list_dirs(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut dirs: Vec<(String, PathBuf)> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .map(|entry| (entry.file_name().to_string_lossy().into_owned(), entry.path()))
        .collect();
    dirs.sort();
    Ok(dirs)
}

/// One record per file with the image decoded as 8-bit RGB into `field`.
pub(crate) fn image_examples<'a>(
    files: Vec<(String, PathBuf)>,
    field: &'static str,
) -> ExampleIter<'a> {
    Box::new(files.into_iter().map(move |(key, path)| {
        let image = load_rgb8(&path)?;
        Ok(Example::new(key, [(field, FeatureValue::Image(image))]))
    }))
}
