//! Builder registry.
//!
//! Maps dataset names to constructors. A registry is built from an explicit
//! [`BuildConfig`]; nothing here is global.

use bwds_core::{BuildConfig, BwdsError, DatasetBuilder, Resources, Result};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::datasets::{
    Bsds500, BurstSr, Cbsd68, Flickr2k, HciLf, Kodak24, McMaster, MdspColorSr, ScheltenKernels,
    Set14, Set5, Vid4, WaterlooExploration,
};

/// Constructor for a builder, given an optional config name.
pub type Factory = fn(Option<&str>, &BuildConfig) -> Result<Box<dyn DatasetBuilder>>;

/// Registered dataset builders.
pub struct Registry {
    config: BuildConfig,
    factories: BTreeMap<&'static str, Factory>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.config)
            .field("datasets", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Reject a config name for datasets without configs.
fn no_config(dataset: &str, config: Option<&str>) -> Result<()> {
    match config {
        Some(config) => Err(BwdsError::UnknownConfig {
            dataset: dataset.to_string(),
            config: config.to_string(),
        }),
        None => Ok(()),
    }
}

impl Registry {
    /// Create a registry with every built-in dataset.
    pub fn new(config: BuildConfig) -> Result<Self> {
        config.validate()?;
        let mut registry = Self {
            config,
            factories: BTreeMap::new(),
        };

        registry.register("bsds500", |c, b| Ok(Box::new(Bsds500::new(c, b)?)));
        registry.register("burst_sr", |c, _| {
            no_config("burst_sr", c)?;
            Ok(Box::new(BurstSr::new()))
        });
        registry.register("cbsd68", |c, _| {
            no_config("cbsd68", c)?;
            Ok(Box::new(Cbsd68::new()))
        });
        registry.register("flickr2k", |c, _| {
            no_config("flickr2k", c)?;
            Ok(Box::new(Flickr2k::new()))
        });
        registry.register("hci_lf", |c, b| Ok(Box::new(HciLf::new(c, b)?)));
        registry.register("kodak24", |c, _| {
            no_config("kodak24", c)?;
            Ok(Box::new(Kodak24::new()))
        });
        registry.register("mc_master", |c, _| {
            no_config("mc_master", c)?;
            Ok(Box::new(McMaster::new()))
        });
        registry.register("mdsp_color_sr", |c, _| {
            no_config("mdsp_color_sr", c)?;
            Ok(Box::new(MdspColorSr::new()))
        });
        registry.register("schelten_kernels", |c, b| {
            Ok(Box::new(ScheltenKernels::new(c, b)?))
        });
        registry.register("set14", |c, b| {
            no_config("set14", c)?;
            Ok(Box::new(Set14::new(b)?))
        });
        registry.register("set5", |c, b| Ok(Box::new(Set5::new(c, b)?)));
        registry.register("vid4", |c, b| {
            no_config("vid4", c)?;
            Ok(Box::new(Vid4::new(b)?))
        });
        registry.register("waterloo_exploration", |c, _| {
            no_config("waterloo_exploration", c)?;
            Ok(Box::new(WaterlooExploration::new()))
        });

        Ok(registry)
    }

    /// Register a builder, replacing any previous one with the same name.
    pub fn register(&mut self, name: &'static str, factory: Factory) -> &mut Self {
        if self.factories.insert(name, factory).is_some() {
            tracing::warn!(dataset = name, "Replaced registered dataset");
        }
        self
    }

    /// Registered dataset names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.factories.keys().copied()
    }

    /// Instantiate a builder by `name` or `name/config`.
    pub fn builder(&self, spec: &str) -> Result<Box<dyn DatasetBuilder>> {
        let (name, config) = match spec.split_once('/') {
            Some((name, config)) => (name, Some(config)),
            None => (spec, None),
        };
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| BwdsError::UnknownDataset(name.to_string()))?;
        let builder = factory(config, &self.config)?;
        tracing::debug!(dataset = name, config, "Created builder");
        Ok(builder)
    }

    /// The checksum file for a dataset: the first `<dir>/<name>.txt` found
    /// in the configured checksum directories.
    pub fn checksum_file(&self, name: &str) -> Option<PathBuf> {
        self.config
            .checksum_dirs
            .iter()
            .map(|dir| dir.join(format!("{name}.txt")))
            .find(|path| path.is_file())
    }

    /// The build configuration.
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Resource resolver for the configured directories.
    pub fn resources(&self) -> Resources {
        Resources::from_config(&self.config)
    }
}
