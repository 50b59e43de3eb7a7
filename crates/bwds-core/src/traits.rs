//! Core trait definitions.

use crate::{BuilderConfigInfo, DatasetInfo, Example, Resources, Result, SplitGenerator, SplitSource};

/// Lazy, restartable sequence of examples.
///
/// Every call to [`DatasetBuilder::generate_examples`] starts a fresh
/// sequence. A failing record is yielded as an `Err` item; items after it
/// are still produced.
pub type ExampleIter<'a> = Box<dyn Iterator<Item = Result<Example>> + 'a>;

/// Capability set every dataset implements.
///
/// The driver calls [`info`](Self::info) for metadata,
/// [`split_generators`](Self::split_generators) to find out where each
/// split lives, and [`generate_examples`](Self::generate_examples) once per
/// split to enumerate records.
pub trait DatasetBuilder: Send + Sync {
    /// Registry name of the dataset.
    fn name(&self) -> &'static str;

    /// Dataset metadata and record schema.
    fn info(&self) -> DatasetInfo;

    /// Available builder configs. Empty for datasets without configs.
    fn configs(&self) -> &[BuilderConfigInfo] {
        &[]
    }

    /// URLs the download manager must fetch before
    /// [`split_generators`](Self::split_generators) can succeed.
    fn download_urls(&self) -> Vec<String> {
        Vec::new()
    }

    /// Resolve the source of every split.
    fn split_generators(&self, resources: &Resources) -> Result<Vec<SplitGenerator>>;

    /// Enumerate the examples of one split.
    fn generate_examples<'a>(&'a self, source: &SplitSource) -> Result<ExampleIter<'a>>;
}
