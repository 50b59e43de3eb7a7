//! Preparation driver.
//!
//! [`Preparer`] walks every split of a builder, checks each record against
//! the declared schema and hands it to a sink. Record-local failures are
//! logged, counted and skipped; enumeration continues with the next record.

use bwds_core::{
    BwdsError, DatasetBuilder, DatasetInfo, Example, Resources, Result, Split,
};
use std::collections::{BTreeMap, HashSet};

/// Per-split counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitSummary {
    /// Records handed to the sink.
    pub examples: usize,
    /// Records skipped because of an error.
    pub failures: usize,
    /// Payload bytes of all emitted records.
    pub bytes: usize,
}

/// A skipped record.
#[derive(Debug)]
pub struct RecordFailure {
    /// Split the record belonged to.
    pub split: Split,
    /// Why it was skipped.
    pub error: BwdsError,
}

/// Outcome of preparing one dataset.
#[derive(Debug, Default)]
pub struct PrepareSummary {
    /// Dataset name.
    pub dataset: String,
    /// Selected builder config.
    pub config: Option<String>,
    /// Counters per split.
    pub splits: BTreeMap<Split, SplitSummary>,
    /// Every skipped record in enumeration order.
    pub failures: Vec<RecordFailure>,
}

impl PrepareSummary {
    /// Records emitted over all splits.
    #[must_use]
    pub fn total_examples(&self) -> usize {
        self.splits.values().map(|s| s.examples).sum()
    }

    /// Records skipped over all splits.
    #[must_use]
    pub fn total_failures(&self) -> usize {
        self.splits.values().map(|s| s.failures).sum()
    }

    /// Payload bytes over all splits.
    #[must_use]
    pub fn total_bytes(&self) -> usize {
        self.splits.values().map(|s| s.bytes).sum()
    }
}

/// Drives a builder over all of its splits.
pub struct Preparer<'a> {
    builder: &'a dyn DatasetBuilder,
    resources: Resources,
    check_shapes: bool,
}

impl<'a> Preparer<'a> {
    /// Create a preparer; shape checks are on.
    pub fn new(builder: &'a dyn DatasetBuilder, resources: Resources) -> Self {
        Self {
            builder,
            resources,
            check_shapes: true,
        }
    }

    /// Enable or disable checking record shapes against the schema.
    #[must_use]
    pub fn with_shape_checks(mut self, check: bool) -> Self {
        self.check_shapes = check;
        self
    }

    /// Generate every split and pass each valid record to `sink`.
    ///
    /// Fails on errors outside a single record (unresolvable split sources,
    /// duplicate keys, sink errors that are not record-local).
    pub fn prepare<F>(&self, mut sink: F) -> Result<PrepareSummary>
    where
        F: FnMut(Split, Example) -> Result<()>,
    {
        let info = self.builder.info();
        let mut summary = PrepareSummary {
            dataset: info.name.clone(),
            config: info.config.clone(),
            ..PrepareSummary::default()
        };

        for generator in self.builder.split_generators(&self.resources)? {
            let split = generator.split;
            let mut stats = SplitSummary::default();
            let mut keys = HashSet::new();

            for item in self.builder.generate_examples(&generator.source)? {
                let outcome = item.and_then(|example| {
                    if !keys.insert(example.key.clone()) {
                        return Err(BwdsError::DuplicateKey {
                            split,
                            key: example.key,
                        });
                    }
                    self.check(&info, &example)?;
                    let bytes = example_bytes(&example);
                    sink(split, example)?;
                    Ok(bytes)
                });

                match outcome {
                    Ok(bytes) => {
                        stats.examples += 1;
                        stats.bytes += bytes;
                    }
                    Err(error) if error.is_record_local() => {
                        tracing::warn!(
                            dataset = %info.name,
                            split = %split,
                            error = %error,
                            "Skipping record"
                        );
                        stats.failures += 1;
                        summary.failures.push(RecordFailure { split, error });
                    }
                    Err(error) => return Err(error),
                }
            }

            tracing::info!(
                dataset = %info.name,
                split = %split,
                examples = stats.examples,
                failures = stats.failures,
                bytes = stats.bytes,
                "Prepared split"
            );
            summary.splits.insert(split, stats);
        }

        tracing::info!(
            dataset = %summary.dataset,
            config = ?summary.config,
            examples = summary.total_examples(),
            failures = summary.total_failures(),
            "Prepared dataset"
        );
        Ok(summary)
    }

    /// Prepare and keep every record in memory.
    pub fn collect(&self) -> Result<(PrepareSummary, BTreeMap<Split, Vec<Example>>)> {
        let mut records: BTreeMap<Split, Vec<Example>> = BTreeMap::new();
        let summary = self.prepare(|split, example| {
            records.entry(split).or_default().push(example);
            Ok(())
        })?;
        Ok((summary, records))
    }

    fn check(&self, info: &DatasetInfo, example: &Example) -> Result<()> {
        for (field, spec) in &info.features {
            let Some(value) = example.get(field) else {
                return Err(BwdsError::Format(format!(
                    "record '{}' has no field '{field}'",
                    example.key
                )));
            };
            if value.dtype() != spec.dtype {
                return Err(BwdsError::Format(format!(
                    "field '{field}' of record '{}' is {:?}, expected {:?}",
                    example.key,
                    value.dtype(),
                    spec.dtype
                )));
            }
            if self.check_shapes && !spec.accepts_shape(value.shape()) {
                return Err(BwdsError::ShapeMismatch {
                    expected: spec.shape.iter().map(|d| d.unwrap_or(0)).collect(),
                    actual: value.shape().to_vec(),
                });
            }
        }
        Ok(())
    }
}

fn example_bytes(example: &Example) -> usize {
    example.record.values().map(|v| v.nbytes()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bwds_core::{
        Dtype, ExampleIter, FeatureSpec, FeatureValue, SplitGenerator, SplitSource, Version,
    };
    use ndarray::{ArrayD, IxDyn};
    use std::path::PathBuf;

    /// Yields `keys` as records; a key of `"bad"` fails, `"wide"` has the wrong shape.
    struct Fixture {
        keys: Vec<&'static str>,
    }

    impl DatasetBuilder for Fixture {
        fn name(&self) -> &'static str {
            "fixture"
        }

        fn info(&self) -> DatasetInfo {
            DatasetInfo::new("fixture", Version::new(0, 0, 1))
                .with_feature("x", FeatureSpec::tensor(&[2], Dtype::Int32))
        }

        fn split_generators(&self, _resources: &Resources) -> Result<Vec<SplitGenerator>> {
            Ok(vec![
                SplitGenerator::new(Split::Train, SplitSource::Dir(PathBuf::from("train"))),
                SplitGenerator::new(Split::Test, SplitSource::Dir(PathBuf::from("test"))),
            ])
        }

        fn generate_examples<'a>(&'a self, _source: &SplitSource) -> Result<ExampleIter<'a>> {
            Ok(Box::new(self.keys.iter().map(|&key| match key {
                "bad" => Err(BwdsError::Format("truncated".to_string())),
                "wide" => Ok(Example::new(
                    key,
                    [("x", FeatureValue::TensorI32(ArrayD::zeros(IxDyn(&[3]))))],
                )),
                _ => Ok(Example::new(
                    key,
                    [("x", FeatureValue::TensorI32(ArrayD::zeros(IxDyn(&[2]))))],
                )),
            })))
        }
    }

    fn resources() -> Resources {
        Resources::new("manual", "extracted")
    }

    #[test]
    fn test_prepare_counts_records() {
        let fixture = Fixture {
            keys: vec!["a", "b"],
        };
        let (summary, records) = Preparer::new(&fixture, resources()).collect().unwrap();
        assert_eq!(summary.dataset, "fixture");
        assert_eq!(summary.total_examples(), 4);
        assert_eq!(summary.total_failures(), 0);
        assert_eq!(summary.splits[&Split::Train].bytes, 16);
        assert_eq!(records[&Split::Test].len(), 2);
    }

    #[test]
    fn test_failures_do_not_stop_enumeration() {
        let fixture = Fixture {
            keys: vec!["a", "bad", "wide", "b"],
        };
        let (summary, records) = Preparer::new(&fixture, resources()).collect().unwrap();
        let train = summary.splits[&Split::Train];
        assert_eq!(train.examples, 2);
        assert_eq!(train.failures, 2);
        assert_eq!(summary.failures.len(), 4);
        assert!(matches!(summary.failures[0].error, BwdsError::Format(_)));
        assert!(matches!(
            summary.failures[1].error,
            BwdsError::ShapeMismatch { .. }
        ));

        let keys: Vec<&str> = records[&Split::Train].iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_shape_checks_can_be_disabled() {
        let fixture = Fixture {
            keys: vec!["wide"],
        };
        let (summary, _) = Preparer::new(&fixture, resources())
            .with_shape_checks(false)
            .collect()
            .unwrap();
        assert_eq!(summary.total_examples(), 2);
    }

    #[test]
    fn test_duplicate_key_is_fatal() {
        let fixture = Fixture {
            keys: vec!["a", "a"],
        };
        let result = Preparer::new(&fixture, resources()).prepare(|_, _| Ok(()));
        assert!(matches!(
            result,
            Err(BwdsError::DuplicateKey { split: Split::Train, key }) if key == "a"
        ));
    }

    #[test]
    fn test_missing_field_is_skipped() {
        struct Empty;
        impl DatasetBuilder for Empty {
            fn name(&self) -> &'static str {
                "empty"
            }
            fn info(&self) -> DatasetInfo {
                DatasetInfo::new("empty", Version::new(0, 0, 1))
                    .with_feature("image", FeatureSpec::image(Dtype::UInt8))
            }
            fn split_generators(&self, _: &Resources) -> Result<Vec<SplitGenerator>> {
                Ok(vec![SplitGenerator::new(
                    Split::Test,
                    SplitSource::File(PathBuf::from("x")),
                )])
            }
            fn generate_examples<'a>(&'a self, _: &SplitSource) -> Result<ExampleIter<'a>> {
                Ok(Box::new(std::iter::once(Ok(Example::new(
                    "k",
                    Vec::<(String, FeatureValue)>::new(),
                )))))
            }
        }

        let summary = Preparer::new(&Empty, resources()).prepare(|_, _| Ok(())).unwrap();
        assert_eq!(summary.total_failures(), 1);
        assert!(matches!(summary.failures[0].error, BwdsError::Format(_)));
    }
}
