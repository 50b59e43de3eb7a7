//! Realistic blur kernels from Schelten et al.

use bwds_core::{
    BuildConfig, BuilderConfigInfo, BwdsError, DatasetBuilder, DatasetInfo, Dtype, Example,
    ExampleIter, FeatureSpec, FeatureValue, Resources, Result, Split, SplitGenerator,
    SplitSource, Version,
};
use bwds_formats::{MatFile, MatValue};
use ndarray::{arr1, s, Array2, Ix2};

use super::{expect_file, select_config};

const NAME: &str = "schelten_kernels";

const DESCRIPTION: &str = "Realistic blur kernels from the paper Interleaved Regression Tree Field Cascades for Blind Image Deconvolution by Kevin Schelten, Sebastian Nowozin, Jeremy Jancsary, Carsten Rother and Stefan Roth.";

const CITATION: &str = "
@inproceedings{schelten_interleaved_2015,
  title = {Interleaved regression tree field cascades for blind image deconvolution},
  booktitle = {IEEE Winter Conference on Applications of Computer Vision},
  author = {Schelten, Kevin and Nowozin, Sebastian and Jancsary, Jeremy and Rother, Carsten and Roth, Stefan},
  year = {2015},
  pages = {494--501}
}
";

const HOMEPAGE: &str = "https://bitbucket.org/visinf/projects-interleaved-rtf";

const DOWNLOAD_URL: &str = "https://bitbucket.org/visinf/projects-interleaved-rtf/raw/ae1f8558af8bbe09a55bdbe7bd64ed20d2c9f3fc/kernels.mat";

const KERNELS_FILE: &str = "kernels.mat";
const KERNELS_VARIABLE: &str = "kernels";

/// Height every kernel is padded to.
pub const MAX_HEIGHT: usize = 191;
/// Width every kernel is padded to.
pub const MAX_WIDTH: usize = 145;

/// Kernels used in the DMSP paper.
const DMSP_KERNEL_IDX: &[usize] = &[19, 29, 67, 68, 95];

const CONFIGS: &[BuilderConfigInfo] = &[
    BuilderConfigInfo {
        name: "all",
        description: "Use all kernels.",
        version: Version::new(0, 2, 0),
    },
    BuilderConfigInfo {
        name: "dmsp",
        description: "Use only the kernels used in the DMSP paper.",
        version: Version::new(0, 2, 0),
    },
];

/// Blur kernels zero-padded to a common size.
#[derive(Debug, Clone)]
pub struct ScheltenKernels {
    config: &'static BuilderConfigInfo,
}

impl ScheltenKernels {
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

/// Zero-pad a kernel to `MAX_HEIGHT x MAX_WIDTH` and report its original size.
pub(crate) fn pad_kernel(kernel: &MatValue) -> Result<Example> {
    let Some(kernel) = kernel.to_f64() else {
        return Err(BwdsError::Format(format!(
            "kernel has non-numeric class {}",
            kernel.class_name()
        )));
    };
    let (height, width) = match kernel.shape() {
        &[h, w] if h <= MAX_HEIGHT && w <= MAX_WIDTH => (h, w),
        other => {
            return Err(BwdsError::ShapeMismatch {
                expected: vec![MAX_HEIGHT, MAX_WIDTH],
                actual: other.to_vec(),
            })
        }
    };
    let kernel = kernel.into_dimensionality::<Ix2>()?;

    let mut padded = Array2::<f64>::zeros((MAX_HEIGHT, MAX_WIDTH));
    padded.slice_mut(s![..height, ..width]).assign(&kernel);
    let size = arr1(&[height as i32, width as i32]).into_dyn();

    Ok(Example::new(
        String::new(),
        [
            ("kernel", FeatureValue::TensorF64(padded.into_dyn())),
            ("size", FeatureValue::TensorI32(size)),
        ],
    ))
}

impl DatasetBuilder for ScheltenKernels {
    fn name(&self) -> &'static str {
        NAME
    }

    fn info(&self) -> DatasetInfo {
        DatasetInfo::new(NAME, self.config.version)
            .with_config(self.config.name)
            .with_description(DESCRIPTION)
            .with_homepage(HOMEPAGE)
            .with_citation(CITATION)
            .with_feature(
                "kernel",
                FeatureSpec::tensor(&[MAX_HEIGHT, MAX_WIDTH], Dtype::Float64),
            )
            .with_feature("size", FeatureSpec::tensor(&[2], Dtype::Int32))
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
            SplitSource::File(resources.require_extracted(KERNELS_FILE)?),
        )])
    }

    fn generate_examples<'a>(&'a self, source: &SplitSource) -> Result<ExampleIter<'a>> {
        let path = expect_file(source)?;
        let mut mat = MatFile::from_file(path)?;
        let kernels = match mat.take(KERNELS_VARIABLE) {
            Some(MatValue::Cell(cell)) => cell,
            Some(other) => {
                return Err(BwdsError::Format(format!(
                    "'{KERNELS_VARIABLE}' in {} is {}, expected cell",
                    path.display(),
                    other.class_name()
                )))
            }
            None => {
                return Err(BwdsError::Format(format!(
                    "{} has no variable '{KERNELS_VARIABLE}'",
                    path.display()
                )))
            }
        };

        // MATLAB linear order.
        let mut kernels: Vec<MatValue> = kernels.t().iter().cloned().collect();
        if self.dmsp_subset() {
            if let Some(&idx) = DMSP_KERNEL_IDX.iter().find(|&&i| i >= kernels.len()) {
                return Err(BwdsError::Format(format!(
                    "kernel {idx} requested but {} holds {} kernels",
                    path.display(),
                    kernels.len()
                )));
            }
            kernels = DMSP_KERNEL_IDX.iter().map(|&i| kernels[i].clone()).collect();
        }
        tracing::debug!(config = self.config.name, count = kernels.len(), "Loaded kernels");

        Ok(Box::new(kernels.into_iter().enumerate().map(|(id, kernel)| {
            let mut example = pad_kernel(&kernel)?;
            example.key = id.to_string();
            Ok(example)
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bwds_formats::MatWriter;
    use ndarray::{ArrayD, IxDyn};

    fn kernel_cell(kernels: Vec<ArrayD<f64>>) -> MatValue {
        let n = kernels.len();
        let values = kernels.into_iter().map(MatValue::Double).collect();
        MatValue::Cell(ArrayD::from_shape_vec(IxDyn(&[1, n]), values).unwrap())
    }

    fn kernel(h: usize, w: usize) -> ArrayD<f64> {
        ArrayD::from_shape_fn(IxDyn(&[h, w]), |ix| (ix[0] * w + ix[1]) as f64)
    }

    fn write_kernels(n: usize) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let kernels = (0..n).map(|i| kernel(3 + i % 5, 5 + i % 7)).collect();
        MatWriter::new()
            .compressed(true)
            .add(KERNELS_VARIABLE, kernel_cell(kernels))
            .write_file(dir.path().join(KERNELS_FILE))
            .unwrap();
        dir
    }

    fn generate(builder: &ScheltenKernels, dir: &std::path::Path) -> Vec<Example> {
        builder
            .generate_examples(&SplitSource::File(dir.join(KERNELS_FILE)))
            .unwrap()
            .collect::<Result<_>>()
            .unwrap()
    }

    #[test]
    fn test_pad_kernel() {
        let example = pad_kernel(&MatValue::Double(kernel(3, 5))).unwrap();
        let Some(FeatureValue::TensorF64(padded)) = example.get("kernel") else {
            panic!("kernel is not f64");
        };
        assert_eq!(padded.shape(), &[MAX_HEIGHT, MAX_WIDTH]);
        assert_eq!(padded[[2, 4]], 14.0);
        assert_eq!(padded[[3, 4]], 0.0);
        assert_eq!(padded[[2, 5]], 0.0);

        let Some(FeatureValue::TensorI32(size)) = example.get("size") else {
            panic!("size is not i32");
        };
        assert_eq!(size.as_slice().unwrap(), &[3, 5]);
    }

    #[test]
    fn test_oversized_kernel_is_shape_mismatch() {
        let result = pad_kernel(&MatValue::Double(kernel(MAX_HEIGHT + 1, 3)));
        assert!(matches!(result, Err(BwdsError::ShapeMismatch { .. })));
        let result = pad_kernel(&MatValue::Char("k".to_string()));
        assert!(matches!(result, Err(BwdsError::Format(_))));
    }

    #[test]
    fn test_all_kernels() {
        let dir = write_kernels(8);
        let builder = ScheltenKernels::new(None, &BuildConfig::default()).unwrap();
        let examples = generate(&builder, dir.path());
        assert_eq!(examples.len(), 8);
        assert_eq!(examples[7].key, "7");
        let Some(FeatureValue::TensorI32(size)) = examples[6].get("size") else {
            panic!("size is not i32");
        };
        assert_eq!(size.as_slice().unwrap(), &[4, 11]);
    }

    #[test]
    fn test_dmsp_subset() {
        let dir = write_kernels(100);
        let builder = ScheltenKernels::new(Some("dmsp"), &BuildConfig::default()).unwrap();
        assert_eq!(builder.info().config.as_deref(), Some("dmsp"));

        let examples = generate(&builder, dir.path());
        let keys: Vec<&str> = examples.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["0", "1", "2", "3", "4"]);

        // Kernel 19 is 7 x 10.
        let Some(FeatureValue::TensorI32(size)) = examples[0].get("size") else {
            panic!("size is not i32");
        };
        assert_eq!(size.as_slice().unwrap(), &[7, 10]);
    }

    #[test]
    fn test_dmsp_needs_enough_kernels() {
        let dir = write_kernels(20);
        let builder = ScheltenKernels::new(Some("dmsp"), &BuildConfig::default()).unwrap();
        assert!(matches!(
            builder.generate_examples(&SplitSource::File(dir.path().join(KERNELS_FILE))),
            Err(BwdsError::Format(_))
        ));
    }
}
