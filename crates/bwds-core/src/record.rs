//! Records produced by dataset builders.

use ndarray::{Array3, Array4, ArrayD};
use std::collections::BTreeMap;

use crate::Dtype;

/// One typed field of a record.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    /// 8-bit `H x W x C` image.
    Image(Array3<u8>),
    /// 16-bit `H x W x C` image.
    Image16(Array3<u16>),
    /// 8-bit `T x H x W x C` video.
    Video(Array4<u8>),
    /// 16-bit `T x H x W x C` video.
    Video16(Array4<u16>),
    /// Unsigned 8-bit tensor.
    TensorU8(ArrayD<u8>),
    /// Signed 32-bit tensor.
    TensorI32(ArrayD<i32>),
    /// 32-bit float tensor.
    TensorF32(ArrayD<f32>),
    /// 64-bit float tensor.
    TensorF64(ArrayD<f64>),
}

impl FeatureValue {
    /// Shape of the underlying array.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        match self {
            Self::Image(a) => a.shape(),
            Self::Image16(a) => a.shape(),
            Self::Video(a) => a.shape(),
            Self::Video16(a) => a.shape(),
            Self::TensorU8(a) => a.shape(),
            Self::TensorI32(a) => a.shape(),
            Self::TensorF32(a) => a.shape(),
            Self::TensorF64(a) => a.shape(),
        }
    }

    /// Element type of the underlying array.
    #[must_use]
    pub const fn dtype(&self) -> Dtype {
        match self {
            Self::Image(_) | Self::Video(_) | Self::TensorU8(_) => Dtype::UInt8,
            Self::Image16(_) | Self::Video16(_) => Dtype::UInt16,
            Self::TensorI32(_) => Dtype::Int32,
            Self::TensorF32(_) => Dtype::Float32,
            Self::TensorF64(_) => Dtype::Float64,
        }
    }

    /// Size of the payload in bytes.
    #[must_use]
    pub fn nbytes(&self) -> usize {
        self.shape().iter().product::<usize>() * self.dtype().size_bytes()
    }
}

/// Mapping from field name to value.
pub type Record = BTreeMap<String, FeatureValue>;

/// A keyed record.
#[derive(Debug, Clone, PartialEq)]
pub struct Example {
    /// Unique key within the split.
    pub key: String,
    /// Record fields.
    pub record: Record,
}

impl Example {
    /// Create an example from a key and `(field, value)` pairs.
    pub fn new<K, I, S>(key: K, fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (S, FeatureValue)>,
        S: Into<String>,
    {
        Self {
            key: key.into(),
            record: fields
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }

    /// Look up a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FeatureValue> {
        self.record.get(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::IxDyn;

    #[test]
    fn test_feature_value_metadata() {
        let image = FeatureValue::Image(Array3::zeros((4, 5, 3)));
        assert_eq!(image.shape(), &[4, 5, 3]);
        assert_eq!(image.dtype(), Dtype::UInt8);
        assert_eq!(image.nbytes(), 60);

        let depth = FeatureValue::TensorF32(ArrayD::zeros(IxDyn(&[8, 8])));
        assert_eq!(depth.dtype(), Dtype::Float32);
        assert_eq!(depth.nbytes(), 256);
    }

    #[test]
    fn test_example_fields() {
        let example = Example::new(
            "scene",
            [("size", FeatureValue::TensorI32(ArrayD::zeros(IxDyn(&[2]))))],
        );
        assert_eq!(example.key, "scene");
        assert!(example.get("size").is_some());
        assert!(example.get("kernel").is_none());
    }
}
