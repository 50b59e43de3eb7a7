//! Portable float maps (PFM).
//!
//! A PFM file is a three-line ASCII header followed by raw 32-bit floats:
//!
//! ```text
//! Pf            <- "PF" for 3-channel colour, "Pf" for grayscale
//! 512 512       <- width height
//! -1.0          <- scale; negative means little-endian samples
//! <width * height * channels f32 samples, bottom row first>
//! ```
//!
//! The magnitude of the scale is applied to every decoded sample.

mod reader;
mod writer;

pub use reader::read_float_map;
pub use writer::PfmWriter;

use ndarray::{Array2, ArrayD, Ix2};
use std::io::BufReader;
use std::path::Path;

use crate::FormatError;

/// Magic line of a colour float map.
pub const PFM_COLOR_MAGIC: &str = "PF";

/// Magic line of a grayscale float map.
pub const PFM_GRAY_MAGIC: &str = "Pf";

/// Byte order of the raw samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    /// Little-endian (negative scale in the header).
    Little,
    /// Big-endian (non-negative scale in the header).
    Big,
}

/// A decoded float map.
///
/// `data` is `(height, width)` for grayscale maps and `(height, width, 3)`
/// for colour maps, top row first, already multiplied by [`scale`](Self::scale).
#[derive(Debug, Clone, PartialEq)]
pub struct FloatMap {
    pub(crate) data: ArrayD<f32>,
    pub(crate) byte_order: ByteOrder,
    pub(crate) scale: f32,
}

impl FloatMap {
    /// Decode a float map from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FormatError> {
        let file = std::fs::File::open(path)?;
        let mut reader = BufReader::new(file);
        read_float_map(&mut reader)
    }

    /// Decode a float map from an in-memory buffer.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FormatError> {
        let mut reader = bytes;
        read_float_map(&mut reader)
    }

    /// Image width.
    #[must_use]
    pub fn width(&self) -> usize {
        self.data.shape()[1]
    }

    /// Image height.
    #[must_use]
    pub fn height(&self) -> usize {
        self.data.shape()[0]
    }

    /// Whether the map has three channels.
    #[must_use]
    pub fn is_color(&self) -> bool {
        self.data.ndim() == 3
    }

    /// Number of channels (1 or 3).
    #[must_use]
    pub fn channels(&self) -> usize {
        if self.is_color() {
            3
        } else {
            1
        }
    }

    /// Byte order the samples were stored in.
    #[must_use]
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Absolute scale factor from the header.
    #[must_use]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Scaled samples.
    #[must_use]
    pub fn data(&self) -> &ArrayD<f32> {
        &self.data
    }

    /// Take the scaled samples.
    #[must_use]
    pub fn into_data(self) -> ArrayD<f32> {
        self.data
    }

    /// Take the samples of a grayscale map as a 2-D array.
    pub fn into_gray(self) -> Result<Array2<f32>, FormatError> {
        let shape = self.data.shape().to_vec();
        self.data
            .into_dimensionality::<Ix2>()
            .map_err(|_| FormatError::InvalidShape(shape))
    }
}
