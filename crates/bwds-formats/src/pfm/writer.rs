//! PFM encoder.

use std::io::Write;

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use ndarray::{ArrayView2, ArrayView3, Axis};

use super::{ByteOrder, PFM_COLOR_MAGIC, PFM_GRAY_MAGIC};
use crate::FormatError;

/// Writer for float maps.
///
/// Samples are written unscaled; the header carries the scale, signed
/// according to the byte order. A reader therefore returns the written
/// samples multiplied by the scale.
#[derive(Debug, Clone, Copy)]
pub struct PfmWriter {
    byte_order: ByteOrder,
    scale: f32,
}

impl Default for PfmWriter {
    fn default() -> Self {
        Self::new(ByteOrder::Little)
    }
}

impl PfmWriter {
    /// Create a writer with scale 1.
    #[must_use]
    pub fn new(byte_order: ByteOrder) -> Self {
        Self {
            byte_order,
            scale: 1.0,
        }
    }

    /// Set the header scale (must be finite and positive).
    #[must_use]
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Write a `(height, width)` grayscale map, top row first.
    pub fn write_gray<W: Write>(
        &self,
        writer: &mut W,
        data: ArrayView2<'_, f32>,
    ) -> Result<(), FormatError> {
        let (height, width) = data.dim();
        self.write_header(writer, PFM_GRAY_MAGIC, width, height)?;
        for row in data.axis_iter(Axis(0)).rev() {
            for &v in row {
                self.write_sample(writer, v)?;
            }
        }
        Ok(())
    }

    /// Write a `(height, width, 3)` colour map, top row first.
    pub fn write_color<W: Write>(
        &self,
        writer: &mut W,
        data: ArrayView3<'_, f32>,
    ) -> Result<(), FormatError> {
        let (height, width, channels) = data.dim();
        if channels != 3 {
            return Err(FormatError::InvalidShape(data.shape().to_vec()));
        }
        self.write_header(writer, PFM_COLOR_MAGIC, width, height)?;
        for row in data.axis_iter(Axis(0)).rev() {
            for &v in row.iter() {
                self.write_sample(writer, v)?;
            }
        }
        Ok(())
    }

    fn write_header<W: Write>(
        &self,
        writer: &mut W,
        magic: &str,
        width: usize,
        height: usize,
    ) -> Result<(), FormatError> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(FormatError::InvalidScale(self.scale));
        }
        if width == 0 || height == 0 {
            return Err(FormatError::InvalidShape(vec![height, width]));
        }
        let signed_scale = match self.byte_order {
            ByteOrder::Little => -self.scale,
            ByteOrder::Big => self.scale,
        };
        write!(writer, "{magic}\n{width} {height}\n{signed_scale:?}\n")?;
        Ok(())
    }

    fn write_sample<W: Write>(&self, writer: &mut W, v: f32) -> Result<(), FormatError> {
        match self.byte_order {
            ByteOrder::Little => writer.write_f32::<LittleEndian>(v)?,
            ByteOrder::Big => writer.write_f32::<BigEndian>(v)?,
        }
        Ok(())
    }
}
