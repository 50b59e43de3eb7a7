//! MAT-file writer.

use std::io::Write;
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use ndarray::ArrayD;

use super::*;

/// Writer for little-endian level 5 MAT-files.
///
/// One-dimensional arrays are stored as `1 x n` row vectors and scalars as
/// `1 x 1`, matching how MATLAB itself has no arrays of rank below two.
#[derive(Debug, Clone, Default)]
pub struct MatWriter {
    description: String,
    compress: bool,
    variables: Vec<(String, MatValue)>,
}

impl MatWriter {
    /// Create an empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            description: "MATLAB 5.0 MAT-file".to_string(),
            ..Default::default()
        }
    }

    /// Set the descriptive header text (truncated to 116 bytes).
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Zlib-compress each variable.
    #[must_use]
    pub fn compressed(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Add a variable.
    pub fn add(&mut self, name: impl Into<String>, value: MatValue) -> &mut Self {
        self.variables.push((name.into(), value));
        self
    }

    /// Write the file.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<(), FormatError> {
        let mut header = self.description.as_bytes().to_vec();
        header.truncate(116);
        header.resize(116, b' ');
        writer.write_all(&header)?;
        writer.write_all(&[0u8; 8])?;
        writer.write_u16::<LittleEndian>(MAT_VERSION_5)?;
        writer.write_all(b"IM")?;

        for (name, value) in &self.variables {
            let matrix = matrix_element(name, value)?;
            if self.compress {
                let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(&matrix)?;
                let compressed = encoder.finish()?;
                writer.write_u32::<LittleEndian>(MI_COMPRESSED)?;
                writer.write_u32::<LittleEndian>(element_len(compressed.len())?)?;
                writer.write_all(&compressed)?;
            } else {
                writer.write_all(&matrix)?;
            }
        }

        tracing::debug!(
            variables = self.variables.len(),
            compress = self.compress,
            "Wrote MAT-file"
        );
        Ok(())
    }

    /// Write the file to disk.
    pub fn write_file(&self, path: impl AsRef<Path>) -> Result<(), FormatError> {
        let mut writer = std::io::BufWriter::new(std::fs::File::create(path)?);
        self.write(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

fn element_len(len: usize) -> Result<u32, FormatError> {
    u32::try_from(len)
        .map_err(|_| FormatError::UnsupportedMat(format!("element of {len} bytes")))
}

fn push_element(buf: &mut Vec<u8>, ty: u32, data: &[u8]) -> Result<(), FormatError> {
    buf.write_u32::<LittleEndian>(ty)?;
    buf.write_u32::<LittleEndian>(element_len(data.len())?)?;
    buf.extend_from_slice(data);
    buf.resize(buf.len().next_multiple_of(8), 0);
    Ok(())
}

fn matlab_dims(shape: &[usize]) -> Vec<usize> {
    match shape {
        [] => vec![1, 1],
        [n] => vec![1, *n],
        _ => shape.to_vec(),
    }
}

/// Column-major bytes of an array.
fn column_major_bytes<T: Copy, const N: usize>(
    array: &ArrayD<T>,
    to_bytes: impl Fn(T) -> [u8; N],
) -> Vec<u8> {
    array.t().iter().flat_map(|&v| to_bytes(v)).collect()
}

fn matrix_element(name: &str, value: &MatValue) -> Result<Vec<u8>, FormatError> {
    let (class, shape) = match value {
        MatValue::Double(a) => (MX_DOUBLE, a.shape().to_vec()),
        MatValue::Single(a) => (MX_SINGLE, a.shape().to_vec()),
        MatValue::Int8(a) => (MX_INT8, a.shape().to_vec()),
        MatValue::UInt8(a) => (MX_UINT8, a.shape().to_vec()),
        MatValue::Int16(a) => (MX_INT16, a.shape().to_vec()),
        MatValue::UInt16(a) => (MX_UINT16, a.shape().to_vec()),
        MatValue::Int32(a) => (MX_INT32, a.shape().to_vec()),
        MatValue::UInt32(a) => (MX_UINT32, a.shape().to_vec()),
        MatValue::Char(s) => (MX_CHAR, vec![1, s.encode_utf16().count()]),
        MatValue::Cell(a) => (MX_CELL, a.shape().to_vec()),
    };

    let mut body = Vec::new();
    let mut flags = Vec::with_capacity(8);
    flags.write_u32::<LittleEndian>(class)?;
    flags.write_u32::<LittleEndian>(0)?;
    push_element(&mut body, MI_UINT32, &flags)?;

    let mut dims = Vec::new();
    for d in matlab_dims(&shape) {
        let d = i32::try_from(d)
            .map_err(|_| FormatError::UnsupportedMat(format!("dimension {d}")))?;
        dims.write_i32::<LittleEndian>(d)?;
    }
    push_element(&mut body, MI_INT32, &dims)?;
    push_element(&mut body, MI_INT8, name.as_bytes())?;

    match value {
        MatValue::Double(a) => push_element(&mut body, MI_DOUBLE, &column_major_bytes(a, f64::to_le_bytes))?,
        MatValue::Single(a) => push_element(&mut body, MI_SINGLE, &column_major_bytes(a, f32::to_le_bytes))?,
        MatValue::Int8(a) => push_element(&mut body, MI_INT8, &column_major_bytes(a, i8::to_le_bytes))?,
        MatValue::UInt8(a) => push_element(&mut body, MI_UINT8, &column_major_bytes(a, u8::to_le_bytes))?,
        MatValue::Int16(a) => push_element(&mut body, MI_INT16, &column_major_bytes(a, i16::to_le_bytes))?,
        MatValue::UInt16(a) => push_element(&mut body, MI_UINT16, &column_major_bytes(a, u16::to_le_bytes))?,
        MatValue::Int32(a) => push_element(&mut body, MI_INT32, &column_major_bytes(a, i32::to_le_bytes))?,
        MatValue::UInt32(a) => push_element(&mut body, MI_UINT32, &column_major_bytes(a, u32::to_le_bytes))?,
        MatValue::Char(s) => {
            let units: Vec<u8> = s.encode_utf16().flat_map(u16::to_le_bytes).collect();
            push_element(&mut body, MI_UINT16, &units)?;
        }
        MatValue::Cell(a) => {
            for cell in a.t().iter() {
                body.extend(matrix_element("", cell)?);
            }
        }
    }

    let mut element = Vec::with_capacity(body.len() + 8);
    element.write_u32::<LittleEndian>(MI_MATRIX)?;
    element.write_u32::<LittleEndian>(element_len(body.len())?)?;
    element.extend(body);
    Ok(element)
}
