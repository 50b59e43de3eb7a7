//! MATLAB level 5 MAT-files.
//!
//! Supports numeric matrices (double, single, 8/16/32-bit integers), char
//! arrays and cell arrays, zlib-compressed elements and both byte orders.
//! Sparse matrices, structs, objects, complex data, 64-bit integers and
//! v7.3 (HDF5) files are rejected.
//!
//! Arrays keep MATLAB's dimension order: `A(i, j)` in MATLAB is
//! `array[[i - 1, j - 1]]` here. Storage is converted from column-major to
//! standard (row-major) layout on load.

mod reader;
mod writer;

pub use reader::read_mat_file;
pub use writer::MatWriter;

use ndarray::ArrayD;
use std::collections::BTreeMap;
use std::path::Path;

use crate::FormatError;

/// Length of the MAT-file header.
pub const MAT_HEADER_LEN: usize = 128;

/// Header version of level 5 files.
pub const MAT_VERSION_5: u16 = 0x0100;

/// Header version of v7.3 (HDF5 based) files.
pub const MAT_VERSION_73: u16 = 0x0200;

// Data element types.
pub(crate) const MI_INT8: u32 = 1;
pub(crate) const MI_UINT8: u32 = 2;
pub(crate) const MI_INT16: u32 = 3;
pub(crate) const MI_UINT16: u32 = 4;
pub(crate) const MI_INT32: u32 = 5;
pub(crate) const MI_UINT32: u32 = 6;
pub(crate) const MI_SINGLE: u32 = 7;
pub(crate) const MI_DOUBLE: u32 = 9;
pub(crate) const MI_INT64: u32 = 12;
pub(crate) const MI_UINT64: u32 = 13;
pub(crate) const MI_MATRIX: u32 = 14;
pub(crate) const MI_COMPRESSED: u32 = 15;
pub(crate) const MI_UTF8: u32 = 16;
pub(crate) const MI_UTF16: u32 = 17;

// Array classes.
pub(crate) const MX_CELL: u32 = 1;
pub(crate) const MX_STRUCT: u32 = 2;
pub(crate) const MX_OBJECT: u32 = 3;
pub(crate) const MX_CHAR: u32 = 4;
pub(crate) const MX_SPARSE: u32 = 5;
pub(crate) const MX_DOUBLE: u32 = 6;
pub(crate) const MX_SINGLE: u32 = 7;
pub(crate) const MX_INT8: u32 = 8;
pub(crate) const MX_UINT8: u32 = 9;
pub(crate) const MX_INT16: u32 = 10;
pub(crate) const MX_UINT16: u32 = 11;
pub(crate) const MX_INT32: u32 = 12;
pub(crate) const MX_UINT32: u32 = 13;
pub(crate) const MX_INT64: u32 = 14;
pub(crate) const MX_UINT64: u32 = 15;

pub(crate) const FLAG_COMPLEX: u32 = 0x0800;

/// A decoded MAT-file variable.
#[derive(Debug, Clone, PartialEq)]
pub enum MatValue {
    /// `double` array.
    Double(ArrayD<f64>),
    /// `single` array.
    Single(ArrayD<f32>),
    /// `int8` array.
    Int8(ArrayD<i8>),
    /// `uint8` array.
    UInt8(ArrayD<u8>),
    /// `int16` array.
    Int16(ArrayD<i16>),
    /// `uint16` array.
    UInt16(ArrayD<u16>),
    /// `int32` array.
    Int32(ArrayD<i32>),
    /// `uint32` array.
    UInt32(ArrayD<u32>),
    /// `char` array; rows are joined with `\n`.
    Char(String),
    /// Cell array.
    Cell(ArrayD<MatValue>),
}

impl MatValue {
    /// MATLAB class name.
    #[must_use]
    pub fn class_name(&self) -> &'static str {
        match self {
            Self::Double(_) => "double",
            Self::Single(_) => "single",
            Self::Int8(_) => "int8",
            Self::UInt8(_) => "uint8",
            Self::Int16(_) => "int16",
            Self::UInt16(_) => "uint16",
            Self::Int32(_) => "int32",
            Self::UInt32(_) => "uint32",
            Self::Char(_) => "char",
            Self::Cell(_) => "cell",
        }
    }

    /// Array shape (`[1, len]` for char values).
    #[must_use]
    pub fn shape(&self) -> Vec<usize> {
        match self {
            Self::Double(a) => a.shape().to_vec(),
            Self::Single(a) => a.shape().to_vec(),
            Self::Int8(a) => a.shape().to_vec(),
            Self::UInt8(a) => a.shape().to_vec(),
            Self::Int16(a) => a.shape().to_vec(),
            Self::UInt16(a) => a.shape().to_vec(),
            Self::Int32(a) => a.shape().to_vec(),
            Self::UInt32(a) => a.shape().to_vec(),
            Self::Char(s) => vec![1, s.chars().count()],
            Self::Cell(a) => a.shape().to_vec(),
        }
    }

    /// Numeric content converted to `f64`, `None` for char and cell values.
    #[must_use]
    pub fn to_f64(&self) -> Option<ArrayD<f64>> {
        Some(match self {
            Self::Double(a) => a.clone(),
            Self::Single(a) => a.mapv(f64::from),
            Self::Int8(a) => a.mapv(f64::from),
            Self::UInt8(a) => a.mapv(f64::from),
            Self::Int16(a) => a.mapv(f64::from),
            Self::UInt16(a) => a.mapv(f64::from),
            Self::Int32(a) => a.mapv(f64::from),
            Self::UInt32(a) => a.mapv(f64::from),
            Self::Char(_) | Self::Cell(_) => return None,
        })
    }

    /// Cell content.
    #[must_use]
    pub fn as_cell(&self) -> Option<&ArrayD<MatValue>> {
        match self {
            Self::Cell(a) => Some(a),
            _ => None,
        }
    }

    /// `uint8` content.
    #[must_use]
    pub fn as_uint8(&self) -> Option<&ArrayD<u8>> {
        match self {
            Self::UInt8(a) => Some(a),
            _ => None,
        }
    }
}

/// All variables of a MAT-file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatFile {
    /// Descriptive header text.
    pub description: String,
    /// Variables by name.
    pub variables: BTreeMap<String, MatValue>,
}

impl MatFile {
    /// Read a MAT-file from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FormatError> {
        let file = std::fs::File::open(path)?;
        let mut reader = std::io::BufReader::new(file);
        read_mat_file(&mut reader)
    }

    /// Get a variable by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MatValue> {
        self.variables.get(name)
    }

    /// Remove and return a variable.
    pub fn take(&mut self, name: &str) -> Option<MatValue> {
        self.variables.remove(name)
    }

    /// Variable names in sorted order.
    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }
}
