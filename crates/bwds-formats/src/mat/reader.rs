//! MAT-file reader.

use std::collections::BTreeMap;
use std::io::Read;

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use flate2::read::ZlibDecoder;
use ndarray::{ArrayD, IxDyn, ShapeBuilder};

use super::*;

/// Byte order declared by the header's endian indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endian {
    Little,
    Big,
}

impl Endian {
    fn u16(self, b: &[u8]) -> u16 {
        match self {
            Self::Little => LittleEndian::read_u16(b),
            Self::Big => BigEndian::read_u16(b),
        }
    }

    fn u32(self, b: &[u8]) -> u32 {
        match self {
            Self::Little => LittleEndian::read_u32(b),
            Self::Big => BigEndian::read_u32(b),
        }
    }

    fn u64(self, b: &[u8]) -> u64 {
        match self {
            Self::Little => LittleEndian::read_u64(b),
            Self::Big => BigEndian::read_u64(b),
        }
    }
}

/// A data element: type and payload (without tag and padding).
struct Element<'a> {
    ty: u32,
    data: &'a [u8],
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    endian: Endian,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8], endian: Endian) -> Self {
        Self {
            bytes,
            pos: 0,
            endian,
        }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn element(&mut self) -> Result<Element<'a>, FormatError> {
        if self.remaining() < 8 {
            return Err(FormatError::MalformedMat("truncated element tag".into()));
        }
        let first = self.endian.u32(&self.bytes[self.pos..self.pos + 4]);

        // Small data element: size in the upper half, payload in the tag.
        if first >> 16 != 0 {
            let ty = first & 0xFFFF;
            let n = (first >> 16) as usize;
            if n > 4 {
                return Err(FormatError::MalformedMat(format!(
                    "small element of {n} bytes"
                )));
            }
            let data = &self.bytes[self.pos + 4..self.pos + 4 + n];
            self.pos += 8;
            return Ok(Element { ty, data });
        }

        let ty = first;
        let n = self.endian.u32(&self.bytes[self.pos + 4..self.pos + 8]) as usize;
        let start = self.pos + 8;
        let end = start
            .checked_add(n)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| {
                FormatError::MalformedMat(format!("element of {n} bytes exceeds file"))
            })?;
        let data = &self.bytes[start..end];
        self.pos = if ty == MI_COMPRESSED {
            end
        } else {
            (start + n.div_ceil(8) * 8).min(self.bytes.len())
        };
        Ok(Element { ty, data })
    }
}

/// Read every variable of a level 5 MAT-file.
///
/// Top-level variables of unsupported classes are skipped with a warning;
/// structural errors fail the whole file.
pub fn read_mat_file<R: Read>(reader: &mut R) -> Result<MatFile, FormatError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    if bytes.len() < MAT_HEADER_LEN {
        return Err(FormatError::NotMatFile);
    }

    let endian = match &bytes[126..128] {
        b"IM" => Endian::Little,
        b"MI" => Endian::Big,
        _ => return Err(FormatError::NotMatFile),
    };
    match endian.u16(&bytes[124..126]) {
        MAT_VERSION_5 => {}
        MAT_VERSION_73 => {
            return Err(FormatError::UnsupportedMat("v7.3 (HDF5) file".into()));
        }
        v => {
            return Err(FormatError::MalformedMat(format!(
                "unknown header version 0x{v:04X}"
            )));
        }
    }
    let description = String::from_utf8_lossy(&bytes[..116])
        .trim_end_matches([' ', '\0'])
        .to_string();

    let mut variables = BTreeMap::new();
    let mut cursor = Cursor::new(&bytes[MAT_HEADER_LEN..], endian);
    while cursor.remaining() >= 8 {
        let element = cursor.element()?;
        let parsed = match element.ty {
            MI_MATRIX => parse_matrix(element.data, endian),
            MI_COMPRESSED => {
                let mut inflated = Vec::new();
                ZlibDecoder::new(element.data)
                    .read_to_end(&mut inflated)
                    .map_err(|e| {
                        FormatError::MalformedMat(format!("bad compressed element: {e}"))
                    })?;
                let mut inner = Cursor::new(&inflated, endian);
                let inner_element = inner.element()?;
                if inner_element.ty != MI_MATRIX {
                    tracing::debug!(ty = inner_element.ty, "Skipping compressed non-matrix element");
                    continue;
                }
                parse_matrix(inner_element.data, endian)
            }
            other => {
                tracing::debug!(ty = other, "Skipping top-level MAT element");
                continue;
            }
        };

        match parsed {
            Ok((name, value)) => {
                variables.insert(name, value);
            }
            Err(FormatError::UnsupportedMat(what)) => {
                tracing::warn!(%what, "Skipping unsupported MAT variable");
            }
            Err(e) => return Err(e),
        }
    }

    Ok(MatFile {
        description,
        variables,
    })
}

fn parse_matrix(data: &[u8], endian: Endian) -> Result<(String, MatValue), FormatError> {
    // An empty miMATRIX is an empty double array (used for empty cells).
    if data.is_empty() {
        return Ok((String::new(), MatValue::Double(ArrayD::zeros(IxDyn(&[0, 0])))));
    }

    let mut cursor = Cursor::new(data, endian);

    let flags_element = cursor.element()?;
    if flags_element.ty != MI_UINT32 || flags_element.data.len() < 8 {
        return Err(FormatError::MalformedMat("missing array flags".into()));
    }
    let flags = endian.u32(&flags_element.data[..4]);
    let class = flags & 0xFF;

    let dims_element = cursor.element()?;
    if dims_element.ty != MI_INT32 {
        return Err(FormatError::MalformedMat("missing dimensions".into()));
    }
    let dims = dims_element
        .data
        .chunks_exact(4)
        .map(|b| usize::try_from(endian.u32(b) as i32))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| FormatError::MalformedMat("negative dimension".into()))?;

    let name_element = cursor.element()?;
    let name = String::from_utf8_lossy(name_element.data).into_owned();

    let value = match class {
        MX_CELL => {
            let n = element_count(&dims)?;
            // Every cell takes at least one 8-byte tag.
            let mut cells = Vec::with_capacity(n.min(cursor.remaining() / 8));
            for _ in 0..n {
                let element = cursor.element()?;
                if element.ty != MI_MATRIX {
                    return Err(FormatError::MalformedMat(format!(
                        "cell entry of element type {}",
                        element.ty
                    )));
                }
                let (_, cell) = parse_matrix(element.data, endian)?;
                cells.push(cell);
            }
            MatValue::Cell(column_major(&dims, cells)?)
        }
        MX_CHAR => {
            let element = cursor.element()?;
            MatValue::Char(decode_chars(&element, &dims, endian)?)
        }
        MX_STRUCT => return Err(FormatError::UnsupportedMat(format!("struct '{name}'"))),
        MX_OBJECT => return Err(FormatError::UnsupportedMat(format!("object '{name}'"))),
        MX_SPARSE => return Err(FormatError::UnsupportedMat(format!("sparse '{name}'"))),
        MX_INT64 | MX_UINT64 => {
            return Err(FormatError::UnsupportedMat(format!("64-bit integer '{name}'")));
        }
        MX_DOUBLE | MX_SINGLE | MX_INT8 | MX_UINT8 | MX_INT16 | MX_UINT16 | MX_INT32
        | MX_UINT32 => {
            if flags & FLAG_COMPLEX != 0 {
                return Err(FormatError::UnsupportedMat(format!("complex '{name}'")));
            }
            let element = cursor.element()?;
            let values = numeric_values(&element, endian)?;
            let expected = element_count(&dims)?;
            if values.len() != expected {
                return Err(FormatError::MalformedMat(format!(
                    "'{name}' has {} values for dimensions {dims:?}",
                    values.len()
                )));
            }
            numeric_value(class, &dims, values)?
        }
        other => {
            return Err(FormatError::UnsupportedMat(format!(
                "array class {other} ('{name}')"
            )));
        }
    };

    Ok((name, value))
}

fn numeric_value(class: u32, dims: &[usize], values: Vec<f64>) -> Result<MatValue, FormatError> {
    // Storage may be narrower than the class; every supported class is exact in f64.
    Ok(match class {
        MX_DOUBLE => MatValue::Double(column_major(dims, values)?),
        MX_SINGLE => MatValue::Single(column_major(dims, cast(values, |v| v as f32))?),
        MX_INT8 => MatValue::Int8(column_major(dims, cast(values, |v| v as i8))?),
        MX_UINT8 => MatValue::UInt8(column_major(dims, cast(values, |v| v as u8))?),
        MX_INT16 => MatValue::Int16(column_major(dims, cast(values, |v| v as i16))?),
        MX_UINT16 => MatValue::UInt16(column_major(dims, cast(values, |v| v as u16))?),
        MX_INT32 => MatValue::Int32(column_major(dims, cast(values, |v| v as i32))?),
        MX_UINT32 => MatValue::UInt32(column_major(dims, cast(values, |v| v as u32))?),
        other => {
            return Err(FormatError::UnsupportedMat(format!("array class {other}")));
        }
    })
}

fn cast<T>(values: Vec<f64>, f: impl Fn(f64) -> T) -> Vec<T> {
    values.into_iter().map(f).collect()
}

fn numeric_values(element: &Element<'_>, endian: Endian) -> Result<Vec<f64>, FormatError> {
    let d = element.data;
    let values = match element.ty {
        MI_INT8 => d.iter().map(|&b| f64::from(b as i8)).collect(),
        MI_UINT8 => d.iter().map(|&b| f64::from(b)).collect(),
        MI_INT16 => d
            .chunks_exact(2)
            .map(|b| f64::from(endian.u16(b) as i16))
            .collect(),
        MI_UINT16 => d.chunks_exact(2).map(|b| f64::from(endian.u16(b))).collect(),
        MI_INT32 => d
            .chunks_exact(4)
            .map(|b| f64::from(endian.u32(b) as i32))
            .collect(),
        MI_UINT32 => d.chunks_exact(4).map(|b| f64::from(endian.u32(b))).collect(),
        MI_SINGLE => d
            .chunks_exact(4)
            .map(|b| f64::from(f32::from_bits(endian.u32(b))))
            .collect(),
        MI_DOUBLE => d
            .chunks_exact(8)
            .map(|b| f64::from_bits(endian.u64(b)))
            .collect(),
        MI_INT64 => d
            .chunks_exact(8)
            .map(|b| endian.u64(b) as i64 as f64)
            .collect(),
        MI_UINT64 => d.chunks_exact(8).map(|b| endian.u64(b) as f64).collect(),
        other => {
            return Err(FormatError::MalformedMat(format!(
                "unexpected numeric storage type {other}"
            )));
        }
    };
    Ok(values)
}

fn decode_chars(element: &Element<'_>, dims: &[usize], endian: Endian) -> Result<String, FormatError> {
    let chars: Vec<char> = match element.ty {
        MI_UTF8 => String::from_utf8_lossy(element.data).chars().collect(),
        MI_INT8 | MI_UINT8 => element.data.iter().map(|&b| char::from(b)).collect(),
        MI_UINT16 | MI_UTF16 => {
            let units = element.data.chunks_exact(2).map(|b| endian.u16(b));
            char::decode_utf16(units)
                .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
                .collect()
        }
        other => {
            return Err(FormatError::MalformedMat(format!(
                "unexpected char storage type {other}"
            )));
        }
    };

    let rows = dims.first().copied().unwrap_or(0);
    let cols = element_count(dims.get(1..).unwrap_or_default())?;
    if rows <= 1 || rows.checked_mul(cols) != Some(chars.len()) {
        return Ok(chars.into_iter().collect());
    }
    let lines: Vec<String> = (0..rows)
        .map(|r| (0..cols).map(|c| chars[c * rows + r]).collect())
        .collect();
    Ok(lines.join("\n"))
}

/// Number of elements of an array with dimensions `dims`.
fn element_count(dims: &[usize]) -> Result<usize, FormatError> {
    dims.iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| FormatError::MalformedMat(format!("dimensions {dims:?} overflow")))
}

/// Build a standard-layout array from column-major values.
fn column_major<T: Clone>(dims: &[usize], values: Vec<T>) -> Result<ArrayD<T>, FormatError> {
    let array = ArrayD::from_shape_vec(IxDyn(dims).f(), values)
        .map_err(|e| FormatError::MalformedMat(format!("bad dimensions {dims:?}: {e}")))?;
    Ok(array.as_standard_layout().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn header(indicator: &[u8; 2], version: [u8; 2]) -> Vec<u8> {
        let mut bytes = vec![b' '; 116];
        bytes[..6].copy_from_slice(b"MATLAB");
        bytes.extend_from_slice(&[0; 8]);
        bytes.extend_from_slice(&version);
        bytes.extend_from_slice(indicator);
        bytes
    }

    fn be_element(ty: u32, data: &[u8]) -> Vec<u8> {
        let mut out = ty.to_be_bytes().to_vec();
        out.extend_from_slice(&(data.len() as u32).to_be_bytes());
        out.extend_from_slice(data);
        while out.len() % 8 != 0 {
            out.push(0);
        }
        out
    }

    fn le_element(ty: u32, data: &[u8]) -> Vec<u8> {
        let mut out = ty.to_le_bytes().to_vec();
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(data);
        while out.len() % 8 != 0 {
            out.push(0);
        }
        out
    }

    /// A little-endian file with one matrix of `class` and `dims`, followed by `rest`.
    fn le_matrix_file(class: u32, dims: &[i32], rest: &[u8]) -> Vec<u8> {
        let mut flags = class.to_le_bytes().to_vec();
        flags.extend_from_slice(&[0; 4]);
        let mut body = le_element(MI_UINT32, &flags);
        let dims: Vec<u8> = dims.iter().flat_map(|d| d.to_le_bytes()).collect();
        body.extend(le_element(MI_INT32, &dims));
        body.extend(le_element(MI_INT8, b"c"));
        body.extend_from_slice(rest);

        let mut bytes = header(b"IM", [0x00, 0x01]);
        bytes.extend(le_element(MI_MATRIX, &body));
        bytes
    }

    #[test]
    fn test_overflowing_cell_dimensions() {
        let bytes = le_matrix_file(MX_CELL, &[i32::MAX; 3], &[]);
        assert!(matches!(
            read_mat_file(&mut bytes.as_slice()),
            Err(FormatError::MalformedMat(_))
        ));
    }

    #[test]
    fn test_huge_cell_count_without_entries() {
        // Fits in usize but the file holds a single empty cell.
        let bytes = le_matrix_file(MX_CELL, &[i32::MAX, i32::MAX], &le_element(MI_MATRIX, &[]));
        assert!(matches!(
            read_mat_file(&mut bytes.as_slice()),
            Err(FormatError::MalformedMat(_))
        ));
    }

    #[test]
    fn test_overflowing_numeric_dimensions() {
        let data: Vec<u8> = 1.0f64.to_le_bytes().to_vec();
        let bytes = le_matrix_file(MX_DOUBLE, &[i32::MAX; 3], &le_element(MI_DOUBLE, &data));
        assert!(matches!(
            read_mat_file(&mut bytes.as_slice()),
            Err(FormatError::MalformedMat(_))
        ));
    }

    #[test]
    fn test_rejects_short_and_unknown_headers() {
        assert!(matches!(
            read_mat_file(&mut &b"MATLAB"[..]),
            Err(FormatError::NotMatFile)
        ));
        let bytes = header(b"XX", [0x00, 0x01]);
        assert!(matches!(
            read_mat_file(&mut bytes.as_slice()),
            Err(FormatError::NotMatFile)
        ));
    }

    #[test]
    fn test_rejects_hdf5_version() {
        let bytes = header(b"IM", [0x00, 0x02]);
        assert!(matches!(
            read_mat_file(&mut bytes.as_slice()),
            Err(FormatError::UnsupportedMat(_))
        ));
    }

    #[test]
    fn test_big_endian_double_matrix() {
        // 2x2 matrix [[1, 2], [3, 4]] stored column-major: 1, 3, 2, 4.
        let mut body = be_element(MI_UINT32, &[0, 0, 0, MX_DOUBLE as u8, 0, 0, 0, 0]);
        let mut dims = Vec::new();
        dims.extend_from_slice(&2i32.to_be_bytes());
        dims.extend_from_slice(&2i32.to_be_bytes());
        body.extend(be_element(MI_INT32, &dims));
        body.extend(be_element(MI_INT8, b"m"));
        let data: Vec<u8> = [1.0f64, 3.0, 2.0, 4.0]
            .iter()
            .flat_map(|v| v.to_be_bytes())
            .collect();
        body.extend(be_element(MI_DOUBLE, &data));

        let mut bytes = header(b"MI", [0x01, 0x00]);
        bytes.extend(be_element(MI_MATRIX, &body));

        let file = read_mat_file(&mut bytes.as_slice()).unwrap();
        assert_eq!(file.description.trim_end(), "MATLAB");
        assert_eq!(
            file.get("m"),
            Some(&MatValue::Double(array![[1.0, 2.0], [3.0, 4.0]].into_dyn()))
        );
    }

    #[test]
    fn test_small_element_name() {
        // Small element: size 1, type miINT8, payload "k".
        let mut bytes = header(b"IM", [0x00, 0x01]);
        let mut body = Vec::new();
        body.extend_from_slice(&MI_UINT32.to_le_bytes());
        body.extend_from_slice(&8u32.to_le_bytes());
        body.extend_from_slice(&(MX_UINT8).to_le_bytes());
        body.extend_from_slice(&0u32.to_le_bytes());
        body.extend_from_slice(&MI_INT32.to_le_bytes());
        body.extend_from_slice(&8u32.to_le_bytes());
        body.extend_from_slice(&1i32.to_le_bytes());
        body.extend_from_slice(&3i32.to_le_bytes());
        body.extend_from_slice(&((1u32 << 16) | MI_INT8).to_le_bytes());
        body.extend_from_slice(&[b'k', 0, 0, 0]);
        body.extend_from_slice(&((3u32 << 16) | MI_UINT8).to_le_bytes());
        body.extend_from_slice(&[7, 8, 9, 0]);
        bytes.extend_from_slice(&MI_MATRIX.to_le_bytes());
        bytes.extend_from_slice(&(body.len() as u32).to_le_bytes());
        bytes.extend(body);

        let file = read_mat_file(&mut bytes.as_slice()).unwrap();
        let value = file.get("k").unwrap();
        assert_eq!(value.as_uint8().unwrap(), &array![[7u8, 8, 9]].into_dyn());
    }
}
