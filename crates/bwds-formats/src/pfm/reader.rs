//! PFM decoder.

use std::io::BufRead;
use std::sync::LazyLock;

use byteorder::{BigEndian, ByteOrder as _, LittleEndian};
use ndarray::{ArrayD, IxDyn};
use regex::Regex;

use super::{ByteOrder, FloatMap, PFM_COLOR_MAGIC, PFM_GRAY_MAGIC};
use crate::FormatError;

static DIMENSIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s(\d+)").expect("dimension pattern is valid"));

/// Decode a float map from a reader.
///
/// Consumes the reader to the end. Samples are flipped so that row 0 is the
/// top of the image and multiplied by the absolute header scale.
pub fn read_float_map<R: BufRead>(reader: &mut R) -> Result<FloatMap, FormatError> {
    let magic = read_header_line(reader)?;
    let channels = match magic.trim_end() {
        PFM_COLOR_MAGIC => 3,
        PFM_GRAY_MAGIC => 1,
        _ => return Err(FormatError::NotFloatMap),
    };

    let dims = read_header_line(reader)?;
    let (width, height) = parse_dimensions(&dims)?;

    let scale_line = read_header_line(reader)?;
    let raw_scale: f32 = scale_line
        .trim()
        .parse()
        .map_err(|_| FormatError::MalformedScale)?;
    let (byte_order, scale) = if raw_scale < 0.0 {
        (ByteOrder::Little, -raw_scale)
    } else {
        (ByteOrder::Big, raw_scale)
    };

    let n_samples = height
        .checked_mul(width)
        .and_then(|n| n.checked_mul(channels))
        .ok_or(FormatError::MalformedDimensions)?;
    let n_bytes = n_samples
        .checked_mul(4)
        .ok_or(FormatError::MalformedDimensions)?;

    // Header dimensions are untrusted; size the buffer from the data read.
    let mut payload = Vec::new();
    reader.read_to_end(&mut payload)?;
    if payload.len() < n_bytes {
        return Err(FormatError::Truncated {
            expected: n_bytes,
            actual: payload.len(),
        });
    }
    if payload.len() > n_bytes {
        tracing::warn!(
            trailing = payload.len() - n_bytes,
            "Ignoring bytes after float-map samples"
        );
    }

    let mut samples = vec![0f32; n_samples];
    match byte_order {
        ByteOrder::Little => LittleEndian::read_f32_into(&payload[..n_bytes], &mut samples),
        ByteOrder::Big => BigEndian::read_f32_into(&payload[..n_bytes], &mut samples),
    }

    // Stored bottom row first.
    let row_len = width * channels;
    let flipped: Vec<f32> = samples
        .chunks_exact(row_len)
        .rev()
        .flatten()
        .map(|v| v * scale)
        .collect();
    let shape: &[usize] = if channels == 1 {
        &[height, width]
    } else {
        &[height, width, channels]
    };
    let data = ArrayD::from_shape_vec(IxDyn(shape), flipped)
        .map_err(|_| FormatError::MalformedDimensions)?;

    tracing::debug!(width, height, channels, ?byte_order, scale, "Decoded float map");

    Ok(FloatMap {
        data,
        byte_order,
        scale,
    })
}

fn read_header_line<R: BufRead>(reader: &mut R) -> Result<String, FormatError> {
    let mut line = Vec::new();
    reader.read_until(b'\n', &mut line)?;
    Ok(String::from_utf8_lossy(&line).into_owned())
}

fn parse_dimensions(line: &str) -> Result<(usize, usize), FormatError> {
    let caps = DIMENSIONS
        .captures(line)
        .ok_or(FormatError::MalformedDimensions)?;
    let width: usize = caps[1]
        .parse()
        .map_err(|_| FormatError::MalformedDimensions)?;
    let height: usize = caps[2]
        .parse()
        .map_err(|_| FormatError::MalformedDimensions)?;
    if width == 0 || height == 0 {
        return Err(FormatError::MalformedDimensions);
    }
    Ok((width, height))
}
