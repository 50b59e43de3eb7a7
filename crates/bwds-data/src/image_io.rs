//! Decoding images into arrays.
//!
//! All arrays are `(height, width, channels)` in row-major order.

use bwds_core::{BwdsError, Result};
use image::{DynamicImage, ImageBuffer, ImageError, ImageReader, Rgb, RgbImage};
use ndarray::{Array3, ArrayView3};
use std::path::Path;

/// 16-bit RGB image buffer.
pub type Rgb16Image = ImageBuffer<Rgb<u16>, Vec<u16>>;

/// Decode an image, guessing the format from its content.
pub fn open_image(path: impl AsRef<Path>) -> Result<DynamicImage> {
    let path = path.as_ref();
    let image = ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| decode_error(path, e))?;
    tracing::debug!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        color = ?image.color(),
        "Decoded image"
    );
    Ok(image)
}

/// Load an image as 8-bit RGB.
///
/// Grayscale images are expanded, alpha channels are dropped and deeper
/// samples are scaled down.
pub fn load_rgb8(path: impl AsRef<Path>) -> Result<Array3<u8>> {
    rgb8_to_array(open_image(path)?.to_rgb8())
}

/// Load an image that must already have exactly three channels.
pub fn load_rgb8_strict(path: impl AsRef<Path>) -> Result<Array3<u8>> {
    let path = path.as_ref();
    let image = open_image(path)?;
    let channels = image.color().channel_count();
    if channels != 3 {
        return Err(BwdsError::Config(format!(
            "{} has {channels} channels, expected 3",
            path.display()
        )));
    }
    rgb8_to_array(image.to_rgb8())
}

/// Load an image as 16-bit RGB without losing precision.
pub fn load_rgb16(path: impl AsRef<Path>) -> Result<Array3<u16>> {
    let image = open_image(path)?.to_rgb16();
    let (width, height) = image.dimensions();
    Ok(Array3::from_shape_vec(
        (height as usize, width as usize, 3),
        image.into_raw(),
    )?)
}

/// Convert an RGB buffer into a `(height, width, 3)` array.
pub fn rgb8_to_array(image: RgbImage) -> Result<Array3<u8>> {
    let (width, height) = image.dimensions();
    Ok(Array3::from_shape_vec(
        (height as usize, width as usize, 3),
        image.into_raw(),
    )?)
}

/// Convert a `(height, width, 3)` array into an RGB buffer.
pub fn array_to_rgb8(array: ArrayView3<'_, u8>) -> Result<RgbImage> {
    let (height, width, channels) = array.dim();
    let mismatch = || BwdsError::ShapeMismatch {
        expected: vec![height, width, 3],
        actual: array.shape().to_vec(),
    };
    if channels != 3 {
        return Err(mismatch());
    }
    let width = u32::try_from(width).map_err(|_| mismatch())?;
    let height = u32::try_from(height).map_err(|_| mismatch())?;
    RgbImage::from_raw(width, height, array.iter().copied().collect()).ok_or_else(mismatch)
}

/// Encode a `(height, width, 3)` array; the format follows the file extension.
pub fn save_rgb8(array: ArrayView3<'_, u8>, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    array_to_rgb8(array)?
        .save(path)
        .map_err(|e| decode_error(path, e))
}

fn decode_error(path: &Path, err: ImageError) -> BwdsError {
    match err {
        ImageError::IoError(e) => BwdsError::Io(e),
        other => BwdsError::Format(format!("{}: {other}", path.display())),
    }
}
