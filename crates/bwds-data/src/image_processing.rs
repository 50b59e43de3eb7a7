//! Image processing for super-resolution benchmarks.
//!
//! Derives low-resolution inputs from high-resolution ground truth: the
//! high-resolution image is cropped to a multiple of the scale factor and
//! then resized down by that factor.

use bwds_core::{BwdsError, DownsampleConfig, ResizeFilter, Result};
use image::imageops::{self, FilterType};
use ndarray::{s, stack, Array3, Array4, Axis};

use crate::image_io::{array_to_rgb8, rgb8_to_array};

/// Downsampler for images and frame stacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Downsampler {
    scale: u32,
    filter: ResizeFilter,
}

impl Default for Downsampler {
    fn default() -> Self {
        Self {
            scale: 4,
            filter: ResizeFilter::Bicubic,
        }
    }
}

impl Downsampler {
    /// Create a downsampler. The scale must be at least 1.
    pub fn new(scale: u32, filter: ResizeFilter) -> Result<Self> {
        if scale == 0 {
            return Err(BwdsError::Config(
                "downsample scale must be at least 1".to_string(),
            ));
        }
        Ok(Self { scale, filter })
    }

    /// Create a downsampler from the build configuration.
    pub fn from_config(config: &DownsampleConfig) -> Result<Self> {
        Self::new(config.scale, config.filter)
    }

    /// Scale factor.
    #[must_use]
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Resampling filter.
    #[must_use]
    pub fn filter(&self) -> ResizeFilter {
        self.filter
    }

    /// Low-resolution `(height, width)` for a high-resolution size.
    #[must_use]
    pub fn lr_size(&self, height: usize, width: usize) -> (usize, usize) {
        let scale = self.scale as usize;
        (height / scale, width / scale)
    }

    /// Crop `hr` to a multiple of the scale and downsample it.
    ///
    /// Returns `(cropped_hr, lr)`.
    pub fn downsample_image(&self, hr: &Array3<u8>) -> Result<(Array3<u8>, Array3<u8>)> {
        let (height, width, channels) = hr.dim();
        if channels != 3 {
            return Err(BwdsError::ShapeMismatch {
                expected: vec![height, width, 3],
                actual: hr.shape().to_vec(),
            });
        }
        let (lr_height, lr_width) = self.lr_size(height, width);
        if lr_height == 0 || lr_width == 0 {
            return Err(BwdsError::Config(format!(
                "image of {height}x{width} is smaller than the scale factor {}",
                self.scale
            )));
        }

        let scale = self.scale as usize;
        let cropped = hr
            .slice(s![..lr_height * scale, ..lr_width * scale, ..])
            .to_owned();
        let resized = imageops::resize(
            &array_to_rgb8(cropped.view())?,
            lr_width as u32,
            lr_height as u32,
            filter_type(self.filter),
        );
        let lr = rgb8_to_array(resized)?;
        Ok((cropped, lr))
    }

    /// Crop and downsample every frame of a `(frames, height, width, 3)` stack.
    ///
    /// Returns `(cropped_hr, lr)`.
    pub fn downsample_video(&self, hr: &Array4<u8>) -> Result<(Array4<u8>, Array4<u8>)> {
        if hr.len_of(Axis(0)) == 0 {
            return Err(BwdsError::Config("video has no frames".to_string()));
        }

        let mut hr_frames = Vec::with_capacity(hr.len_of(Axis(0)));
        let mut lr_frames = Vec::with_capacity(hr.len_of(Axis(0)));
        for frame in hr.axis_iter(Axis(0)) {
            let (cropped, lr) = self.downsample_image(&frame.to_owned())?;
            hr_frames.push(cropped);
            lr_frames.push(lr);
        }

        let hr_views: Vec<_> = hr_frames.iter().map(|f| f.view()).collect();
        let lr_views: Vec<_> = lr_frames.iter().map(|f| f.view()).collect();
        Ok((stack(Axis(0), &hr_views)?, stack(Axis(0), &lr_views)?))
    }
}

fn filter_type(filter: ResizeFilter) -> FilterType {
    match filter {
        ResizeFilter::Nearest => FilterType::Nearest,
        ResizeFilter::Bilinear => FilterType::Triangle,
        ResizeFilter::Bicubic => FilterType::CatmullRom,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downsampler_creation() {
        let downsampler = Downsampler::default();
        assert_eq!(downsampler.scale(), 4);
        assert_eq!(downsampler.filter(), ResizeFilter::Bicubic);
        assert!(Downsampler::new(0, ResizeFilter::Nearest).is_err());
    }

    #[test]
    fn test_crop_and_lr_size() {
        let downsampler = Downsampler::new(4, ResizeFilter::Bicubic).unwrap();
        assert_eq!(downsampler.lr_size(10, 7), (2, 1));

        let hr = Array3::<u8>::from_elem((10, 7, 3), 100);
        let (cropped, lr) = downsampler.downsample_image(&hr).unwrap();
        assert_eq!(cropped.dim(), (8, 4, 3));
        assert_eq!(lr.dim(), (2, 1, 3));
    }

    #[test]
    fn test_constant_image_stays_constant() {
        for filter in [ResizeFilter::Nearest, ResizeFilter::Bilinear, ResizeFilter::Bicubic] {
            let downsampler = Downsampler::new(2, filter).unwrap();
            let hr = Array3::<u8>::from_elem((8, 8, 3), 200);
            let (_, lr) = downsampler.downsample_image(&hr).unwrap();
            assert!(lr.iter().all(|&v| v.abs_diff(200) <= 1), "{filter:?}");
        }
    }

    #[test]
    fn test_nearest_picks_block_samples() {
        // Each 2x2 block holds a single value, so nearest is exact.
        let hr = Array3::<u8>::from_shape_fn((4, 4, 3), |(y, x, _)| ((y / 2) * 2 + x / 2) as u8 * 50);
        let downsampler = Downsampler::new(2, ResizeFilter::Nearest).unwrap();
        let (_, lr) = downsampler.downsample_image(&hr).unwrap();
        assert_eq!(lr[[0, 0, 0]], 0);
        assert_eq!(lr[[0, 1, 0]], 50);
        assert_eq!(lr[[1, 0, 0]], 100);
        assert_eq!(lr[[1, 1, 0]], 150);
    }

    #[test]
    fn test_too_small_image() {
        let downsampler = Downsampler::new(4, ResizeFilter::Bicubic).unwrap();
        let hr = Array3::<u8>::zeros((3, 16, 3));
        assert!(matches!(
            downsampler.downsample_image(&hr),
            Err(BwdsError::Config(_))
        ));
    }

    #[test]
    fn test_video_frames() {
        let downsampler = Downsampler::new(3, ResizeFilter::Bilinear).unwrap();
        let hr = Array4::<u8>::from_elem((5, 13, 10, 3), 7);
        let (cropped, lr) = downsampler.downsample_video(&hr).unwrap();
        assert_eq!(cropped.dim(), (5, 12, 9, 3));
        assert_eq!(lr.dim(), (5, 4, 3, 3));

        let empty = Array4::<u8>::zeros((0, 8, 8, 3));
        assert!(downsampler.downsample_video(&empty).is_err());
    }
}
