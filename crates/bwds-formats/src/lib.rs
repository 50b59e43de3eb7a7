//! File formats used by the dataset builders.
//!
//! This crate provides:
//! - A reader and writer for portable float maps (PFM), the format of
//!   light-field depth and disparity ground truth
//! - A reader and writer for MATLAB level 5 MAT-files
//! - A parser for INI-style scene parameter files
//!
//! # Example
//!
//! ```ignore
//! use bwds_formats::{FloatMap, MatFile, ParameterFile};
//!
//! let depth = FloatMap::from_file("scene/gt_depth_lowres.pfm")?.into_gray()?;
//! let params = ParameterFile::from_file("scene/parameters.cfg")?;
//! let rows = params.get_int("extrinsics", "num_cams_y")?;
//! let kernels = MatFile::from_file("kernels.mat")?;
//! ```

#![warn(missing_docs)]

mod error;
pub mod mat;
pub mod params;
pub mod pfm;

pub use error::{FormatError, ParamsError};
pub use mat::{read_mat_file, MatFile, MatValue, MatWriter};
pub use params::ParameterFile;
pub use pfm::{read_float_map, ByteOrder, FloatMap, PfmWriter};
