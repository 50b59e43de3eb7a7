//! Dataset builders for image restoration and light-field benchmarks.
//!
//! This crate provides:
//! - Image decoding into `ndarray` arrays
//! - Super-resolution downsampling of images and videos
//! - Light-field scene assembly from view grids and float maps
//! - One [`DatasetBuilder`](bwds_core::DatasetBuilder) per supported dataset
//! - A [`Registry`] of builders and the [`Preparer`] that drives them
//!
//! # Example
//!
//! ```no_run
//! use bwds_core::BuildConfig;
//! use bwds_data::{Preparer, Registry};
//!
//! let registry = Registry::new(BuildConfig::with_root("data"))?;
//! let builder = registry.builder("hci_lf/simulated")?;
//! let summary = Preparer::new(builder.as_ref(), registry.resources())
//!     .prepare(|split, example| {
//!         println!("{split}: {}", example.key);
//!         Ok(())
//!     })?;
//! println!("{} records", summary.total_examples());
//! # Ok::<(), bwds_core::BwdsError>(())
//! ```

#![warn(missing_docs)]

pub mod datasets;
pub mod driver;
pub mod image_io;
pub mod image_processing;
pub mod lightfield;
pub mod registry;

pub use driver::*;
pub use image_io::*;
pub use image_processing::*;
pub use lightfield::*;
pub use registry::*;
