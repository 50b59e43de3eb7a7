//! Core types, traits, and configuration for bwds dataset builders.
//!
//! This crate provides the foundational abstractions shared by the format
//! readers and the dataset builders:
//!
//! - The [`DatasetBuilder`] capability trait
//! - Build configuration ([`BuildConfig`]) loaded from YAML
//! - Splits, feature schemas, dataset metadata and records
//! - Resource path resolution
//! - Error handling infrastructure

#![warn(missing_docs)]

mod config;
mod error;
mod record;
mod resources;
mod traits;
mod types;

pub use config::*;
pub use error::*;
pub use record::*;
pub use resources::Resources;
pub use traits::*;
pub use types::*;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::*;
    pub use crate::error::{BwdsError, Result};
    pub use crate::record::*;
    pub use crate::resources::Resources;
    pub use crate::traits::*;
    pub use crate::types::*;
}
