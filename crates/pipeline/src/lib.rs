//! Feature preparation for the movie success classifier.
//!
//! This crate provides:
//! - The success-rate resolver (director and lead actors)
//! - Request field coercion with typed errors
//! - The feature assembler producing the 13-column `FeatureRecord`
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{FeatureAssembler, MovieRequest};
//!
//! let assembler = FeatureAssembler::new(tables.clone());
//! let record = assembler.assemble(&request)?;
//! ```

pub mod error;
pub mod resolver;
pub mod coerce;
pub mod features;

// Re-export main types
pub use error::{FeatureError, Result};
pub use resolver::{resolve, resolve_success_rate, MatchKind, Resolution, DEFAULT_SUCCESS_RATE};
pub use features::{
    assemble_features, check_schema, defaults, FeatureAssembler, FeatureRecord, MovieRequest,
    FEATURE_COLUMNS,
};
