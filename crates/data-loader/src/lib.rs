//! # Data Loader Crate
//!
//! Loads the success-rate lookup tables that feed the movie success
//! predictor.
//!
//! ## Main Components
//!
//! - **types**: `PersonRole`, `SuccessRateTable`, `SuccessRateTables`
//! - **parser**: Parse `name::rate` artifact files into tables
//! - **loader**: Load all four tables from an artifacts directory
//! - **error**: Error types for artifact loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{PersonRole, SuccessRateTables};
//! use std::path::Path;
//!
//! let tables = SuccessRateTables::load_from_dir(Path::new("artifacts"))?;
//! let nolan = tables.get(PersonRole::Director).get("Christopher Nolan");
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod loader;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use types::{fold_name, PersonRole, SuccessRateTable, SuccessRateTables};
