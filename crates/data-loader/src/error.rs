//! Error types for the data-loader crate.
//!
//! Every artifact problem is reported with the file (and line, when there is
//! one) that caused it, so a broken deployment can be fixed without guessing.

use crate::types::PersonRole;
use thiserror::Error;

/// Errors that can occur while loading success-rate artifacts
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Line in an artifact file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// A success-rate table was not supplied.
    ///
    /// The loader never returns this variant as an `Err`; it logs it and
    /// substitutes an empty table so lookups fall back to the default rate.
    #[error("No {role} success-rate table at {path}, using an empty table")]
    MissingTable { role: PersonRole, path: String },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
