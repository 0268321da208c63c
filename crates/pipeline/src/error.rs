//! Error types for feature preparation.

use thiserror::Error;

/// Errors raised while turning a movie request into a feature record
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeatureError {
    /// A present field could not be coerced to its declared type.
    ///
    /// `value` is the offending value rendered as JSON. Absent fields never
    /// produce this error; they take their documented default.
    #[error("Invalid value for field '{field}': {value} (expected {expected})")]
    FieldCoercion {
        field: String,
        value: String,
        expected: &'static str,
    },

    /// The classifier was fit on a different column list
    #[error("Feature schema mismatch: classifier expects {expected:?}, assembler produces {actual:?}")]
    ShapeMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },
}

pub type Result<T> = std::result::Result<T, FeatureError>;
