//! Classifier clients for the movie success model.
//!
//! The model itself is an opaque artifact. This crate puts it behind the
//! [`Classifier`] trait so the serving layer does not care where it runs:
//! - [`RemoteClassifier`] calls the Python scoring service over gRPC
//! - [`LinearClassifier`] evaluates an exported logistic model in-process

use pipeline::FeatureRecord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod linear;
pub mod remote;

// Include the generated protobuf code
pub mod proto {
    tonic::include_proto!("hitflop");
}

pub use linear::{CategoricalCoefficient, LinearClassifier, LinearModel, NumericCoefficient};
pub use remote::RemoteClassifier;

// Implementors outside this crate need the same macro as the trait
pub use tonic::async_trait;

/// Errors that can occur when interacting with a classifier
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Failed to connect to classifier service: {0}")]
    ConnectionError(String),

    #[error("Failed to score movies: {0}")]
    ScoringError(String),

    #[error("Invalid response from classifier: {0}")]
    InvalidResponse(String),

    #[error("Failed to load model from {path}: {reason}")]
    ModelLoad { path: String, reason: String },
}

/// Output class of the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Label {
    /// Class 0
    Flop,
    /// Class 1
    Hit,
}

impl Label {
    /// Map a raw class id to a label
    pub fn from_class(class: i64) -> Option<Self> {
        match class {
            0 => Some(Label::Flop),
            1 => Some(Label::Hit),
            _ => None,
        }
    }

    /// Raw class id (also the index into a probability pair)
    pub fn class(&self) -> usize {
        match self {
            Label::Flop => 0,
            Label::Hit => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Flop => "FLOP",
            Label::Hit => "HIT",
        }
    }
}

/// Label plus class probabilities `[p(FLOP), p(HIT)]` for one record
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    pub label: Label,
    pub probabilities: [f64; 2],
}

impl Classification {
    /// Probability of the predicted class
    pub fn label_probability(&self) -> f64 {
        self.probabilities[self.label.class()]
    }

    pub fn hit_probability(&self) -> f64 {
        self.probabilities[Label::Hit.class()]
    }
}

/// What a classifier reports about itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescription {
    pub model_type: String,
    /// Columns the model was fit on, in order. Empty when unknown.
    pub feature_names: Vec<String>,
}

/// A binary HIT/FLOP classifier over feature records.
///
/// Every method takes a batch and returns one entry per record, in order.
#[tonic::async_trait]
pub trait Classifier: Send + Sync {
    /// Short name for logs and health output
    fn name(&self) -> &str;

    /// Predicted class per record
    async fn predict(&self, records: &[FeatureRecord]) -> Result<Vec<Label>, ClassifierError>;

    /// `[p(FLOP), p(HIT)]` per record
    async fn predict_proba(&self, records: &[FeatureRecord]) -> Result<Vec<[f64; 2]>, ClassifierError>;

    async fn describe(&self) -> Result<ModelDescription, ClassifierError>;

    /// Label and probabilities together.
    ///
    /// The default makes one `predict` and one `predict_proba` call;
    /// implementations that get both at once should override it.
    async fn classify(&self, records: &[FeatureRecord]) -> Result<Vec<Classification>, ClassifierError> {
        let labels = self.predict(records).await?;
        let probabilities = self.predict_proba(records).await?;

        if labels.len() != records.len() || probabilities.len() != records.len() {
            return Err(ClassifierError::InvalidResponse(format!(
                "expected {} results, got {} labels and {} probability pairs",
                records.len(),
                labels.len(),
                probabilities.len()
            )));
        }

        Ok(labels
            .into_iter()
            .zip(probabilities)
            .map(|(label, probabilities)| Classification { label, probabilities })
            .collect())
    }
}
