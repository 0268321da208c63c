//! In-process logistic model exported from the training pipeline.
//!
//! The artifact is plain JSON:
//!
//! ```json
//! {
//!   "model_type": "LogisticRegression",
//!   "feature_names": ["budget", "runtime", ...],
//!   "intercept": -0.4,
//!   "numeric_coefficients": [
//!     { "feature": "budget", "mean": 4.1e7, "scale": 5.2e7, "coefficient": 0.9 }
//!   ],
//!   "categorical_coefficients": [
//!     { "feature": "genres", "value_coefficients": { "Action": 0.3 }, "missing_value_coefficient": 0.0 }
//!   ]
//! }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use pipeline::{FeatureRecord, FEATURE_COLUMNS};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{Classification, Classifier, ClassifierError, Label, ModelDescription};

fn default_model_type() -> String {
    "LogisticRegression".to_string()
}

fn default_scale() -> f64 {
    1.0
}

/// Standardized numeric term: `coefficient * (x - mean) / scale`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericCoefficient {
    pub feature: String,
    #[serde(default)]
    pub mean: f64,
    #[serde(default = "default_scale")]
    pub scale: f64,
    pub coefficient: f64,
}

/// One-hot categorical term with a fallback for unseen values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalCoefficient {
    pub feature: String,
    pub value_coefficients: HashMap<String, f64>,
    #[serde(default)]
    pub missing_value_coefficient: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    #[serde(default = "default_model_type")]
    pub model_type: String,
    #[serde(default)]
    pub feature_names: Vec<String>,
    pub intercept: f64,
    #[serde(default)]
    pub numeric_coefficients: Vec<NumericCoefficient>,
    #[serde(default)]
    pub categorical_coefficients: Vec<CategoricalCoefficient>,
}

/// Classifier that scores records with a [`LinearModel`].
pub struct LinearClassifier {
    model: LinearModel,
}

impl LinearClassifier {
    /// Wrap a model, checking that every term names a column of the right kind.
    pub fn new(model: LinearModel) -> Result<Self, ClassifierError> {
        let invalid = |feature: &str, kind: &str| ClassifierError::ModelLoad {
            path: "<memory>".to_string(),
            reason: format!("'{}' is not a {} feature column", feature, kind),
        };

        // Any record will do for asking which kind a column is
        let probe = probe_record();
        for term in &model.numeric_coefficients {
            if probe.numeric(&term.feature).is_none() {
                return Err(invalid(&term.feature, "numeric"));
            }
        }
        for term in &model.categorical_coefficients {
            if probe.categorical(&term.feature).is_none() {
                return Err(invalid(&term.feature, "categorical"));
            }
        }

        Ok(Self { model })
    }

    pub fn from_json_str(json: &str) -> Result<Self, ClassifierError> {
        let model: LinearModel = serde_json::from_str(json).map_err(|e| ClassifierError::ModelLoad {
            path: "<memory>".to_string(),
            reason: e.to_string(),
        })?;
        Self::new(model)
    }

    /// Load a model artifact from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        let with_path = |reason: String| ClassifierError::ModelLoad {
            path: path.display().to_string(),
            reason,
        };

        let content = fs::read_to_string(path).map_err(|e| with_path(e.to_string()))?;
        let model: LinearModel = serde_json::from_str(&content).map_err(|e| with_path(e.to_string()))?;

        let classifier = Self::new(model).map_err(|e| match e {
            ClassifierError::ModelLoad { reason, .. } => with_path(reason),
            other => other,
        })?;

        info!(
            "Loaded {} from {} ({} numeric, {} categorical terms)",
            classifier.model.model_type,
            path.display(),
            classifier.model.numeric_coefficients.len(),
            classifier.model.categorical_coefficients.len()
        );
        Ok(classifier)
    }

    pub fn model(&self) -> &LinearModel {
        &self.model
    }

    /// Log-odds of HIT for one record
    pub fn score(&self, record: &FeatureRecord) -> f64 {
        let numeric: f64 = self
            .model
            .numeric_coefficients
            .iter()
            .map(|term| {
                let x = record.numeric(&term.feature).unwrap_or(term.mean);
                let scale = if term.scale == 0.0 { 1.0 } else { term.scale };
                term.coefficient * (x - term.mean) / scale
            })
            .sum();

        let categorical: f64 = self
            .model
            .categorical_coefficients
            .iter()
            .map(|term| {
                record
                    .categorical(&term.feature)
                    .and_then(|value| term.value_coefficients.get(value))
                    .copied()
                    .unwrap_or(term.missing_value_coefficient)
            })
            .sum();

        self.model.intercept + numeric + categorical
    }

    /// `[p(FLOP), p(HIT)]` for one record
    pub fn probabilities(&self, record: &FeatureRecord) -> [f64; 2] {
        let hit = sigmoid(self.score(record));
        [1.0 - hit, hit]
    }

    fn classify_one(&self, record: &FeatureRecord) -> Classification {
        let probabilities = self.probabilities(record);
        // Ties go to class 0, as with argmax
        let label = if probabilities[1] > 0.5 { Label::Hit } else { Label::Flop };
        Classification { label, probabilities }
    }
}

/// Logistic function without overflow for large |z|
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

fn probe_record() -> FeatureRecord {
    FeatureRecord {
        budget: 0.0,
        runtime: 0.0,
        release_year: 0,
        release_month: 0,
        avg_rating: 0.0,
        ratings_count: 0,
        director_success_rate: 0.0,
        actor1_success_rate: 0.0,
        actor2_success_rate: 0.0,
        actor3_success_rate: 0.0,
        genres: String::new(),
        original_language: String::new(),
        production_companies: String::new(),
    }
}

#[tonic::async_trait]
impl Classifier for LinearClassifier {
    fn name(&self) -> &str {
        "linear"
    }

    async fn predict(&self, records: &[FeatureRecord]) -> Result<Vec<Label>, ClassifierError> {
        Ok(records.iter().map(|r| self.classify_one(r).label).collect())
    }

    async fn predict_proba(&self, records: &[FeatureRecord]) -> Result<Vec<[f64; 2]>, ClassifierError> {
        Ok(records.iter().map(|r| self.probabilities(r)).collect())
    }

    async fn describe(&self) -> Result<ModelDescription, ClassifierError> {
        let feature_names = if self.model.feature_names.is_empty() {
            FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect()
        } else {
            self.model.feature_names.clone()
        };

        Ok(ModelDescription {
            model_type: self.model.model_type.clone(),
            feature_names,
        })
    }

    async fn classify(&self, records: &[FeatureRecord]) -> Result<Vec<Classification>, ClassifierError> {
        Ok(records.iter().map(|r| self.classify_one(r)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MODEL: &str = r#"{
        "model_type": "LogisticRegression",
        "intercept": -1.0,
        "numeric_coefficients": [
            { "feature": "director_success_rate", "mean": 0.5, "scale": 0.2, "coefficient": 2.0 },
            { "feature": "budget", "mean": 0.0, "scale": 0.0, "coefficient": 0.0 }
        ],
        "categorical_coefficients": [
            {
                "feature": "genres",
                "value_coefficients": { "Action": 1.0, "Drama": -0.5 },
                "missing_value_coefficient": 0.25
            }
        ]
    }"#;

    fn record(director_success_rate: f64, genres: &str) -> FeatureRecord {
        FeatureRecord {
            director_success_rate,
            genres: genres.to_string(),
            ..probe_record()
        }
    }

    #[test]
    fn test_score_combines_terms() {
        let classifier = LinearClassifier::from_json_str(MODEL).unwrap();

        // -1 + 2 * (0.9 - 0.5) / 0.2 + 1
        let score = classifier.score(&record(0.9, "Action"));
        assert!((score - 4.0).abs() < 1e-9);

        // Unseen genre falls back to the missing-value coefficient
        let score = classifier.score(&record(0.5, "Western"));
        assert!((score - (-0.75)).abs() < 1e-9);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let classifier = LinearClassifier::from_json_str(MODEL).unwrap();

        for rate in [0.0, 0.3, 0.5, 0.85, 1.0] {
            let [p0, p1] = classifier.probabilities(&record(rate, "Drama"));
            assert!((p0 + p1 - 1.0).abs() < 1e-12);
            assert!((0.0..=1.0).contains(&p1));
        }
    }

    #[test]
    fn test_sigmoid_is_stable_at_extremes() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(1000.0) > 0.999);
        assert!(sigmoid(-1000.0) < 0.001);
        assert!(sigmoid(-1000.0).is_finite());
    }

    #[tokio::test]
    async fn test_threshold_decides_label() {
        let classifier = LinearClassifier::from_json_str(MODEL).unwrap();

        let results = classifier
            .classify(&[record(0.9, "Action"), record(0.2, "Drama")])
            .await
            .unwrap();

        assert_eq!(results[0].label, Label::Hit);
        assert_eq!(results[1].label, Label::Flop);
        assert!(results[1].label_probability() > 0.5);
    }

    #[tokio::test]
    async fn test_even_odds_resolve_to_flop() {
        let classifier = LinearClassifier::from_json_str(r#"{ "intercept": 0.0 }"#).unwrap();

        let labels = classifier.predict(&[record(0.5, "Drama")]).await.unwrap();

        assert_eq!(labels, vec![Label::Flop]);
    }

    #[tokio::test]
    async fn test_describe_defaults_to_feature_columns() {
        let classifier = LinearClassifier::from_json_str(MODEL).unwrap();

        let description = classifier.describe().await.unwrap();

        assert_eq!(description.model_type, "LogisticRegression");
        assert_eq!(description.feature_names.len(), FEATURE_COLUMNS.len());
    }

    #[test]
    fn test_unknown_feature_is_rejected() {
        let json = r#"{
            "intercept": 0.0,
            "numeric_coefficients": [{ "feature": "genres", "coefficient": 1.0 }]
        }"#;

        let result = LinearClassifier::from_json_str(json);
        assert!(matches!(result, Err(ClassifierError::ModelLoad { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MODEL.as_bytes()).unwrap();

        let classifier = LinearClassifier::load(file.path()).unwrap();
        assert_eq!(classifier.model().numeric_coefficients.len(), 2);

        let missing = LinearClassifier::load(file.path().with_extension("missing"));
        match missing {
            Err(ClassifierError::ModelLoad { path, .. }) => assert!(path.ends_with(".missing")),
            other => panic!("expected ModelLoad error, got {:?}", other.map(|_| ())),
        }
    }
}
