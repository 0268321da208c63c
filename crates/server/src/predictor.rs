//! # Prediction Service
//!
//! Coordinates one prediction:
//! 1. Validate the request (non-empty, all required fields present)
//! 2. Assemble the feature record
//! 3. Classify it
//! 4. Format the HIT/FLOP response with its key factors
//!
//! The service owns everything a request needs (tables, classifier, load
//! time) and is cloned into each handler.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use data_loader::SuccessRateTables;
use ml_client::{Classifier, Label, ModelDescription};
use pipeline::{FeatureAssembler, FeatureRecord, MovieRequest, check_schema};

use crate::error::ApiError;
use crate::factors::key_factors;

/// Fields every prediction request must carry
pub const REQUIRED_FIELDS: [&str; 14] = [
    "movie_title",
    "director",
    "actor1",
    "actor2",
    "actor3",
    "budget",
    "runtime",
    "genres",
    "production_companies",
    "original_language",
    "release_year",
    "release_month",
    "avg_rating",
    "ratings_count",
];

/// Response for one movie
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoviePrediction {
    /// Echoed from the request unchanged
    pub movie_title: Value,
    pub prediction: Label,
    /// Probability of the predicted class, 3 decimals
    pub probability: f64,
    /// Same probability as a percentage, 1 decimal
    pub confidence: f64,
    pub features_used: Vec<String>,
    pub timestamp: String,
}

#[derive(Clone)]
pub struct PredictionService {
    assembler: FeatureAssembler,
    classifier: Arc<dyn Classifier>,
    model: ModelDescription,
    loaded_at: DateTime<Local>,
}

impl PredictionService {
    /// Build the service and check the classifier accepts our columns.
    ///
    /// A classifier that declares no feature names is trusted as-is.
    pub async fn new(
        tables: Arc<SuccessRateTables>,
        classifier: Arc<dyn Classifier>,
    ) -> Result<Self, ApiError> {
        let model = classifier.describe().await?;

        if model.feature_names.is_empty() {
            info!("Classifier '{}' declares no feature names; skipping schema check", classifier.name());
        } else {
            check_schema(model.feature_names.as_slice()).map_err(|e| ApiError::SchemaMismatch(e.to_string()))?;
        }

        info!("Prediction service ready with {} ({})", model.model_type, classifier.name());
        Ok(Self {
            assembler: FeatureAssembler::new(tables),
            classifier,
            model,
            loaded_at: Local::now(),
        })
    }

    pub fn tables(&self) -> &SuccessRateTables {
        self.assembler.tables()
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    pub fn model(&self) -> &ModelDescription {
        &self.model
    }

    pub fn loaded_at(&self) -> DateTime<Local> {
        self.loaded_at
    }

    /// Reject empty requests and requests missing any required field
    pub fn validate(request: &MovieRequest) -> Result<(), ApiError> {
        if request.is_empty() {
            return Err(ApiError::NoData);
        }

        let missing: Vec<String> = REQUIRED_FIELDS
            .iter()
            .filter(|field| !request.contains_key(**field))
            .map(|field| field.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ApiError::MissingFields(missing))
        }
    }

    /// Main entry point: predict one movie
    pub async fn predict(&self, request: &MovieRequest) -> Result<MoviePrediction, ApiError> {
        let start_time = Instant::now();

        Self::validate(request)?;

        let record = self.assembler.assemble(request)?;
        debug!("Assembled features: {:?}", record);

        let title = request.get("movie_title").cloned().unwrap_or(Value::Null);
        let prediction = self.classify(title, &record).await?;

        info!(
            "Prediction for {}: {} (probability: {:.3}) in {:.2?}",
            prediction.movie_title,
            prediction.prediction.as_str(),
            prediction.probability,
            start_time.elapsed()
        );
        Ok(prediction)
    }

    /// Classify an assembled record and format the response
    pub async fn classify(
        &self,
        movie_title: Value,
        record: &FeatureRecord,
    ) -> Result<MoviePrediction, ApiError> {
        let classification = self
            .classifier
            .classify(std::slice::from_ref(record))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                ml_client::ClassifierError::InvalidResponse("empty classification".to_string())
            })?;

        let probability = classification.label_probability();

        Ok(MoviePrediction {
            movie_title,
            prediction: classification.label,
            probability: round_to(probability, 3),
            confidence: round_to(probability * 100.0, 1),
            features_used: key_factors(record),
            timestamp: Local::now().to_rfc3339(),
        })
    }
}

/// Round to `decimals` places on the exact binary value
fn round_to(value: f64, decimals: usize) -> f64 {
    format!("{:.*}", decimals, value).parse().unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::SuccessRateTable;
    use ml_client::{Classification, ClassifierError};
    use pipeline::FEATURE_COLUMNS;
    use serde_json::json;

    // ============================================================================
    // Test Fixtures
    // ============================================================================

    /// Returns fixed probabilities and declares the given columns
    struct FixedClassifier {
        probabilities: [f64; 2],
        feature_names: Vec<String>,
    }

    impl FixedClassifier {
        fn new(p_hit: f64) -> Self {
            Self {
                probabilities: [1.0 - p_hit, p_hit],
                feature_names: FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            }
        }
    }

    #[ml_client::async_trait]
    impl Classifier for FixedClassifier {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn predict(&self, records: &[FeatureRecord]) -> Result<Vec<Label>, ClassifierError> {
            let label = if self.probabilities[1] > 0.5 { Label::Hit } else { Label::Flop };
            Ok(vec![label; records.len()])
        }

        async fn predict_proba(&self, records: &[FeatureRecord]) -> Result<Vec<[f64; 2]>, ClassifierError> {
            Ok(vec![self.probabilities; records.len()])
        }

        async fn describe(&self) -> Result<ModelDescription, ClassifierError> {
            Ok(ModelDescription {
                model_type: "Fixed".to_string(),
                feature_names: self.feature_names.clone(),
            })
        }
    }

    struct FailingClassifier;

    #[ml_client::async_trait]
    impl Classifier for FailingClassifier {
        fn name(&self) -> &str {
            "failing"
        }

        async fn predict(&self, _records: &[FeatureRecord]) -> Result<Vec<Label>, ClassifierError> {
            Err(ClassifierError::ScoringError("service unavailable".to_string()))
        }

        async fn predict_proba(&self, _records: &[FeatureRecord]) -> Result<Vec<[f64; 2]>, ClassifierError> {
            Err(ClassifierError::ScoringError("service unavailable".to_string()))
        }

        async fn describe(&self) -> Result<ModelDescription, ClassifierError> {
            Ok(ModelDescription {
                model_type: "Failing".to_string(),
                feature_names: Vec::new(),
            })
        }

        async fn classify(&self, _records: &[FeatureRecord]) -> Result<Vec<Classification>, ClassifierError> {
            Err(ClassifierError::ScoringError("service unavailable".to_string()))
        }
    }

    fn build_test_tables() -> Arc<SuccessRateTables> {
        Arc::new(SuccessRateTables::new(
            SuccessRateTable::from_entries([("Christopher Nolan", 0.85)]),
            SuccessRateTable::from_entries([("Leonardo DiCaprio", 0.80)]),
            SuccessRateTable::from_entries([("Tom Hanks", 0.85)]),
            SuccessRateTable::from_entries([("Morgan Freeman", 0.75)]),
        ))
    }

    async fn build_test_service(classifier: impl Classifier + 'static) -> PredictionService {
        PredictionService::new(build_test_tables(), Arc::new(classifier))
            .await
            .expect("Failed to create prediction service")
    }

    fn full_request() -> MovieRequest {
        match json!({
            "movie_title": "Inception",
            "director": "Christopher Nolan",
            "actor1": "Leonardo DiCaprio",
            "actor2": "Tom Hanks",
            "actor3": "Morgan Freeman",
            "budget": 160000000,
            "runtime": 148,
            "genres": "Action",
            "production_companies": "Warner Bros.",
            "original_language": "en",
            "release_year": 2010,
            "release_month": 7,
            "avg_rating": 8.8,
            "ratings_count": 2300000
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    // ============================================================================
    // Unit Tests: validate
    // ============================================================================

    #[test]
    fn test_validate_accepts_full_request() {
        assert!(PredictionService::validate(&full_request()).is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_request() {
        let result = PredictionService::validate(&MovieRequest::new());
        assert!(matches!(result, Err(ApiError::NoData)));
    }

    #[test]
    fn test_validate_lists_missing_fields_in_order() {
        let mut request = full_request();
        request.remove("budget");
        request.remove("actor3");

        match PredictionService::validate(&request) {
            Err(ApiError::MissingFields(fields)) => assert_eq!(fields, vec!["actor3", "budget"]),
            other => panic!("expected MissingFields, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_accepts_null_values() {
        let mut request = full_request();
        request.insert("actor3".to_string(), Value::Null);

        assert!(PredictionService::validate(&request).is_ok());
    }

    // ============================================================================
    // Unit Tests: predict
    // ============================================================================

    #[tokio::test]
    async fn test_predict_hit() {
        let service = build_test_service(FixedClassifier::new(0.87654)).await;

        let prediction = service.predict(&full_request()).await.unwrap();

        assert_eq!(prediction.movie_title, "Inception");
        assert_eq!(prediction.prediction, Label::Hit);
        assert_eq!(prediction.probability, 0.877);
        assert_eq!(prediction.confidence, 87.7);
        assert_eq!(
            prediction.features_used,
            vec![
                "Strong director track record (85.0%)",
                "Lead actor success rate (80.0%)",
                "High production budget",
                "High audience rating (8.8/10)",
                "Popular genre",
            ]
        );
    }

    #[tokio::test]
    async fn test_predict_echoes_title_unchanged() {
        let service = build_test_service(FixedClassifier::new(0.9)).await;
        let mut request = full_request();

        request.insert("movie_title".to_string(), Value::Null);
        let prediction = service.predict(&request).await.unwrap();
        assert_eq!(prediction.movie_title, Value::Null);
        assert!(serde_json::to_value(&prediction).unwrap()["movie_title"].is_null());

        request.insert("movie_title".to_string(), json!(1984));
        let prediction = service.predict(&request).await.unwrap();
        assert_eq!(prediction.movie_title, json!(1984));
    }

    #[tokio::test]
    async fn test_predict_flop_reports_flop_probability() {
        let service = build_test_service(FixedClassifier::new(0.2)).await;

        let prediction = service.predict(&full_request()).await.unwrap();

        assert_eq!(prediction.prediction, Label::Flop);
        assert_eq!(prediction.probability, 0.8);
        assert_eq!(prediction.confidence, 80.0);
    }

    #[tokio::test]
    async fn test_predict_serializes_label_as_text() {
        let service = build_test_service(FixedClassifier::new(0.9)).await;

        let prediction = service.predict(&full_request()).await.unwrap();
        let json = serde_json::to_value(&prediction).unwrap();

        assert_eq!(json["prediction"], "HIT");
        assert!(json["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_predict_rejects_bad_field_value() {
        let service = build_test_service(FixedClassifier::new(0.9)).await;
        let mut request = full_request();
        request.insert("budget".to_string(), json!("N/A"));

        let result = service.predict(&request).await;

        assert!(matches!(result, Err(ApiError::InvalidField(_))));
    }

    #[tokio::test]
    async fn test_predict_surfaces_classifier_failure() {
        let service = build_test_service(FailingClassifier).await;

        let result = service.predict(&full_request()).await;

        assert!(matches!(result, Err(ApiError::Prediction(_))));
    }

    // ============================================================================
    // Construction
    // ============================================================================

    #[tokio::test]
    async fn test_schema_mismatch_refuses_to_start() {
        let mut classifier = FixedClassifier::new(0.9);
        classifier.feature_names.swap(0, 1);

        let result = PredictionService::new(build_test_tables(), Arc::new(classifier)).await;

        assert!(matches!(result, Err(ApiError::SchemaMismatch(_))));
    }

    #[tokio::test]
    async fn test_service_exposes_model_and_tables() {
        let service = build_test_service(FixedClassifier::new(0.9)).await;

        assert_eq!(service.classifier_name(), "fixed");
        assert_eq!(service.model().model_type, "Fixed");
        assert_eq!(service.tables().counts(), (1, 1, 1, 1));
        assert!(service.loaded_at() <= Local::now());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.87654, 3), 0.877);
        assert_eq!(round_to(87.654, 1), 87.7);
        assert_eq!(round_to(0.5, 3), 0.5);
        // 0.5125 is stored just below the half
        assert_eq!(round_to(0.5125, 3), 0.512);
        assert_eq!(round_to(0.5005 * 100.0, 1), 50.0);
    }
}
