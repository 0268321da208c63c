//! gRPC client for the Python scoring service.

use pipeline::FeatureRecord;
use tonic::transport::Channel;
use tracing::{debug, error, info};

use crate::proto::{
    movie_classifier_client::MovieClassifierClient, DescribeModelRequest, MovieFeatures,
    PredictRequest, Prediction,
};
use crate::{Classification, Classifier, ClassifierError, Label, ModelDescription};

impl From<&FeatureRecord> for MovieFeatures {
    fn from(record: &FeatureRecord) -> Self {
        MovieFeatures {
            budget: record.budget,
            runtime: record.runtime,
            release_year: record.release_year,
            release_month: record.release_month,
            avg_rating: record.avg_rating,
            ratings_count: record.ratings_count,
            director_success_rate: record.director_success_rate,
            actor1_success_rate: record.actor1_success_rate,
            actor2_success_rate: record.actor2_success_rate,
            actor3_success_rate: record.actor3_success_rate,
            genres: record.genres.clone(),
            original_language: record.original_language.clone(),
            production_companies: record.production_companies.clone(),
        }
    }
}

fn to_classification(prediction: Prediction) -> Result<Classification, ClassifierError> {
    let label = Label::from_class(prediction.label as i64).ok_or_else(|| {
        ClassifierError::InvalidResponse(format!("unknown class label {}", prediction.label))
    })?;

    let probabilities: [f64; 2] = prediction.probabilities.as_slice().try_into().map_err(|_| {
        ClassifierError::InvalidResponse(format!(
            "expected 2 class probabilities, got {}",
            prediction.probabilities.len()
        ))
    })?;

    Ok(Classification { label, probabilities })
}

/// Classifier backed by the remote scoring service.
///
/// Cloning is cheap; clones share the underlying channel.
#[derive(Clone)]
pub struct RemoteClassifier {
    client: MovieClassifierClient<Channel>,
    service_addr: String,
}

impl RemoteClassifier {
    /// Connect to the scoring service.
    ///
    /// # Arguments
    /// * `addr` - Address of the gRPC service (e.g., "http://localhost:50051")
    pub async fn connect(addr: impl Into<String>) -> Result<Self, ClassifierError> {
        let addr = addr.into();
        info!("Connecting to classifier service at {}", addr);

        let channel = Channel::from_shared(addr.clone())
            .map_err(|e| ClassifierError::ConnectionError(format!("invalid address {}: {}", addr, e)))?
            .connect()
            .await
            .map_err(|e| ClassifierError::ConnectionError(format!("{}: {}", addr, e)))?;

        Ok(RemoteClassifier {
            client: MovieClassifierClient::new(channel),
            service_addr: addr,
        })
    }

    /// Get the address of the service this client is connected to.
    pub fn service_address(&self) -> &str {
        &self.service_addr
    }
}

#[tonic::async_trait]
impl Classifier for RemoteClassifier {
    fn name(&self) -> &str {
        "remote"
    }

    async fn predict(&self, records: &[FeatureRecord]) -> Result<Vec<Label>, ClassifierError> {
        Ok(self.classify(records).await?.into_iter().map(|c| c.label).collect())
    }

    async fn predict_proba(&self, records: &[FeatureRecord]) -> Result<Vec<[f64; 2]>, ClassifierError> {
        Ok(self
            .classify(records)
            .await?
            .into_iter()
            .map(|c| c.probabilities)
            .collect())
    }

    async fn describe(&self) -> Result<ModelDescription, ClassifierError> {
        let mut client = self.client.clone();
        let response = client
            .describe_model(tonic::Request::new(DescribeModelRequest {}))
            .await
            .map_err(|e| {
                error!("gRPC error while describing model: {}", e);
                ClassifierError::ScoringError(e.to_string())
            })?
            .into_inner();

        Ok(ModelDescription {
            model_type: response.model_type,
            feature_names: response.feature_names,
        })
    }

    /// One `Predict` call returns labels and probabilities together.
    async fn classify(&self, records: &[FeatureRecord]) -> Result<Vec<Classification>, ClassifierError> {
        let expected_len = records.len();
        debug!("Scoring {} movies at {}", expected_len, self.service_addr);

        let request = tonic::Request::new(PredictRequest {
            records: records.iter().map(MovieFeatures::from).collect(),
        });

        let mut client = self.client.clone();
        let response = client.predict(request).await.map_err(|e| {
            error!("gRPC error while scoring movies: {}", e);
            ClassifierError::ScoringError(e.to_string())
        })?;

        let predictions = response.into_inner().predictions;

        if predictions.len() != expected_len {
            error!(
                "Mismatch in number of predictions returned: expected {}, got {}",
                expected_len,
                predictions.len()
            );
            return Err(ClassifierError::InvalidResponse(format!(
                "expected {} predictions, got {}",
                expected_len,
                predictions.len()
            )));
        }

        predictions.into_iter().map(to_classification).collect()
    }
}
