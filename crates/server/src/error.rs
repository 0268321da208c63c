use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ml_client::ClassifierError;
use pipeline::FeatureError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Errors surfaced by the prediction API
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No JSON data provided")]
    NoData,

    #[error("Malformed JSON body: {0}")]
    MalformedJson(String),

    #[error("Missing required fields: {0:?}")]
    MissingFields(Vec<String>),

    #[error(transparent)]
    InvalidField(#[from] FeatureError),

    #[error("Prediction failed: {0}")]
    Prediction(#[from] ClassifierError),

    #[error("Classifier does not accept the assembled features: {0}")]
    SchemaMismatch(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NoData
            | ApiError::MalformedJson(_)
            | ApiError::MissingFields(_)
            | ApiError::InvalidField(_) => StatusCode::BAD_REQUEST,
            ApiError::Prediction(_) | ApiError::SchemaMismatch(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Serialize)]
struct ErrBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.status();
        if code.is_server_error() {
            error!("Error during prediction: {}", self);
        }
        (code, Json(ErrBody { error: self.to_string() })).into_response()
    }
}
