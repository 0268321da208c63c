//! HTTP routes.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{Method, header},
    routing::{get, post},
};
use chrono::Local;
use serde::Serialize;
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};

use pipeline::{FEATURE_COLUMNS, MovieRequest};

use crate::error::ApiError;
use crate::predictor::{MoviePrediction, PredictionService};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_loaded: bool,
    pub classifier: String,
    pub director_success_rates_loaded: bool,
    pub actor_success_rates_loaded: bool,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct ModelInfoResponse {
    pub model_type: String,
    pub feature_columns: Vec<&'static str>,
    pub director_count: usize,
    pub actor1_count: usize,
    pub actor2_count: usize,
    pub actor3_count: usize,
    pub model_loaded_at: String,
}

/// Build the application router
pub fn router(service: PredictionService) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/predict", post(predict))
        .route("/model-info", get(model_info))
        .layer(cors_layer())
        .with_state(service)
}

/// Any origin, the methods the API uses, JSON bodies
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

async fn health(State(service): State<PredictionService>) -> Json<HealthResponse> {
    let tables = service.tables();
    Json(HealthResponse {
        status: "healthy",
        model_loaded: true,
        classifier: service.classifier_name().to_string(),
        director_success_rates_loaded: tables.director_loaded(),
        actor_success_rates_loaded: tables.actors_loaded(),
        timestamp: Local::now().to_rfc3339(),
    })
}

/// The body is parsed by hand so an empty or non-object body gets the API's
/// own error rather than the extractor's rejection.
async fn predict(
    State(service): State<PredictionService>,
    body: Bytes,
) -> Result<Json<MoviePrediction>, ApiError> {
    let request = parse_request(&body)?;
    let prediction = service.predict(&request).await?;
    Ok(Json(prediction))
}

fn parse_request(body: &[u8]) -> Result<MovieRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::NoData);
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(Value::Null) => Err(ApiError::NoData),
        Ok(other) => Err(ApiError::MalformedJson(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(ApiError::MalformedJson(e.to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

async fn model_info(State(service): State<PredictionService>) -> Json<ModelInfoResponse> {
    let (director_count, actor1_count, actor2_count, actor3_count) = service.tables().counts();
    Json(ModelInfoResponse {
        model_type: service.model().model_type.clone(),
        feature_columns: FEATURE_COLUMNS.to_vec(),
        director_count,
        actor1_count,
        actor2_count,
        actor3_count,
        model_loaded_at: service.loaded_at().to_rfc3339(),
    })
}
