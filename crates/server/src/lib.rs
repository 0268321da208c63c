//! Server crate for the HIT/FLOP movie success predictor.
//!
//! This crate contains the prediction service that ties the success-rate
//! tables, feature assembly and the classifier together, and the HTTP API
//! in front of it.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use data_loader::SuccessRateTables;

pub mod config;
pub mod error;
pub mod factors;
pub mod predictor;
pub mod routes;

pub use config::{ClassifierSource, ServerConfig};
pub use error::ApiError;
pub use factors::key_factors;
pub use predictor::{MoviePrediction, PredictionService, REQUIRED_FIELDS};
pub use routes::router;

/// Load the tables and classifier named by the config
pub async fn build_service(config: &ServerConfig) -> Result<PredictionService> {
    let dir = config.artifacts_dir.clone();
    let tables = tokio::task::spawn_blocking(move || SuccessRateTables::load_from_dir(&dir))
        .await
        .context("Table loading task panicked")?
        .with_context(|| {
            format!("Failed to load success rates from {}", config.artifacts_dir.display())
        })?;

    let source = config.classifier_source();
    let classifier = source
        .open()
        .await
        .with_context(|| format!("Failed to load classifier from {:?}", source))?;

    PredictionService::new(Arc::new(tables), classifier)
        .await
        .context("Failed to start prediction service")
}

/// Run the HTTP server until ctrl-c
pub async fn serve(config: ServerConfig) -> Result<()> {
    let service = build_service(&config).await?;
    let app = router(service);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!("Listening on http://{}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await
        .context("Server error")
}
