//! Server configuration.
//!
//! Every option can come from the command line or a `HITFLOP_*` variable.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use ml_client::{Classifier, ClassifierError, LinearClassifier, RemoteClassifier};

/// File name of the in-process model inside the artifacts directory
pub const DEFAULT_MODEL_FILE: &str = "model.json";

/// HIT/FLOP prediction server
#[derive(Debug, Clone, Parser)]
#[command(name = "hitflop-server")]
#[command(about = "HTTP service predicting whether a movie will be a hit", long_about = None)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "HITFLOP_BIND", default_value = "0.0.0.0:5000")]
    pub bind: SocketAddr,

    /// Directory holding the success-rate tables and model artifact
    #[arg(long, env = "HITFLOP_ARTIFACTS_DIR", default_value = "artifacts")]
    pub artifacts_dir: PathBuf,

    /// Score with a remote gRPC classifier (e.g. http://localhost:50051)
    #[arg(long, env = "HITFLOP_ML_SERVICE", conflicts_with = "model")]
    pub ml_service: Option<String>,

    /// Linear model artifact [default: <artifacts-dir>/model.json]
    #[arg(long, env = "HITFLOP_MODEL")]
    pub model: Option<PathBuf>,
}

impl ServerConfig {
    /// Config for a directory with every other option at its default
    pub fn with_artifacts_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 5000)),
            artifacts_dir: dir.into(),
            ml_service: None,
            model: None,
        }
    }

    pub fn classifier_source(&self) -> ClassifierSource {
        match &self.ml_service {
            Some(addr) => ClassifierSource::Remote(addr.clone()),
            None => ClassifierSource::Linear(
                self.model
                    .clone()
                    .unwrap_or_else(|| self.artifacts_dir.join(DEFAULT_MODEL_FILE)),
            ),
        }
    }
}

/// Where the classifier comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifierSource {
    /// gRPC scoring service address
    Remote(String),
    /// JSON model artifact
    Linear(PathBuf),
}

impl ClassifierSource {
    pub async fn open(&self) -> Result<Arc<dyn Classifier>, ClassifierError> {
        Ok(match self {
            ClassifierSource::Remote(addr) => Arc::new(RemoteClassifier::connect(addr.clone()).await?),
            ClassifierSource::Linear(path) => Arc::new(LinearClassifier::load(path)?),
        })
    }
}
