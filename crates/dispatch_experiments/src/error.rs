use std::path::PathBuf;

use dispatch_core::error::ConfigurationError;
use thiserror::Error;

/// Failures while reading scenario inputs from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("malformed travel-time matrix in {path}: {reason}")]
    MalformedMatrix { path: PathBuf, reason: String },
    #[error("failed to parse experiment config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("invalid scenario: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("export failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("json export failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("experiment config has no arrivals: set `arrivals` or `synthetic`")]
    NoArrivals,
}
