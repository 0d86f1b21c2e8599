use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("Mirakurun API error: {0}")]
    MirakurunApi(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Mirakurun request {path} failed with status code: {status}")]
    Status { path: String, status: u16 },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Collector already registered: {0}")]
    DuplicateCollector(String),

    #[error("Unknown collector: {0}")]
    UnknownCollector(String),

    #[error("Metric {metric} expects {expected} label values, got {actual}")]
    LabelCardinality {
        metric: String,
        expected: usize,
        actual: usize,
    },

    #[error("Collector timed out after {0:?}")]
    Timeout(Duration),

    #[error("Collector {0} panicked")]
    CollectorPanicked(String),

    #[error("Prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),

    #[error("HTTP server error: {0}")]
    Server(String),
}

pub type Result<T> = std::result::Result<T, ExporterError>;
