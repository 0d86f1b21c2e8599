//! Mirakurun REST API Client
//!
//! This module provides a client for the Mirakurun HTTP API. Every resource is
//! fetched with a single `GET /api/<resource>` and decoded from JSON.
//!
//! # Architecture
//!
//! - **Transport**: one shared `reqwest::Client` (connection pool), safe to use
//!   from many concurrent collector tasks
//! - **Timeouts**: every request is bounded by `request_timeout_seconds`
//! - **Errors**: transport failures, non-200 responses and decode failures all
//!   surface as [`ExporterError`]; callers do not distinguish between them
//!
//! # Example
//!
//! ```no_run
//! use mirakurun_exporter::config::MirakurunConfig;
//! use mirakurun_exporter::mirakurun::{MirakurunApi, MirakurunClient};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = MirakurunConfig {
//!     url: "http://localhost:40772".to_string(),
//!     request_timeout_seconds: 5,
//! };
//!
//! let client = MirakurunClient::new(&config)?;
//! let tuners = client.get_tuners().await?;
//! # Ok(())
//! # }
//! ```

use crate::config::MirakurunConfig;
use crate::error::{ExporterError, Result};
use crate::mirakurun::types::*;
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::debug;

/// Read access to the Mirakurun resources the collectors need
///
/// Collectors hold an `Arc<dyn MirakurunApi>` so the HTTP client can be
/// swapped for an in-memory implementation in tests.
#[async_trait]
pub trait MirakurunApi: Send + Sync {
    async fn get_channels(&self) -> Result<Vec<Channel>>;
    async fn get_services(&self) -> Result<Vec<Service>>;
    async fn get_programs(&self) -> Result<Vec<Program>>;
    async fn get_jobs(&self) -> Result<Vec<Job>>;
    async fn get_tuners(&self) -> Result<Vec<Tuner>>;
    async fn get_status(&self) -> Result<Status>;
    async fn get_version(&self) -> Result<Version>;
}

/// HTTP client for the Mirakurun API
///
/// # Thread Safety
///
/// This client is `Send` and `Sync` and holds no per-scrape state, so one
/// instance is shared by every scrape for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct MirakurunClient {
    base_url: Url,
    http: reqwest::Client,
}

impl MirakurunClient {
    /// Build a client for the configured Mirakurun instance
    ///
    /// Fails if the URL is empty or not absolute, or if the underlying HTTP
    /// client cannot be constructed.
    pub fn new(config: &MirakurunConfig) -> Result<Self> {
        let raw = config.url.trim();
        if raw.is_empty() {
            return Err(ExporterError::Config("mirakurun url is empty".to_string()));
        }

        let base_url = Url::parse(raw)
            .map_err(|e| ExporterError::Config(format!("mirakurun url is invalid: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ExporterError::Config(format!(
                "mirakurun url is invalid: {}",
                raw
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    async fn get<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let begin = Instant::now();
        let response = self.http.get(self.endpoint(path)).send().await?;
        debug!(
            method = "GET",
            path,
            duration_seconds = begin.elapsed().as_secs_f64(),
            "mirakurun request"
        );

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ExporterError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl MirakurunApi for MirakurunClient {
    async fn get_channels(&self) -> Result<Vec<Channel>> {
        self.get("/api/channels").await
    }

    async fn get_services(&self) -> Result<Vec<Service>> {
        self.get("/api/services").await
    }

    async fn get_programs(&self) -> Result<Vec<Program>> {
        self.get("/api/programs").await
    }

    async fn get_jobs(&self) -> Result<Vec<Job>> {
        self.get("/api/jobs").await
    }

    async fn get_tuners(&self) -> Result<Vec<Tuner>> {
        self.get("/api/tuners").await
    }

    async fn get_status(&self) -> Result<Status> {
        self.get("/api/status").await
    }

    async fn get_version(&self) -> Result<Version> {
        self.get("/api/version").await
    }
}
