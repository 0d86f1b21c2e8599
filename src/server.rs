//! HTTP Server and Scrape Handler
//!
//! This module implements the Prometheus exporter HTTP server.
//!
//! # Architecture
//!
//! - **HTTP Server**: Axum-based server exposing `/metrics`, `/health`, and `/` endpoints
//! - **Scrape on request**: every `/metrics` request builds its own
//!   [`AggregateCollector`] and [`ScrapeRegistry`]; nothing is cached between scrapes
//! - **State Management**: the Mirakurun client and the enabled collector set are
//!   shared read-only through `Arc`
//!
//! # Endpoints
//!
//! - `GET /` - HTML landing page with links to metrics and health
//! - `GET /metrics` - Prometheus metrics in text format
//! - `GET /health` - Always `200 {}`
//!
//! # Error Handling
//!
//! Collector failures never fail the request; they show up as
//! `mirakurun_scrape_collector_success{collector="..."} 0`. Only a failure to set
//! up or render the scrape registry returns a 500.

use crate::collectors::{AggregateCollector, EnabledCollectors};
use crate::config::Config;
use crate::error::Result;
use crate::metrics::ScrapeRegistry;
use crate::mirakurun::MirakurunApi;
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Header Prometheus uses to announce its scrape timeout
pub const SCRAPE_TIMEOUT_HEADER: &str = "X-Prometheus-Scrape-Timeout-Seconds";

#[derive(Clone)]
pub struct AppState {
    client: Arc<dyn MirakurunApi>,
    collectors: Arc<EnabledCollectors>,
    timeout_offset: Duration,
}

impl AppState {
    pub fn new(
        client: Arc<dyn MirakurunApi>,
        collectors: EnabledCollectors,
        timeout_offset_seconds: f64,
    ) -> Self {
        Self {
            client,
            collectors: Arc::new(collectors),
            timeout_offset: Duration::try_from_secs_f64(timeout_offset_seconds).unwrap_or_default(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

pub async fn start(
    config: Config,
    client: Arc<dyn MirakurunApi>,
    collectors: EnabledCollectors,
) -> anyhow::Result<()> {
    let state = AppState::new(client, collectors, config.server.timeout_offset_seconds);
    let app = router(state);

    let addr = format!("{}:{}", config.server.addr, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Metrics server listening on {}", addr);
    info!("Metrics available at http://{}/metrics", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Run one full scrape and render it in text exposition format
pub async fn scrape(state: &AppState, timeout: Option<Duration>) -> Result<String> {
    let aggregate =
        AggregateCollector::new(&state.collectors, Arc::clone(&state.client)).with_timeout(timeout);
    let registry = ScrapeRegistry::new(aggregate.describe())?;

    let samples = aggregate.collect().await;
    registry.observe(&samples);
    registry.render()
}

/// Per-collector deadline derived from the Prometheus scrape timeout header
///
/// The offset is subtracted so the response is written before Prometheus
/// gives up; if that would leave nothing, the header value is used as is.
pub fn scrape_timeout(headers: &HeaderMap, offset: Duration) -> Option<Duration> {
    let seconds: f64 = headers
        .get(SCRAPE_TIMEOUT_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()?;
    let timeout = Duration::try_from_secs_f64(seconds).ok()?;
    if timeout.is_zero() {
        return None;
    }

    Some(
        timeout
            .checked_sub(offset)
            .filter(|t| !t.is_zero())
            .unwrap_or(timeout),
    )
}

async fn root_handler() -> impl IntoResponse {
    Html(
        r#"<html>
<head><title>Mirakurun Exporter</title></head>
<body>
<h1>Mirakurun Prometheus Exporter</h1>
<p><a href="/metrics">Metrics</a></p>
<p><a href="/health">Health</a></p>
</body>
</html>"#,
    )
}

async fn metrics_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let timeout = scrape_timeout(&headers, state.timeout_offset);
    debug!(timeout = ?timeout, "metrics request");

    match scrape(&state, timeout).await {
        Ok(body) => ([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body).into_response(),
        Err(e) => {
            error!("Failed to create collector: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("failed to create collector: {}", e),
            )
                .into_response()
        }
    }
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({})))
}
