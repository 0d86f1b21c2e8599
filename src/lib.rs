//! Mirakurun Prometheus Exporter
//!
//! A Prometheus metrics exporter for the Mirakurun tuner server.
//!
//! # Overview
//!
//! This exporter polls the Mirakurun REST API on every scrape and republishes
//! tuner usage, channel and service inventory, the job queue, process health
//! and stream error counters in the Prometheus text exposition format.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐      HTTP/JSON       ┌──────────────────────┐
//! │  Mirakurun  │ ◄─────────────────►  │       Exporter       │
//! │             │   GET /api/...       │                      │
//! └─────────────┘                      │  ┌────────────────┐  │      HTTP      ┌────────────┐
//!                                      │  │   Collectors   │  │ ◄────────────► │ Prometheus │
//!                                      │  │ (one per kind) │  │   /metrics     └────────────┘
//!                                      │  └────────────────┘  │
//!                                      │  ┌────────────────┐  │
//!                                      │  │   Aggregate    │  │
//!                                      │  └────────────────┘  │
//!                                      └──────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`mirakurun`] - HTTP client and API type definitions
//! - [`collectors`] - Per-resource collectors, collector registry and the scrape dispatcher
//! - [`metrics`] - Metric descriptors, samples and text rendering
//! - [`server`] - HTTP server and scrape handler
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//!
//! # Quick Start
//!
//! ```no_run
//! use mirakurun_exporter::{collectors, config::Config, mirakurun::MirakurunClient, server};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/Default.toml")?;
//!     let client = Arc::new(MirakurunClient::new(&config.mirakurun)?);
//!
//!     let mut registry = collectors::default_registry()?;
//!     registry.apply(&config.collectors)?;
//!
//!     server::start(config, client, registry.snapshot()).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - ✅ Tuner state, users and stream packet/drop counters
//! - ✅ Channel, service and program inventory
//! - ✅ Job queue counts and average duration
//! - ✅ Process memory, stream and error counters
//! - ✅ Per-collector scrape duration and success metrics

pub mod collectors;
pub mod config;
pub mod error;
pub mod metrics;
pub mod mirakurun;
pub mod server;
