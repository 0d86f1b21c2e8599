//! Metrics Collectors
//!
//! This module contains one collector per Mirakurun resource kind. Each collector
//! fetches exactly one resource snapshot per scrape and turns it into samples.
//!
//! # Architecture
//!
//! Collectors follow a consistent pattern:
//! - Build their [`Descriptor`](crate::metrics::Descriptor)s once, in `new`
//! - `describe` lists every descriptor the collector can emit, without I/O
//! - `collect` fetches the snapshot first and only then emits, so a failed
//!   fetch leaves the sink untouched
//!
//! # Error Handling
//!
//! A failed fetch is returned to the caller; the
//! [`AggregateCollector`](aggregate::AggregateCollector) turns it into
//! `mirakurun_scrape_collector_success{collector="..."} 0` without affecting
//! the other collectors. Missing nested data inside a successful response is
//! logged as a warning and reported as zero/empty instead.

use crate::error::Result;
use crate::metrics::{Descriptor, MetricSink};
use crate::mirakurun::MirakurunApi;
use async_trait::async_trait;
use std::sync::Arc;

/// Contract every resource collector implements
#[async_trait]
pub trait Collector: Send + Sync {
    /// Every descriptor `collect` may emit samples for
    ///
    /// Must not touch the network and must return the same set on every call.
    fn describe(&self) -> Vec<&Descriptor>;

    /// Fetch one snapshot and emit its samples into `sink`
    async fn collect(&self, sink: &mut MetricSink) -> Result<()>;
}

/// Builds a collector bound to the shared Mirakurun client
pub type CollectorFactory = fn(Arc<dyn MirakurunApi>) -> Arc<dyn Collector>;

pub const DEFAULT_ENABLED: bool = true;
pub const DEFAULT_DISABLED: bool = false;

// Collector modules
pub mod aggregate;
pub mod channel;
pub mod jobs;
pub mod programs;
pub mod registry;
pub mod service;
pub mod status;
pub mod tuners;
pub mod version;

pub use aggregate::{AggregateCollector, CollectorOutcome};
pub use registry::{CollectorRegistry, EnabledCollectors, Registration, SCRAPE_COLLECTOR};

/// Registry with every built-in collector at its compiled-in default
pub fn default_registry() -> Result<CollectorRegistry> {
    let mut registry = CollectorRegistry::new();
    registry
        .register("channel", DEFAULT_ENABLED, channel::new_collector)?
        .register("service", DEFAULT_ENABLED, service::new_collector)?
        .register("programs", DEFAULT_ENABLED, programs::new_collector)?
        .register("jobs", DEFAULT_ENABLED, jobs::new_collector)?
        .register("tuners", DEFAULT_ENABLED, tuners::new_collector)?
        .register("status", DEFAULT_ENABLED, status::new_collector)?
        .register("version", DEFAULT_DISABLED, version::new_collector)?;
    Ok(registry)
}
