//! Version Metrics Collector
//!
//! Disabled by default.
//!
//! # Metrics Produced
//! - `mirakurun_version_mirakurun_version` - Installed and latest version (value is always 1)
//!   - Labels: current, latest

use super::Collector;
use crate::error::Result;
use crate::metrics::{Descriptor, MetricSink};
use crate::mirakurun::MirakurunApi;
use async_trait::async_trait;
use std::sync::Arc;

const SUBSYSTEM: &str = "version";

pub struct VersionCollector {
    client: Arc<dyn MirakurunApi>,
    version: Arc<Descriptor>,
}

impl VersionCollector {
    pub fn new(client: Arc<dyn MirakurunApi>) -> Self {
        Self {
            client,
            version: Descriptor::gauge(
                SUBSYSTEM,
                "mirakurun_version",
                "Mirakurun version",
                &["current", "latest"],
            ),
        }
    }
}

pub fn new_collector(client: Arc<dyn MirakurunApi>) -> Arc<dyn Collector> {
    Arc::new(VersionCollector::new(client))
}

#[async_trait]
impl Collector for VersionCollector {
    fn describe(&self) -> Vec<&Descriptor> {
        vec![&*self.version]
    }

    async fn collect(&self, sink: &mut MetricSink) -> Result<()> {
        let version = self.client.get_version().await?;

        sink.emit(
            &self.version,
            1.0,
            &[version.current.as_str(), version.latest.as_str()],
        )
    }
}
