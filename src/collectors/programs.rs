//! Program Metrics Collector
//!
//! # Metrics Produced
//! - `mirakurun_programs_count` - Count of programs by service
//!   - Labels: service_id

use super::Collector;
use crate::error::Result;
use crate::metrics::{Descriptor, MetricSink};
use crate::mirakurun::MirakurunApi;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

const SUBSYSTEM: &str = "programs";

pub struct ProgramsCollector {
    client: Arc<dyn MirakurunApi>,
    count: Arc<Descriptor>,
}

impl ProgramsCollector {
    pub fn new(client: Arc<dyn MirakurunApi>) -> Self {
        Self {
            client,
            count: Descriptor::gauge(
                SUBSYSTEM,
                "count",
                "Count of programs by service",
                &["service_id"],
            ),
        }
    }
}

pub fn new_collector(client: Arc<dyn MirakurunApi>) -> Arc<dyn Collector> {
    Arc::new(ProgramsCollector::new(client))
}

#[async_trait]
impl Collector for ProgramsCollector {
    fn describe(&self) -> Vec<&Descriptor> {
        vec![&*self.count]
    }

    async fn collect(&self, sink: &mut MetricSink) -> Result<()> {
        let programs = self.client.get_programs().await?;

        let mut per_service: BTreeMap<i64, u64> = BTreeMap::new();
        for program in &programs {
            *per_service.entry(program.service_id).or_insert(0) += 1;
        }

        for (service_id, count) in per_service {
            sink.emit(
                &self.count,
                count as f64,
                &[service_id.to_string().as_str()],
            )?;
        }
        Ok(())
    }
}
