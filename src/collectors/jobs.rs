//! Job Metrics Collector
//!
//! Aggregates the upstream job queue into counts.
//!
//! # Metrics Produced
//! - `mirakurun_jobs_count` - Count of jobs
//!   - Labels: status
//! - `mirakurun_jobs_retry_count` - Sum of retries over all jobs
//! - `mirakurun_jobs_abort_count` - Jobs currently aborting
//! - `mirakurun_jobs_skipped_count` - Jobs that were skipped
//! - `mirakurun_jobs_failed_count` - Jobs that failed
//! - `mirakurun_jobs_duration_avg` - Average duration of finished, non-skipped jobs

use super::Collector;
use crate::error::Result;
use crate::metrics::{Descriptor, MetricSink};
use crate::mirakurun::types::Job;
use crate::mirakurun::MirakurunApi;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

const SUBSYSTEM: &str = "jobs";
const STATUS_FINISHED: &str = "finished";

/// Aggregated view of one jobs snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobSummary {
    pub by_status: BTreeMap<String, u64>,
    pub retry_count: u64,
    pub abort_count: u64,
    pub skipped_count: u64,
    pub failed_count: u64,
    /// Mean duration of finished jobs that were not skipped; 0 when there are none
    pub duration_avg: f64,
}

impl JobSummary {
    pub fn from_jobs(jobs: &[Job]) -> Self {
        let mut summary = JobSummary::default();
        let mut duration_sum: i64 = 0;
        let mut finished: u64 = 0;

        for job in jobs {
            *summary.by_status.entry(job.status.clone()).or_insert(0) += 1;
            summary.retry_count += job.retry_count;
            if job.is_aborting {
                summary.abort_count += 1;
            }
            if job.has_skipped {
                summary.skipped_count += 1;
            }
            if job.has_failed {
                summary.failed_count += 1;
            }
            if job.status == STATUS_FINISHED && !job.has_skipped {
                duration_sum += job.duration;
                finished += 1;
            }
        }

        if finished > 0 {
            summary.duration_avg = duration_sum as f64 / finished as f64;
        }
        summary
    }
}

pub struct JobsCollector {
    client: Arc<dyn MirakurunApi>,
    count: Arc<Descriptor>,
    retry_count: Arc<Descriptor>,
    abort_count: Arc<Descriptor>,
    skipped_count: Arc<Descriptor>,
    failed_count: Arc<Descriptor>,
    duration_avg: Arc<Descriptor>,
}

impl JobsCollector {
    pub fn new(client: Arc<dyn MirakurunApi>) -> Self {
        Self {
            client,
            count: Descriptor::gauge(SUBSYSTEM, "count", "Count of jobs", &["status"]),
            retry_count: Descriptor::gauge(SUBSYSTEM, "retry_count", "Count of retried jobs", &[]),
            abort_count: Descriptor::gauge(SUBSYSTEM, "abort_count", "Count of aborted jobs", &[]),
            skipped_count: Descriptor::gauge(
                SUBSYSTEM,
                "skipped_count",
                "Count of skipped jobs",
                &[],
            ),
            failed_count: Descriptor::gauge(SUBSYSTEM, "failed_count", "Count of failed jobs", &[]),
            duration_avg: Descriptor::gauge(
                SUBSYSTEM,
                "duration_avg",
                "Average duration of jobs",
                &[],
            ),
        }
    }
}

pub fn new_collector(client: Arc<dyn MirakurunApi>) -> Arc<dyn Collector> {
    Arc::new(JobsCollector::new(client))
}

#[async_trait]
impl Collector for JobsCollector {
    fn describe(&self) -> Vec<&Descriptor> {
        vec![
            &*self.count,
            &*self.retry_count,
            &*self.abort_count,
            &*self.skipped_count,
            &*self.failed_count,
            &*self.duration_avg,
        ]
    }

    async fn collect(&self, sink: &mut MetricSink) -> Result<()> {
        let jobs = self.client.get_jobs().await?;
        let summary = JobSummary::from_jobs(&jobs);

        for (status, count) in &summary.by_status {
            sink.emit(&self.count, *count as f64, &[status.as_str()])?;
        }
        sink.emit(&self.retry_count, summary.retry_count as f64, &[])?;
        sink.emit(&self.abort_count, summary.abort_count as f64, &[])?;
        sink.emit(&self.skipped_count, summary.skipped_count as f64, &[])?;
        sink.emit(&self.failed_count, summary.failed_count as f64, &[])?;
        sink.emit(&self.duration_avg, summary.duration_avg, &[])?;
        Ok(())
    }
}
