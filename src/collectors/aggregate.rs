//! Aggregate Collector
//!
//! Built fresh for every scrape from the [`EnabledCollectors`] snapshot. A scrape
//! goes through these steps:
//!
//! 1. **Build** one collector per enabled registration
//! 2. **Dispatch** one tokio task per collector, each timing its own `collect`
//! 3. **Await** every task; a failing collector never cancels its siblings
//! 4. **Emit** the collected samples plus, when the `scrape` pseudo-collector
//!    is enabled, `mirakurun_scrape_collector_duration_seconds` and
//!    `mirakurun_scrape_collector_success` for every collector
//!
//! Collector errors are absorbed here: [`AggregateCollector::collect`] cannot
//! fail. The tasks live in a [`JoinSet`], so dropping the scrape future (the
//! HTTP client went away) aborts every collector still in flight.

use super::{Collector, EnabledCollectors};
use crate::error::{ExporterError, Result};
use crate::metrics::{Descriptor, MetricSink, Sample};
use crate::mirakurun::MirakurunApi;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

/// Result of running one collector during a scrape
#[derive(Debug)]
pub struct CollectorOutcome {
    pub name: &'static str,
    pub duration: Duration,
    pub result: Result<Vec<Sample>>,
}

impl CollectorOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

pub struct AggregateCollector {
    collectors: Vec<(&'static str, Arc<dyn Collector>)>,
    scrape_metrics: bool,
    timeout: Option<Duration>,
    scrape_duration: Arc<Descriptor>,
    scrape_success: Arc<Descriptor>,
}

impl AggregateCollector {
    pub fn new(enabled: &EnabledCollectors, client: Arc<dyn MirakurunApi>) -> Self {
        let collectors = enabled
            .collectors()
            .iter()
            .map(|r| (r.name, (r.factory)(Arc::clone(&client))))
            .collect();
        Self::from_collectors(collectors, enabled.scrape_metrics())
    }

    /// Build from already constructed collectors
    pub fn from_collectors(
        collectors: Vec<(&'static str, Arc<dyn Collector>)>,
        scrape_metrics: bool,
    ) -> Self {
        Self {
            collectors,
            scrape_metrics,
            timeout: None,
            scrape_duration: Descriptor::gauge(
                "scrape",
                "collector_duration_seconds",
                "mirakurun_exporter: Duration of a collector scrape",
                &["collector"],
            ),
            scrape_success: Descriptor::gauge(
                "scrape",
                "collector_success",
                "mirakurun_exporter: Whether a collector succeeded",
                &["collector"],
            ),
        }
    }

    /// Bound every collector's `collect` call; `None` relies on the client timeout
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.collectors.iter().map(|(name, _)| *name).collect()
    }

    pub fn describe(&self) -> Vec<&Descriptor> {
        let mut descs: Vec<&Descriptor> = self
            .collectors
            .iter()
            .flat_map(|(_, c)| c.describe())
            .collect();
        if self.scrape_metrics {
            descs.push(&self.scrape_duration);
            descs.push(&self.scrape_success);
        }
        descs
    }

    /// Run every collector concurrently and wait for all of them
    ///
    /// Returns one outcome per collector, in completion order.
    pub async fn dispatch(&self) -> Vec<CollectorOutcome> {
        let dispatched = Instant::now();
        let mut tasks = JoinSet::new();
        let mut pending = Vec::with_capacity(self.collectors.len());

        for (name, collector) in &self.collectors {
            pending.push(*name);
            tasks.spawn(execute_collect(*name, Arc::clone(collector), self.timeout));
        }

        let mut outcomes = Vec::with_capacity(self.collectors.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => {
                    pending.retain(|name| *name != outcome.name);
                    outcomes.push(outcome);
                }
                Err(e) => warn!("Collector task did not complete: {}", e),
            }
        }

        // Tasks that panicked never reported back
        for name in pending {
            outcomes.push(CollectorOutcome {
                name,
                duration: dispatched.elapsed(),
                result: Err(ExporterError::CollectorPanicked(name.to_string())),
            });
        }

        outcomes
    }

    /// Samples of every successful collector plus the scrape metrics
    pub async fn collect(&self) -> Vec<Sample> {
        let outcomes = self.dispatch().await;
        let mut sink = MetricSink::new();
        let mut samples = Vec::new();

        for outcome in outcomes {
            let seconds = outcome.duration.as_secs_f64();
            let success = match outcome.result {
                Ok(collected) => {
                    debug!(
                        collector = outcome.name,
                        duration_seconds = seconds,
                        "collector succeeded"
                    );
                    samples.extend(collected);
                    1.0
                }
                Err(e) => {
                    error!(
                        collector = outcome.name,
                        duration_seconds = seconds,
                        error = %e,
                        "collector failed"
                    );
                    0.0
                }
            };

            if self.scrape_metrics {
                if let Err(e) = self.emit_scrape_metrics(&mut sink, outcome.name, seconds, success) {
                    error!(collector = outcome.name, "Failed to record scrape metrics: {}", e);
                }
            }
        }

        samples.extend(sink.into_samples());
        samples
    }

    fn emit_scrape_metrics(
        &self,
        sink: &mut MetricSink,
        name: &str,
        seconds: f64,
        success: f64,
    ) -> Result<()> {
        sink.emit(&self.scrape_duration, seconds, &[name])?;
        sink.emit(&self.scrape_success, success, &[name])
    }
}

async fn execute_collect(
    name: &'static str,
    collector: Arc<dyn Collector>,
    timeout: Option<Duration>,
) -> CollectorOutcome {
    let begin = Instant::now();
    let mut sink = MetricSink::new();

    let result = match timeout {
        Some(limit) => match tokio::time::timeout(limit, collector.collect(&mut sink)).await {
            Ok(result) => result,
            Err(_) => Err(ExporterError::Timeout(limit)),
        },
        None => collector.collect(&mut sink).await,
    };

    CollectorOutcome {
        name,
        duration: begin.elapsed(),
        result: result.map(|()| sink.into_samples()),
    }
}
