//! Metric Descriptors, Samples and Exposition
//!
//! Collectors describe the metric families they can produce with immutable
//! [`Descriptor`] values built once at construction, and emit [`Sample`]s into
//! a [`MetricSink`] while collecting. Nothing here holds values across scrapes.
//!
//! # Rendering
//!
//! Each scrape builds a fresh [`ScrapeRegistry`] from the descriptors of the
//! enabled collectors, feeds it the samples of that scrape and renders the
//! Prometheus text exposition format. The registry is dropped with the
//! request, so no state leaks between scrapes.
//!
//! All metrics use the `mirakurun_` namespace prefix.

use crate::error::{ExporterError, Result};
use prometheus::{CounterVec, Encoder, GaugeVec, Opts, Registry, TextEncoder};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Namespace prefix shared by every metric the exporter produces
pub const NAMESPACE: &str = "mirakurun";

/// Value semantics of a metric family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Gauge,
    Counter,
}

/// Static metadata for one metric family
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Descriptor {
    fq_name: String,
    help: String,
    label_names: Vec<String>,
    kind: MetricKind,
}

impl Descriptor {
    pub fn new(
        subsystem: &str,
        name: &str,
        help: &str,
        label_names: &[&str],
        kind: MetricKind,
    ) -> Arc<Self> {
        Arc::new(Self {
            fq_name: build_fq_name(NAMESPACE, subsystem, name),
            help: help.to_string(),
            label_names: label_names.iter().map(|l| l.to_string()).collect(),
            kind,
        })
    }

    pub fn gauge(subsystem: &str, name: &str, help: &str, label_names: &[&str]) -> Arc<Self> {
        Self::new(subsystem, name, help, label_names, MetricKind::Gauge)
    }

    pub fn counter(subsystem: &str, name: &str, help: &str, label_names: &[&str]) -> Arc<Self> {
        Self::new(subsystem, name, help, label_names, MetricKind::Counter)
    }

    pub fn fq_name(&self) -> &str {
        &self.fq_name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn label_names(&self) -> &[String] {
        &self.label_names
    }

    pub fn kind(&self) -> MetricKind {
        self.kind
    }
}

/// Join the non-empty name components with `_`
pub fn build_fq_name(namespace: &str, subsystem: &str, name: &str) -> String {
    [namespace, subsystem, name]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("_")
}

/// One value emitted for a descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    desc: Arc<Descriptor>,
    value: f64,
    label_values: Vec<String>,
}

impl Sample {
    /// Fails when the number of label values does not match the descriptor
    pub fn new(desc: &Arc<Descriptor>, value: f64, label_values: &[&str]) -> Result<Self> {
        if label_values.len() != desc.label_names.len() {
            return Err(ExporterError::LabelCardinality {
                metric: desc.fq_name.clone(),
                expected: desc.label_names.len(),
                actual: label_values.len(),
            });
        }
        Ok(Self {
            desc: Arc::clone(desc),
            value,
            label_values: label_values.iter().map(|v| v.to_string()).collect(),
        })
    }

    pub fn desc(&self) -> &Descriptor {
        &self.desc
    }

    pub fn fq_name(&self) -> &str {
        &self.desc.fq_name
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn label_values(&self) -> &[String] {
        &self.label_values
    }

    /// Value of the named label, if the descriptor declares it
    pub fn label(&self, name: &str) -> Option<&str> {
        self.desc
            .label_names
            .iter()
            .position(|l| l == name)
            .map(|i| self.label_values[i].as_str())
    }
}

/// Buffer a single collector emits into during one `collect` call
#[derive(Debug, Default)]
pub struct MetricSink {
    samples: Vec<Sample>,
}

impl MetricSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, desc: &Arc<Descriptor>, value: f64, label_values: &[&str]) -> Result<()> {
        self.samples.push(Sample::new(desc, value, label_values)?);
        Ok(())
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }
}

/// Encode a boolean state as 1.0/0.0
pub fn bool_to_f64(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// Convert an upstream millisecond timestamp to seconds
pub fn millis_to_seconds(millis: i64) -> f64 {
    millis as f64 / 1000.0
}

enum Family {
    Gauge(GaugeVec),
    Counter(CounterVec),
}

/// Prometheus registry scoped to a single scrape
pub struct ScrapeRegistry {
    registry: Registry,
    families: HashMap<String, Family>,
}

impl ScrapeRegistry {
    /// Register one metric family per descriptor
    ///
    /// Fails if two descriptors share a name or a descriptor is rejected by
    /// the Prometheus client (invalid name, empty help, bad label name).
    pub fn new<'a, I>(descriptors: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Descriptor>,
    {
        let registry = Registry::new();
        let mut families = HashMap::new();

        for desc in descriptors {
            let opts = Opts::new(desc.fq_name.as_str(), desc.help.as_str());
            let labels: Vec<&str> = desc.label_names.iter().map(String::as_str).collect();
            let family = match desc.kind {
                MetricKind::Gauge => {
                    let vec = GaugeVec::new(opts, &labels)?;
                    registry.register(Box::new(vec.clone()))?;
                    Family::Gauge(vec)
                }
                MetricKind::Counter => {
                    let vec = CounterVec::new(opts, &labels)?;
                    registry.register(Box::new(vec.clone()))?;
                    Family::Counter(vec)
                }
            };
            families.insert(desc.fq_name.clone(), family);
        }

        Ok(Self { registry, families })
    }

    /// Record samples; samples for undescribed families are dropped with a warning
    pub fn observe<'a, I>(&self, samples: I)
    where
        I: IntoIterator<Item = &'a Sample>,
    {
        for sample in samples {
            let Some(family) = self.families.get(sample.fq_name()) else {
                warn!(metric = sample.fq_name(), "Dropping sample for undescribed metric");
                continue;
            };
            let values: Vec<&str> = sample.label_values.iter().map(String::as_str).collect();

            match family {
                Family::Gauge(vec) => match vec.get_metric_with_label_values(&values) {
                    Ok(gauge) => gauge.set(sample.value),
                    Err(e) => warn!(metric = sample.fq_name(), "Dropping sample: {}", e),
                },
                Family::Counter(vec) => {
                    if sample.value.is_nan() || sample.value < 0.0 {
                        warn!(
                            metric = sample.fq_name(),
                            value = sample.value,
                            "Dropping negative counter sample"
                        );
                        continue;
                    }
                    match vec.get_metric_with_label_values(&values) {
                        Ok(counter) => counter.inc_by(sample.value),
                        Err(e) => warn!(metric = sample.fq_name(), "Dropping sample: {}", e),
                    }
                }
            }
        }
    }

    /// Render metrics in Prometheus text format
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| ExporterError::Server(e.to_string()))
    }
}
