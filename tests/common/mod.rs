//! Shared test helpers: an in-memory Mirakurun API and sample lookups.

#![allow(dead_code)]

use async_trait::async_trait;
use mirakurun_exporter::error::{ExporterError, Result};
use mirakurun_exporter::metrics::Sample;
use mirakurun_exporter::mirakurun::types::*;
use mirakurun_exporter::mirakurun::MirakurunApi;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// In-memory Mirakurun; a resource left as `None` fails like an unreachable server
#[derive(Debug, Clone, Default)]
pub struct StubMirakurun {
    pub channels: Option<Vec<Channel>>,
    pub services: Option<Vec<Service>>,
    pub programs: Option<Vec<Program>>,
    pub jobs: Option<Vec<Job>>,
    pub tuners: Option<Vec<Tuner>>,
    pub status: Option<Status>,
    pub version: Option<Version>,
    /// Artificial latency per resource kind ("jobs", "tuners", ...)
    pub delays: HashMap<&'static str, Duration>,
    /// Resource kind whose fetch panics
    pub panic_on: Option<&'static str>,
    /// Fetches that ran to completion, shared by every clone of the stub
    pub completed: Arc<AtomicUsize>,
}

impl StubMirakurun {
    /// Every resource available with small, valid payloads
    pub fn healthy() -> Self {
        Self {
            channels: Some(vec![Channel {
                channel_type: "GR".to_string(),
                channel: "27".to_string(),
                name: "NHK".to_string(),
                ..Default::default()
            }]),
            services: Some(vec![service(3273601024, 1024, 1_600_000_000_000)]),
            programs: Some(vec![program(1024), program(1024), program(1025)]),
            jobs: Some(scenario_a_jobs()),
            tuners: Some(vec![scenario_b_tuner()]),
            status: Some(Status {
                version: "3.9.0".to_string(),
                ..Default::default()
            }),
            version: Some(Version {
                current: "3.9.0".to_string(),
                latest: "4.0.0".to_string(),
            }),
            delays: HashMap::new(),
            panic_on: None,
            completed: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Delay every resource kind by `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        for kind in ["channel", "service", "programs", "jobs", "tuners", "status", "version"] {
            self.delays.insert(kind, delay);
        }
        self
    }

    pub fn into_api(self) -> Arc<dyn MirakurunApi> {
        Arc::new(self)
    }

    async fn respond<T: Clone>(&self, kind: &'static str, value: &Option<T>) -> Result<T> {
        if let Some(delay) = self.delays.get(kind) {
            tokio::time::sleep(*delay).await;
        }
        if self.panic_on == Some(kind) {
            panic!("stub panic while fetching {}", kind);
        }
        self.completed.fetch_add(1, Ordering::SeqCst);
        value
            .clone()
            .ok_or_else(|| ExporterError::MirakurunApi(format!("{} unavailable", kind)))
    }
}

#[async_trait]
impl MirakurunApi for StubMirakurun {
    async fn get_channels(&self) -> Result<Vec<Channel>> {
        self.respond("channel", &self.channels).await
    }

    async fn get_services(&self) -> Result<Vec<Service>> {
        self.respond("service", &self.services).await
    }

    async fn get_programs(&self) -> Result<Vec<Program>> {
        self.respond("programs", &self.programs).await
    }

    async fn get_jobs(&self) -> Result<Vec<Job>> {
        self.respond("jobs", &self.jobs).await
    }

    async fn get_tuners(&self) -> Result<Vec<Tuner>> {
        self.respond("tuners", &self.tuners).await
    }

    async fn get_status(&self) -> Result<Status> {
        self.respond("status", &self.status).await
    }

    async fn get_version(&self) -> Result<Version> {
        self.respond("version", &self.version).await
    }
}

pub fn job(status: &str, retry_count: u64, duration: i64) -> Job {
    Job {
        status: status.to_string(),
        retry_count,
        duration,
        ..Default::default()
    }
}

/// {finished, retry=0, 150}, {running, retry=1}, {finished, aborting, skipped, failed, retry=2, 200}
pub fn scenario_a_jobs() -> Vec<Job> {
    vec![
        job("finished", 0, 150),
        job("running", 1, 50),
        Job {
            is_aborting: true,
            has_skipped: true,
            has_failed: true,
            ..job("finished", 2, 200)
        },
    ]
}

pub fn stream(packet: u64, drop: u64) -> TunerStreamInfo {
    TunerStreamInfo { packet, drop }
}

pub fn user(id: &str, agent: &str, streams: Option<Vec<(u32, TunerStreamInfo)>>) -> TunerUser {
    TunerUser {
        id: id.to_string(),
        agent: agent.to_string(),
        stream_info: streams.map(|s| s.into_iter().collect::<BTreeMap<_, _>>()),
        ..Default::default()
    }
}

/// One tuner with two users; user1 streams {1000/10, 2000/20}
pub fn scenario_b_tuner() -> Tuner {
    Tuner {
        index: 1,
        name: "Tuner1".to_string(),
        types: vec!["GR".to_string(), "BS".to_string()],
        is_available: true,
        is_free: false,
        is_using: true,
        users: vec![
            user(
                "user1",
                "Chinachu",
                Some(vec![(0, stream(1000, 10)), (16, stream(2000, 20))]),
            ),
            user("user2", "EPGStation", Some(vec![(0, stream(500, 5))])),
        ],
        ..Default::default()
    }
}

pub fn service(id: i64, service_id: i64, epg_updated_at: i64) -> Service {
    Service {
        id,
        service_id,
        network_id: 32736,
        name: "NHK総合".to_string(),
        service_type: 1,
        epg_updated_at,
        channel: Some(ServiceChannel {
            channel_type: "GR".to_string(),
            channel: "27".to_string(),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn program(service_id: i64) -> Program {
    Program {
        service_id,
        ..Default::default()
    }
}

/// Every sample of the given metric family
pub fn find<'a>(samples: &'a [Sample], fq_name: &str) -> Vec<&'a Sample> {
    samples.iter().filter(|s| s.fq_name() == fq_name).collect()
}

/// Value of the sample of `fq_name` whose `label` equals `value`
pub fn value_of(samples: &[Sample], fq_name: &str, label: &str, value: &str) -> Option<f64> {
    samples
        .iter()
        .find(|s| s.fq_name() == fq_name && s.label(label) == Some(value))
        .map(|s| s.value())
}

/// Value of the single sample of an unlabelled metric
pub fn scalar(samples: &[Sample], fq_name: &str) -> Option<f64> {
    let found = find(samples, fq_name);
    assert!(found.len() <= 1, "{} emitted more than once", fq_name);
    found.first().map(|s| s.value())
}
