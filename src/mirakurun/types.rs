//! Mirakurun API Type Definitions
//!
//! Rust struct definitions for the Mirakurun REST API responses used by the
//! collectors. These types are only ever deserialized from JSON.
//!
//! # Design Notes
//!
//! - **Completeness**: Structs carry the fields the API documents, even if no
//!   collector reads them yet.
//! - **Serde Defaults**: `#[serde(default)]` lets records with missing scalar
//!   fields decode to zero/empty values instead of failing the whole fetch.
//! - **Optional Fields**: fields a collector must notice as missing are
//!   `Option<T>` so the absence can be logged rather than silently zeroed.
//!
//! # API Endpoints Covered
//!
//! - `GET /api/channels` → [`Channel`], [`ChannelService`]
//! - `GET /api/services` → [`Service`], [`ServiceChannel`]
//! - `GET /api/programs` → [`Program`]
//! - `GET /api/jobs` → [`Job`]
//! - `GET /api/tuners` → [`Tuner`], [`TunerUser`], [`TunerStreamInfo`]
//! - `GET /api/status` → [`Status`]
//! - `GET /api/version` → [`Version`]

#![allow(dead_code)] // Allow unused fields in API structs for completeness
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Channel {
    #[serde(rename = "type")]
    pub channel_type: String,
    pub channel: String,
    pub name: String,
    pub tsmf_rel_ts: i64,
    pub services: Vec<ChannelService>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChannelService {
    pub id: i64,
    pub service_id: i64,
    pub network_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub service_type: i64,
    pub logo_id: i64,
    pub has_logo_data: bool,
    pub remote_control_key_id: i64,
    pub epg_ready: bool,
    pub epg_updated_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Service {
    pub id: i64,
    pub service_id: i64,
    pub network_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub service_type: i64,
    pub logo_id: i64,
    pub has_logo_data: bool,
    pub remote_control_key_id: i64,
    pub epg_ready: bool,
    /// Milliseconds since the Unix epoch
    pub epg_updated_at: i64,
    pub channel: Option<ServiceChannel>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceChannel {
    #[serde(rename = "type")]
    pub channel_type: String,
    pub channel: String,
    pub name: String,
    pub tsmf_rel_ts: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Program {
    pub id: i64,
    pub event_id: i64,
    pub service_id: i64,
    pub network_id: i64,
    pub name: Option<String>,
    pub start_at: i64,
    pub duration: i64,
    pub is_free: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Job {
    pub key: String,
    pub name: String,
    pub id: String,
    pub status: String,
    pub retry_count: u64,
    pub is_rerunnable: bool,
    pub retry_on_abort: bool,
    pub retry_on_fail: bool,
    pub retry_max: u64,
    pub retry_delay: u64,
    pub is_aborting: bool,
    pub has_aborted: bool,
    pub has_skipped: bool,
    pub has_failed: bool,
    pub error: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub started_at: i64,
    pub finished_at: i64,
    pub duration: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Tuner {
    pub index: i64,
    pub name: String,
    pub types: Vec<String>,
    pub command: Option<String>,
    pub pid: Option<i64>,
    pub users: Vec<TunerUser>,
    pub is_available: bool,
    pub is_remote: bool,
    pub is_free: bool,
    pub is_using: bool,
    pub is_fault: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TunerUser {
    pub id: String,
    pub priority: i64,
    pub agent: String,
    pub url: Option<String>,
    pub disable_decoder: bool,
    /// Keyed by PID; absent while the stream is still being set up
    pub stream_info: Option<BTreeMap<u32, TunerStreamInfo>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TunerStreamInfo {
    pub packet: u64,
    pub drop: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Status {
    pub time: i64,
    pub version: String,
    pub process: Process,
    #[serde(rename = "epg", alias = "EPG")]
    pub epg: Epg,
    pub rpc_count: u64,
    pub stream_count: StreamCount,
    pub error_count: ErrorCount,
    pub timer_accuracy: TimerAccuracy,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Process {
    pub arch: String,
    pub platform: String,
    pub versions: HashMap<String, String>,
    pub pid: i64,
    pub memory_usage: MemoryUsage,
}

impl Process {
    /// Node.js runtime version reported by the upstream process
    pub fn node_version(&self) -> Option<&str> {
        self.versions.get("node").map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemoryUsage {
    pub rss: u64,
    pub heap_total: u64,
    pub heap_used: u64,
    pub external: u64,
    pub array_buffers: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Epg {
    pub gathering_networks: Vec<i64>,
    pub stored_events: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StreamCount {
    pub tuner_device: u64,
    pub ts_filter: u64,
    pub decoder: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ErrorCount {
    pub uncaught_exception: u64,
    pub unhandled_rejection: u64,
    pub buffer_overflow: u64,
    pub tuner_device_respawn: u64,
    pub decoder_respawn: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TimerAccuracy {
    pub last: f64,
    pub m1: TimerAccuracyValue,
    pub m5: TimerAccuracyValue,
    pub m15: TimerAccuracyValue,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TimerAccuracyValue {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

/// Statistic exposed for each timer accuracy window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStat {
    Avg,
    Min,
    Max,
}

impl TimerStat {
    pub const ALL: [TimerStat; 3] = [TimerStat::Avg, TimerStat::Min, TimerStat::Max];

    pub fn label(self) -> &'static str {
        match self {
            TimerStat::Avg => "avg",
            TimerStat::Min => "min",
            TimerStat::Max => "max",
        }
    }
}

impl TimerAccuracyValue {
    pub fn get(&self, stat: TimerStat) -> f64 {
        match stat {
            TimerStat::Avg => self.avg,
            TimerStat::Min => self.min,
            TimerStat::Max => self.max,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Version {
    pub current: String,
    pub latest: String,
}
