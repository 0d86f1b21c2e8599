//! Tuner Metrics Collector
//!
//! Collects tuner device state, the users attached to each tuner and their
//! stream packet/drop counters.
//!
//! # Metrics Produced
//! - `mirakurun_tuners_device` - Tuner device information (value is always 1)
//!   - Labels: index, name, type
//! - `mirakurun_tuners_available_tuner` - Tuner is available (1/0)
//! - `mirakurun_tuners_remote_tuner` - Tuner is remote (1/0)
//! - `mirakurun_tuners_free_tuner` - Tuner is free (1/0)
//! - `mirakurun_tuners_using_tuner` - Tuner is in use (1/0)
//! - `mirakurun_tuners_fault_tuner` - Tuner is faulted (1/0)
//!   - Labels: index
//! - `mirakurun_tuners_users` - User attached to a tuner (value is always 1)
//!   - Labels: index, user_id, agent
//! - `mirakurun_tuners_stream_packets` / `mirakurun_tuners_stream_drops` - counters
//!   summed over all streams of a user
//!   - Labels: user_id

use super::Collector;
use crate::error::Result;
use crate::metrics::{bool_to_f64, Descriptor, MetricSink};
use crate::mirakurun::types::TunerUser;
use crate::mirakurun::MirakurunApi;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

const SUBSYSTEM: &str = "tuners";

pub struct TunersCollector {
    client: Arc<dyn MirakurunApi>,
    device: Arc<Descriptor>,
    available: Arc<Descriptor>,
    remote: Arc<Descriptor>,
    free: Arc<Descriptor>,
    using: Arc<Descriptor>,
    fault: Arc<Descriptor>,
    users: Arc<Descriptor>,
    stream_packets: Arc<Descriptor>,
    stream_drops: Arc<Descriptor>,
}

impl TunersCollector {
    pub fn new(client: Arc<dyn MirakurunApi>) -> Self {
        Self {
            client,
            device: Descriptor::gauge(
                SUBSYSTEM,
                "device",
                "Tuner device information",
                &["index", "name", "type"],
            ),
            available: Descriptor::gauge(
                SUBSYSTEM,
                "available_tuner",
                "available tuner device",
                &["index"],
            ),
            remote: Descriptor::gauge(SUBSYSTEM, "remote_tuner", "remote tuner device", &["index"]),
            free: Descriptor::gauge(SUBSYSTEM, "free_tuner", "tuner device is free", &["index"]),
            using: Descriptor::gauge(SUBSYSTEM, "using_tuner", "tuner device is using", &["index"]),
            fault: Descriptor::gauge(SUBSYSTEM, "fault_tuner", "tuner device is fault", &["index"]),
            users: Descriptor::gauge(
                SUBSYSTEM,
                "users",
                "user using tuner device",
                &["index", "user_id", "agent"],
            ),
            stream_packets: Descriptor::counter(
                SUBSYSTEM,
                "stream_packets",
                "stream packets by user",
                &["user_id"],
            ),
            stream_drops: Descriptor::counter(
                SUBSYSTEM,
                "stream_drops",
                "stream drops packets by user",
                &["user_id"],
            ),
        }
    }
}

pub fn new_collector(client: Arc<dyn MirakurunApi>) -> Arc<dyn Collector> {
    Arc::new(TunersCollector::new(client))
}

/// Total (packets, drops) over every stream of a user
///
/// A user without stream info is logged and counted as zero.
pub fn stream_totals(user: &TunerUser) -> (u64, u64) {
    match &user.stream_info {
        Some(streams) => streams
            .values()
            .fold((0, 0), |(packets, drops), s| (packets + s.packet, drops + s.drop)),
        None => {
            warn!(user_id = %user.id, "StreamInfo is missing");
            (0, 0)
        }
    }
}

#[async_trait]
impl Collector for TunersCollector {
    fn describe(&self) -> Vec<&Descriptor> {
        vec![
            &*self.device,
            &*self.available,
            &*self.remote,
            &*self.free,
            &*self.using,
            &*self.fault,
            &*self.users,
            &*self.stream_packets,
            &*self.stream_drops,
        ]
    }

    async fn collect(&self, sink: &mut MetricSink) -> Result<()> {
        let tuners = self.client.get_tuners().await?;

        for tuner in &tuners {
            let index = tuner.index.to_string();
            let index = index.as_str();
            let types = tuner.types.join(",");

            sink.emit(&self.device, 1.0, &[index, tuner.name.as_str(), types.as_str()])?;
            sink.emit(&self.available, bool_to_f64(tuner.is_available), &[index])?;
            sink.emit(&self.remote, bool_to_f64(tuner.is_remote), &[index])?;
            sink.emit(&self.free, bool_to_f64(tuner.is_free), &[index])?;
            sink.emit(&self.using, bool_to_f64(tuner.is_using), &[index])?;
            sink.emit(&self.fault, bool_to_f64(tuner.is_fault), &[index])?;

            for user in &tuner.users {
                sink.emit(
                    &self.users,
                    1.0,
                    &[index, user.id.as_str(), user.agent.as_str()],
                )?;

                let (packets, drops) = stream_totals(user);
                sink.emit(&self.stream_packets, packets as f64, &[user.id.as_str()])?;
                sink.emit(&self.stream_drops, drops as f64, &[user.id.as_str()])?;
            }
        }
        Ok(())
    }
}
