//! Status Metrics Collector
//!
//! Collects process health of the Mirakurun server from `/api/status`.
//!
//! # Metrics Produced
//! - `mirakurun_status_version` - Mirakurun and Node.js versions (value is always 1)
//!   - Labels: mirakurun, node
//! - `mirakurun_status_process` - Process architecture and platform (value is always 1)
//!   - Labels: arch, platform
//! - `mirakurun_status_memory_usage` - Memory usage in bytes
//!   - Labels: type (RSS, HeapTotal, HeapUsed, External, ArrayBuffers)
//! - `mirakurun_status_epg_stored_events` - Count of stored EPG events
//! - `mirakurun_status_stream_count` - Open streams
//!   - Labels: type (TunerDevice, TSFilter, Decoder)
//! - `mirakurun_status_error_count` - Error counters
//!   - Labels: type (UncaughtException, UnhandledRejection, BufferOverflow,
//!     TunerDeviceRespawn, DecoderRespawn)
//! - `mirakurun_status_timer_accuracy_m1`, `_m5`, `_m15` - Timer accuracy windows
//!   - Labels: type (avg, min, max)

use super::Collector;
use crate::error::Result;
use crate::metrics::{Descriptor, MetricSink};
use crate::mirakurun::types::{TimerAccuracyValue, TimerStat};
use crate::mirakurun::MirakurunApi;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

const SUBSYSTEM: &str = "status";

pub struct StatusCollector {
    client: Arc<dyn MirakurunApi>,
    version: Arc<Descriptor>,
    process: Arc<Descriptor>,
    memory_usage: Arc<Descriptor>,
    epg_stored_events: Arc<Descriptor>,
    stream_count: Arc<Descriptor>,
    error_count: Arc<Descriptor>,
    timer_accuracy_m1: Arc<Descriptor>,
    timer_accuracy_m5: Arc<Descriptor>,
    timer_accuracy_m15: Arc<Descriptor>,
}

impl StatusCollector {
    pub fn new(client: Arc<dyn MirakurunApi>) -> Self {
        Self {
            client,
            version: Descriptor::gauge(
                SUBSYSTEM,
                "version",
                "Version of Mirakurun",
                &["mirakurun", "node"],
            ),
            process: Descriptor::gauge(
                SUBSYSTEM,
                "process",
                "Process information of Mirakurun",
                &["arch", "platform"],
            ),
            memory_usage: Descriptor::gauge(
                SUBSYSTEM,
                "memory_usage",
                "Memory usage of Mirakurun",
                &["type"],
            ),
            epg_stored_events: Descriptor::gauge(
                SUBSYSTEM,
                "epg_stored_events",
                "Count of stored EPG events",
                &[],
            ),
            stream_count: Descriptor::gauge(SUBSYSTEM, "stream_count", "Count of streams", &["type"]),
            error_count: Descriptor::counter(SUBSYSTEM, "error_count", "Count of errors", &["type"]),
            timer_accuracy_m1: Descriptor::gauge(
                SUBSYSTEM,
                "timer_accuracy_m1",
                "Timer accuracy for 1 minute",
                &["type"],
            ),
            timer_accuracy_m5: Descriptor::gauge(
                SUBSYSTEM,
                "timer_accuracy_m5",
                "Timer accuracy for 5 minutes",
                &["type"],
            ),
            timer_accuracy_m15: Descriptor::gauge(
                SUBSYSTEM,
                "timer_accuracy_m15",
                "Timer accuracy for 15 minutes",
                &["type"],
            ),
        }
    }

    fn emit_timer_accuracy(
        sink: &mut MetricSink,
        desc: &Arc<Descriptor>,
        window: &TimerAccuracyValue,
    ) -> Result<()> {
        for stat in TimerStat::ALL {
            sink.emit(desc, window.get(stat), &[stat.label()])?;
        }
        Ok(())
    }
}

pub fn new_collector(client: Arc<dyn MirakurunApi>) -> Arc<dyn Collector> {
    Arc::new(StatusCollector::new(client))
}

#[async_trait]
impl Collector for StatusCollector {
    fn describe(&self) -> Vec<&Descriptor> {
        vec![
            &*self.version,
            &*self.process,
            &*self.memory_usage,
            &*self.epg_stored_events,
            &*self.stream_count,
            &*self.error_count,
            &*self.timer_accuracy_m1,
            &*self.timer_accuracy_m5,
            &*self.timer_accuracy_m15,
        ]
    }

    async fn collect(&self, sink: &mut MetricSink) -> Result<()> {
        let status = self.client.get_status().await?;
        let process = &status.process;

        let node = process.node_version().unwrap_or_else(|| {
            warn!("Status has no node version");
            ""
        });
        sink.emit(&self.version, 1.0, &[status.version.as_str(), node])?;
        sink.emit(
            &self.process,
            1.0,
            &[process.arch.as_str(), process.platform.as_str()],
        )?;

        let memory = &process.memory_usage;
        for (kind, bytes) in [
            ("RSS", memory.rss),
            ("HeapTotal", memory.heap_total),
            ("HeapUsed", memory.heap_used),
            ("External", memory.external),
            ("ArrayBuffers", memory.array_buffers),
        ] {
            sink.emit(&self.memory_usage, bytes as f64, &[kind])?;
        }

        sink.emit(&self.epg_stored_events, status.epg.stored_events as f64, &[])?;

        let streams = &status.stream_count;
        for (kind, count) in [
            ("TunerDevice", streams.tuner_device),
            ("TSFilter", streams.ts_filter),
            ("Decoder", streams.decoder),
        ] {
            sink.emit(&self.stream_count, count as f64, &[kind])?;
        }

        let errors = &status.error_count;
        for (kind, count) in [
            ("UncaughtException", errors.uncaught_exception),
            ("UnhandledRejection", errors.unhandled_rejection),
            ("BufferOverflow", errors.buffer_overflow),
            ("TunerDeviceRespawn", errors.tuner_device_respawn),
            ("DecoderRespawn", errors.decoder_respawn),
        ] {
            sink.emit(&self.error_count, count as f64, &[kind])?;
        }

        let timers = &status.timer_accuracy;
        Self::emit_timer_accuracy(sink, &self.timer_accuracy_m1, &timers.m1)?;
        Self::emit_timer_accuracy(sink, &self.timer_accuracy_m5, &timers.m5)?;
        Self::emit_timer_accuracy(sink, &self.timer_accuracy_m15, &timers.m15)?;
        Ok(())
    }
}
