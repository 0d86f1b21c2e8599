//! Channel Metrics Collector
//!
//! # Metrics Produced
//! - `mirakurun_channel_mirakurun_channels` - Channel information (value is always 1)
//!   - Labels: name, type, channel

use super::Collector;
use crate::error::Result;
use crate::metrics::{Descriptor, MetricSink};
use crate::mirakurun::MirakurunApi;
use async_trait::async_trait;
use std::sync::Arc;

const SUBSYSTEM: &str = "channel";

pub struct ChannelCollector {
    client: Arc<dyn MirakurunApi>,
    channel: Arc<Descriptor>,
}

impl ChannelCollector {
    pub fn new(client: Arc<dyn MirakurunApi>) -> Self {
        Self {
            client,
            channel: Descriptor::gauge(
                SUBSYSTEM,
                "mirakurun_channels",
                "Channel information",
                &["name", "type", "channel"],
            ),
        }
    }
}

pub fn new_collector(client: Arc<dyn MirakurunApi>) -> Arc<dyn Collector> {
    Arc::new(ChannelCollector::new(client))
}

#[async_trait]
impl Collector for ChannelCollector {
    fn describe(&self) -> Vec<&Descriptor> {
        vec![&*self.channel]
    }

    async fn collect(&self, sink: &mut MetricSink) -> Result<()> {
        let channels = self.client.get_channels().await?;

        for channel in &channels {
            sink.emit(
                &self.channel,
                1.0,
                &[
                    channel.name.as_str(),
                    channel.channel_type.as_str(),
                    channel.channel.as_str(),
                ],
            )?;
        }
        Ok(())
    }
}
