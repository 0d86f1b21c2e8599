//! Service Metrics Collector
//!
//! # Metrics Produced
//! - `mirakurun_service_service` - Service information (value is always 1)
//!   - Labels: id, service_id, service_name, service_type, channel_type, channel_id
//! - `mirakurun_service_epg_updated_at` - Last EPG update, in seconds since the epoch
//!   - Labels: id

use super::Collector;
use crate::error::Result;
use crate::metrics::{millis_to_seconds, Descriptor, MetricSink};
use crate::mirakurun::MirakurunApi;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

const SUBSYSTEM: &str = "service";

pub struct ServiceCollector {
    client: Arc<dyn MirakurunApi>,
    service: Arc<Descriptor>,
    epg_updated_at: Arc<Descriptor>,
}

impl ServiceCollector {
    pub fn new(client: Arc<dyn MirakurunApi>) -> Self {
        Self {
            client,
            service: Descriptor::gauge(
                SUBSYSTEM,
                "service",
                "Service information",
                &[
                    "id",
                    "service_id",
                    "service_name",
                    "service_type",
                    "channel_type",
                    "channel_id",
                ],
            ),
            epg_updated_at: Descriptor::gauge(
                SUBSYSTEM,
                "epg_updated_at",
                "Service EPG updated at",
                &["id"],
            ),
        }
    }
}

pub fn new_collector(client: Arc<dyn MirakurunApi>) -> Arc<dyn Collector> {
    Arc::new(ServiceCollector::new(client))
}

#[async_trait]
impl Collector for ServiceCollector {
    fn describe(&self) -> Vec<&Descriptor> {
        vec![&*self.service, &*self.epg_updated_at]
    }

    async fn collect(&self, sink: &mut MetricSink) -> Result<()> {
        let services = self.client.get_services().await?;

        for service in &services {
            let id = service.id.to_string();
            let (channel_type, channel_id) = match &service.channel {
                Some(channel) => (channel.channel_type.as_str(), channel.channel.as_str()),
                None => {
                    warn!(id = %id, "Service has no channel");
                    ("", "")
                }
            };

            sink.emit(
                &self.service,
                1.0,
                &[
                    id.as_str(),
                    service.service_id.to_string().as_str(),
                    service.name.as_str(),
                    service.service_type.to_string().as_str(),
                    channel_type,
                    channel_id,
                ],
            )?;
            sink.emit(
                &self.epg_updated_at,
                millis_to_seconds(service.epg_updated_at),
                &[id.as_str()],
            )?;
        }
        Ok(())
    }
}
