//! Collector Registry
//!
//! Table of every known collector with its compiled-in default and the
//! enabled state resolved from startup configuration. The registry is only
//! mutated while the process starts; scrapes receive an immutable
//! [`EnabledCollectors`] snapshot instead of reading the table.
//!
//! Resolution order for each collector:
//! 1. compiled-in default
//! 2. `disable_defaults` (everything off except the forced allow-list)
//! 3. explicit per-collector overrides, which always win

use super::CollectorFactory;
use crate::config::CollectorsConfig;
use crate::error::{ExporterError, Result};
use tracing::info;

/// Name of the pseudo-collector gating the per-collector scrape metrics
pub const SCRAPE_COLLECTOR: &str = "scrape";

/// One registered collector
#[derive(Clone, Copy)]
pub struct Registration {
    pub name: &'static str,
    pub default_enabled: bool,
    pub factory: CollectorFactory,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("default_enabled", &self.default_enabled)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
struct Entry {
    registration: Registration,
    enabled: bool,
}

#[derive(Debug)]
pub struct CollectorRegistry {
    entries: Vec<Entry>,
    scrape_enabled: bool,
}

impl Default for CollectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectorRegistry {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            scrape_enabled: true,
        }
    }

    /// Add a collector; names are unique and `scrape` is reserved
    pub fn register(
        &mut self,
        name: &'static str,
        default_enabled: bool,
        factory: CollectorFactory,
    ) -> Result<&mut Self> {
        if name == SCRAPE_COLLECTOR || self.entry(name).is_some() {
            return Err(ExporterError::DuplicateCollector(name.to_string()));
        }
        self.entries.push(Entry {
            registration: Registration {
                name,
                default_enabled,
                factory,
            },
            enabled: default_enabled,
        });
        Ok(self)
    }

    /// Turn off every collector not named in `forced`
    ///
    /// The scrape pseudo-collector is left alone; only an explicit override
    /// disables it.
    pub fn disable_defaults<S: AsRef<str>>(&mut self, forced: &[S]) {
        for entry in &mut self.entries {
            entry.enabled = forced
                .iter()
                .any(|name| name.as_ref() == entry.registration.name);
        }
    }

    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> Result<()> {
        if name == SCRAPE_COLLECTOR {
            self.scrape_enabled = enabled;
            return Ok(());
        }
        match self.entries.iter_mut().find(|e| e.registration.name == name) {
            Some(entry) => {
                entry.enabled = enabled;
                Ok(())
            }
            None => Err(ExporterError::UnknownCollector(name.to_string())),
        }
    }

    /// Resolve enabled state from startup configuration
    pub fn apply(&mut self, config: &CollectorsConfig) -> Result<()> {
        if config.disable_defaults {
            self.disable_defaults(&config.enable);
        }
        for name in &config.enable {
            self.set_enabled(name, true)?;
        }
        for name in &config.disable {
            self.set_enabled(name, false)?;
        }
        Ok(())
    }

    pub fn is_enabled(&self, name: &str) -> Option<bool> {
        if name == SCRAPE_COLLECTOR {
            return Some(self.scrape_enabled);
        }
        self.entry(name).map(|e| e.enabled)
    }

    /// Names of all registered collectors, in registration order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.registration.name)
    }

    /// Immutable view of the enabled collectors handed to the scrape handler
    pub fn snapshot(&self) -> EnabledCollectors {
        let collectors = self
            .entries
            .iter()
            .filter(|e| e.enabled)
            .map(|e| e.registration)
            .collect();
        EnabledCollectors {
            collectors,
            scrape_metrics: self.scrape_enabled,
        }
    }

    /// Log the resolved state of every collector
    pub fn log_state(&self) {
        for entry in &self.entries {
            info!(
                collector = entry.registration.name,
                enabled = entry.enabled,
                default = entry.registration.default_enabled,
                "Collector state"
            );
        }
        info!(
            collector = SCRAPE_COLLECTOR,
            enabled = self.scrape_enabled,
            "Collector state"
        );
    }

    fn entry(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.registration.name == name)
    }
}

/// Collectors enabled for every scrape, fixed at startup
#[derive(Debug, Clone)]
pub struct EnabledCollectors {
    collectors: Vec<Registration>,
    scrape_metrics: bool,
}

impl EnabledCollectors {
    pub fn collectors(&self) -> &[Registration] {
        &self.collectors
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.collectors.iter().map(|r| r.name).collect()
    }

    /// Whether per-collector duration/success metrics are emitted
    pub fn scrape_metrics(&self) -> bool {
        self.scrape_metrics
    }
}
