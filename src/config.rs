use anyhow::{bail, Context, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub mirakurun: MirakurunConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub collectors: CollectorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MirakurunConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Subtracted from the Prometheus scrape timeout header so the response
    /// is written before Prometheus gives up on the scrape.
    #[serde(default = "default_timeout_offset")]
    pub timeout_offset_seconds: f64,
}

/// Collector selection, resolved once at startup.
///
/// `enable` doubles as the allow-list that survives `disable_defaults`.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct CollectorsConfig {
    #[serde(default)]
    pub disable_defaults: bool,
    #[serde(default)]
    pub enable: Vec<String>,
    #[serde(default)]
    pub disable: Vec<String>,
}

/// Layout of log lines, selected with `--log-format`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human readable key=value lines
    #[default]
    Logfmt,
    /// One JSON object per line
    Json,
}

impl Default for MirakurunConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            port: default_port(),
            timeout_offset_seconds: default_timeout_offset(),
        }
    }
}

fn default_url() -> String {
    "http://localhost:40772".to_string()
}

fn default_request_timeout() -> u64 {
    5
}

fn default_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout_offset() -> f64 {
    0.5
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        // Load environment variables from .env if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("MIRAKURUN_EXPORTER")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("collectors.enable")
                    .with_list_parse_key("collectors.disable")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Reject settings that would only fail later, at the first scrape.
    pub fn validate(&self) -> Result<()> {
        if self.mirakurun.url.trim().is_empty() {
            bail!("mirakurun.url must not be empty");
        }
        if self.mirakurun.request_timeout_seconds == 0 {
            bail!("mirakurun.request_timeout_seconds must be greater than 0");
        }
        if self.server.timeout_offset_seconds < 0.0 {
            bail!("server.timeout_offset_seconds must not be negative");
        }
        if let Some(name) = self
            .collectors
            .enable
            .iter()
            .find(|name| self.collectors.disable.contains(name))
        {
            bail!("collector {} is both enabled and disabled", name);
        }
        Ok(())
    }
}
