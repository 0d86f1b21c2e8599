use anyhow::Result;
use clap::Parser;
use mirakurun_exporter::{
    collectors,
    config::{Config, LogFormat},
    mirakurun::MirakurunClient,
    server,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/Default.toml")]
    config: String,

    /// Mirakurun URL (overrides config)
    #[arg(long, env = "MIRAKURUN_URL")]
    mirakurun_url: Option<String>,

    /// Mirakurun request timeout in seconds (overrides config)
    #[arg(long, env = "MIRAKURUN_REQUEST_TIMEOUT")]
    mirakurun_request_timeout: Option<u64>,

    /// Port to listen on for metrics (overrides config)
    #[arg(short, long, env = "EXPORTER_PORT")]
    port: Option<u16>,

    /// Address to bind to (overrides config)
    #[arg(short, long, env = "EXPORTER_ADDR")]
    addr: Option<String>,

    /// Set all collectors to disabled by default
    #[arg(long)]
    collector_disable_defaults: bool,

    /// Enable a collector (repeatable)
    #[arg(long = "enable-collector", value_name = "NAME")]
    enable_collectors: Vec<String>,

    /// Disable a collector (repeatable)
    #[arg(long = "disable-collector", value_name = "NAME")]
    disable_collectors: Vec<String>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log line format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Logfmt)]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| args.log_level.as_str().into());
    let subscriber = tracing_subscriber::registry().with(filter);
    match args.log_format {
        LogFormat::Logfmt => subscriber.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }

    info!(
        "Starting Mirakurun Prometheus Exporter v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Load configuration
    let mut config = Config::load(&args.config)?;

    // Override with CLI arguments if provided
    if let Some(url) = args.mirakurun_url {
        config.mirakurun.url = url;
    }
    if let Some(timeout) = args.mirakurun_request_timeout {
        config.mirakurun.request_timeout_seconds = timeout;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(addr) = args.addr {
        config.server.addr = addr;
    }
    if args.collector_disable_defaults {
        config.collectors.disable_defaults = true;
    }
    config.collectors.enable.extend(args.enable_collectors);
    config.collectors.disable.extend(args.disable_collectors);
    config.validate()?;

    info!("Configuration loaded successfully");
    info!("Mirakurun URL: {}", config.mirakurun.url);
    info!(
        "Metrics endpoint: http://{}:{}/metrics",
        config.server.addr, config.server.port
    );

    // Resolve the collector set once; scrapes only ever see this snapshot
    let mut registry = collectors::default_registry()?;
    registry.apply(&config.collectors)?;
    registry.log_state();

    let client = Arc::new(MirakurunClient::new(&config.mirakurun)?);

    // Start the metrics server
    if let Err(e) = server::start(config, client, registry.snapshot()).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
