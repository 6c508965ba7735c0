//! Gateway binary: load configuration, set up tracing, serve.

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Prediction gateway: forwards /predict to the model server
#[derive(Parser, Debug)]
#[command(name = "updrs-gateway", version, about, long_about = None)]
struct Cli {
    /// Listen host (overrides configuration)
    #[arg(long)]
    host: Option<String>,

    /// Listen port (overrides configuration)
    #[arg(short, long)]
    port: Option<u16>,

    /// Upstream model server URL (overrides configuration)
    #[arg(short, long)]
    upstream: Option<String>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Set up tracing: human-readable stderr + JSON file logging
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_filter(EnvFilter::new(filter));

    let log_dir = directories::ProjectDirs::from("org", "updrs", "updrs")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "updrs-gateway.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let config = updrs_core::load_config(cli.config.as_deref(), None)
        .map_err(|e| anyhow::anyhow!("configuration error: {}", e))?;

    let mut gateway = config.gateway;
    if let Some(host) = cli.host {
        gateway.host = host;
    }
    if let Some(port) = cli.port {
        gateway.port = port;
    }
    if let Some(upstream) = cli.upstream {
        gateway.upstream = upstream;
    }

    updrs_gateway::run(&gateway).await
}
