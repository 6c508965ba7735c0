//! updrs CLI — enter voice-feature measurements and run severity analyses.

mod commands;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Parkinson's severity prediction from voice-feature measurements
#[derive(Parser, Debug)]
#[command(name = "updrs", version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Enter measurements and run a severity analysis
    Submit {
        /// Start from the bundled sample record instead of an empty form
        #[arg(long)]
        sample: bool,

        /// Set one field, e.g. --set age=59 or --set "Jitter(%)=0.007" (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,

        /// Prediction service URL (overrides configuration)
        #[arg(long)]
        predictor: Option<String>,

        /// Submit without attaching the configured user id
        #[arg(long)]
        anonymous: bool,
    },
    /// Show past submissions, newest first
    History {
        /// Show only the newest N records
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Describe the twelve voice features and their accepted ranges
    Features,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Print the effective merged configuration as TOML
    Show,
    /// Write a commented starter config file
    Init,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Set up tracing: human-readable stderr + JSON file logging
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
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
    let file_appender = tracing_appender::rolling::daily(&log_dir, "updrs.log");
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

    match cli.command {
        Commands::Submit {
            sample,
            set,
            predictor,
            anonymous,
        } => commands::submit(&config, sample, &set, predictor, anonymous).await,
        Commands::History { limit } => commands::history(&config, limit).await,
        Commands::Features => commands::features(),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_show(&config),
            ConfigAction::Init => commands::config_init(),
        },
    }
}
