//! Pathmux server binary.
//!
//! Loads a TOML config (or defaults), applies CLI overrides, then serves the
//! built-in and static routes until SIGINT/SIGTERM.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use pathmux::config::{load_config, validate_config, ServerConfig};
use pathmux::lifecycle::{self, signals, Shutdown};
use pathmux::observability::init_logging;

#[derive(Debug, Parser)]
#[command(name = "pathmux", version, about = "Segment-trie HTTP router")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override observability.log_level.
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn load(&self) -> Result<ServerConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ServerConfig::default(),
        };
        if let Some(bind) = &self.bind {
            config.listener.bind_address = bind.clone();
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
        validate_config(&config).map_err(pathmux::config::ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match cli.load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("pathmux: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "pathmux starting");

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(&shutdown);

    if let Err(e) = lifecycle::serve(config, &shutdown).await {
        tracing::error!(error = %e, "Server failed");
        return ExitCode::FAILURE;
    }

    tracing::info!("Shutdown complete");
    ExitCode::SUCCESS
}
