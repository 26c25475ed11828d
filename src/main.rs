//! # Rollcall — LINE attendance bot server
//!
//! Serves the LINE webhook, the weekly cron endpoint and a health route.
//!
//! Usage:
//!   rollcall                             # ~/.rollcall/config.toml, port from config
//!   rollcall --config ./rollcall.toml    # Custom config file
//!   rollcall --port 8080 --host 0.0.0.0  # Override the listen address

use anyhow::Result;
use clap::Parser;
use rollcall_core::RollcallConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "rollcall",
    version,
    about = "Rollcall — weekly attendance checklist and calendar bot for LINE"
)]
struct Cli {
    /// Config file (default: ~/.rollcall/config.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Listen port (overrides [gateway].port)
    #[arg(short, long)]
    port: Option<u16>,

    /// Listen host (overrides [gateway].host)
    #[arg(long)]
    host: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(path: Option<&str>) -> Result<RollcallConfig> {
    let mut config = match path {
        Some(p) => RollcallConfig::load_from(std::path::Path::new(&shellexpand::tilde(p).to_string()))?,
        None => RollcallConfig::load()?,
    };
    config.apply_env_overrides();
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "rollcall=debug,rollcall_gateway=debug,rollcall_channels=debug,rollcall_google=debug,rollcall_schedule=debug,rollcall_scheduler=debug,tower_http=debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.gateway.port = port;
    }
    if let Some(host) = cli.host {
        config.gateway.host = host;
    }

    tracing::info!(
        "Rollcall v{} starting ({} checklist rows, weekly trigger {})",
        env!("CARGO_PKG_VERSION"),
        config.checklist.rows.len(),
        if config.weekly.enabled { config.weekly.cron.as_str() } else { "off" }
    );

    rollcall_gateway::start(&config).await
}
