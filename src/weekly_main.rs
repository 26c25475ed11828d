//! # rollcall-weekly — one-shot weekly checklist broadcast
//!
//! Sends the weekly checklist to every registered user and exits. Meant to be
//! run from an external scheduler (crontab, systemd timer, hosted cron).

use anyhow::Result;
use clap::Parser;
use rollcall_core::RollcallConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "rollcall-weekly",
    version,
    about = "Broadcast the weekly Rollcall checklist once"
)]
struct Cli {
    /// Config file (default: ~/.rollcall/config.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    let mut config = match cli.config.as_deref() {
        Some(p) => RollcallConfig::load_from(std::path::Path::new(&shellexpand::tilde(p).to_string()))?,
        None => RollcallConfig::load()?,
    };
    config.apply_env_overrides();

    tracing::info!("[weekly] triggered cron job");
    let dispatcher = rollcall_gateway::build_dispatcher(&config)?;
    let count = dispatcher.broadcast_weekly().await?;
    tracing::info!("[weekly] done, {count} recipient(s)");
    Ok(())
}
