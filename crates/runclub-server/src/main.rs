//! Runclub server - HTTP front end for the group lifecycle coordinator.

mod api;
mod app;

#[cfg(test)]
mod tests;

use std::path::PathBuf;

use clap::Parser;
use runclub_config_and_utils::{init_logging, Config, Paths};

/// Runclub group service.
#[derive(Parser)]
#[command(name = "runclub-server")]
#[command(about = "Serves group create-or-match, join, leave, and cancel over HTTP")]
#[command(version)]
struct Cli {
    /// Log level or filter directive. Defaults to the configured level.
    #[arg(short, long)]
    log_level: Option<String>,

    /// Base directory for runtime files (database, logs, config). Defaults to ~/.runclub
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Address to listen on. Defaults to the configured listen_addr.
    #[arg(long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let paths = Paths::resolve(cli.base_dir)?;
    let config = Config::load(&paths)?;

    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    init_logging("runclub-server", level, &paths, true);

    let listen = cli.listen.unwrap_or_else(|| config.listen_addr.clone());
    app::run(&config, &paths, &listen).await?;

    Ok(())
}
