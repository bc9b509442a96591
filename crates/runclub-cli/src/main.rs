//! Runclub CLI - request, join, and leave group runs from a device.
//!
//! Every command goes through the local mirror: reads fall back to cached
//! data when the server is unreachable, writes go to the server first.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use group_local_mirror::{Reconciler, SqliteMirrorStore};
use group_service_client::HttpGroupClient;
use group_types::{GroupError, UserId};
use runclub_config_and_utils::{init_logging, Config, Paths};
use tracing::debug;

/// Runclub command-line client.
#[derive(Parser, Debug)]
#[command(name = "runclub")]
#[command(about = "Find, join, and leave group runs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Your user id, as issued by the identity service
    #[arg(long, env = "RUNCLUB_USER", global = true)]
    user: Option<String>,

    /// Group service URL. Defaults to the configured server_url
    #[arg(long, global = true)]
    server: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Base directory for runtime files (mirror, logs, config). Defaults to ~/.runclub
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Join a compatible group or start a new one
    Request {
        /// Run type, e.g. easy, tempo, long
        #[arg(long)]
        kind: String,
        #[arg(long)]
        distance_km: f64,
        /// Target pace in minutes per km (5.25 = 5:15/km)
        #[arg(long)]
        pace: f64,
        /// Start time, RFC 3339 (2026-10-20T07:00:00Z)
        #[arg(long)]
        start: String,
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
        /// Place name shown with the location
        #[arg(long)]
        place: Option<String>,
        #[arg(long)]
        meeting_point: Option<String>,
        /// Name shown to other participants
        #[arg(long)]
        name: Option<String>,
    },
    /// Join a group by id
    Join {
        group_id: String,
        /// Your own pace in minutes per km
        #[arg(long)]
        pace: Option<f64>,
        #[arg(long)]
        name: Option<String>,
    },
    /// Leave a group
    Leave { group_id: String },
    /// Show a group and its participants
    Show { group_id: String },
    /// List upcoming groups
    Upcoming,
    /// Drop a group from the local mirror
    Forget { group_id: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let paths = Paths::resolve(cli.base_dir.clone())?;
    let config = Config::load(&paths)?;
    paths.ensure_dirs()?;

    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    init_logging("runclub-cli", level, &paths, false);

    let user = cli
        .user
        .clone()
        .filter(|u| !u.trim().is_empty())
        .ok_or("no user id: pass --user or set RUNCLUB_USER")?;
    let user = UserId::from(user.trim());
    let server = cli.server.clone().unwrap_or_else(|| config.server_url.clone());

    let client = HttpGroupClient::new(&server, user.clone(), config.request_timeout())?;
    let mirror = SqliteMirrorStore::open(paths.mirror_database_file())?;
    let reconciler = Reconciler::new(client, mirror, user);
    debug!(command = ?cli.command, %server, "running command");

    match commands::execute(&reconciler, cli.command).await {
        Ok(output) => {
            for warning in &output.warnings {
                eprintln!("warning: {}", warning.user_message());
            }
            println!("{}", serde_json::to_string_pretty(&output.value)?);
            Ok(())
        }
        Err(err) => {
            report(&err);
            std::process::exit(exit_code(&err));
        }
    }
}

fn report(err: &GroupError) {
    eprintln!("error: {}", err.user_message());
    match err {
        GroupError::Validation { field, .. } => eprintln!("  field: {field}"),
        GroupError::Internal(detail) | GroupError::Transient(detail) => {
            eprintln!("  detail: {detail}")
        }
        _ => {}
    }
}

/// `EX_TEMPFAIL` for retryable failures, 1 otherwise.
fn exit_code(err: &GroupError) -> i32 {
    if err.is_retryable() {
        75
    } else {
        1
    }
}
