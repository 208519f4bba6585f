use std::env;
use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;
use tracing::{debug, error, info};

use arena_scheduler::client::{CreationResult, LichessClient};
use arena_scheduler::config::{self, AppConfig};
use arena_scheduler::error::Result;
use arena_scheduler::orchestrator::{self, RunStatus, TokioPacer};

/// Creates a day's worth of hour-aligned team arenas on Lichess, chaining
/// each arena's description to the previously created one.
#[derive(Parser)]
struct Cli {
    /// Path to a key=value config file (falls back to $CONFIG_FILE).
    #[arg(long)]
    config: Option<String>,

    /// Build and log payloads without sending any request.
    #[arg(long)]
    dry_run: bool,

    /// Override DAYS_IN_ADVANCE from the config.
    #[arg(long)]
    days_in_advance: Option<u32>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(RunStatus::Completed) => ExitCode::SUCCESS,
        Ok(RunStatus::Aborted) => ExitCode::FAILURE,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<RunStatus> {
    let app = match cli.config.or_else(|| env::var("CONFIG_FILE").ok()) {
        Some(path) => AppConfig::from_file(&path)?,
        None => AppConfig::default(),
    };

    let (mut schedule_config, template, credentials) = config::resolve(&app)?;
    if cli.dry_run {
        schedule_config.dry_run = true;
    }
    if let Some(days) = cli.days_in_advance {
        schedule_config.days_in_advance = days;
    }
    debug!(?credentials, team_id = %schedule_config.team_id, "resolved configuration");

    let client = LichessClient::new(
        &schedule_config.server,
        credentials,
        schedule_config.dry_run,
    )?;

    let report = orchestrator::run(
        &schedule_config,
        &template,
        &client,
        &TokioPacer,
        Utc::now(),
    )
    .await?;

    for slot in &report.slots {
        match &slot.result {
            CreationResult::Created { url } => {
                info!(slot = slot.index, start = %slot.start_time, %url, "created");
            }
            CreationResult::Rejected { status, body } => {
                error!(slot = slot.index, start = %slot.start_time, status, %body, "rejected");
            }
            CreationResult::DryRun => {
                info!(slot = slot.index, start = %slot.start_time, "dry run");
            }
            CreationResult::TransportFailed { detail } => {
                error!(slot = slot.index, start = %slot.start_time, %detail, "transport fault");
            }
        }
    }
    info!(
        created = report.created(),
        rejected = report.rejected(),
        total = report.slots.len(),
        status = ?report.status,
        "run finished"
    );

    Ok(report.status)
}
