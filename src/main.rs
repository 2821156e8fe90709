// coachsync - sync client for personal-training sessions
//
// The core is the workout-session composition and synchronization model:
// how exercises group into supersets/circuits, how display numbers derive
// from session order, and how the in-memory cache stays consistent with the
// backend through asynchronous mutations and refresh events.
//
// Architecture:
// - Gateway (reqwest): CRUD boundary to the backend, typed failures
// - Local store: one in-memory cache of clients -> sessions -> exercises
// - Sync service: remote call, then store update, then refresh event
// - Refresh bus: broadcast channel telling views "re-fetch X"
// - Grouping resolver: pure display-numbering and group-boundary logic
// - Report paginator: page-break placement for the exported session list

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use coachsync::cli;
use coachsync::config::Config;
use coachsync::events::RefreshBus;
use coachsync::gateway::HttpGateway;
use coachsync::store::{LocalStore, SyncService};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    // Config management is synchronous and needs no service; handle and exit
    if cli::handle_config(&args) {
        return Ok(());
    }

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();

    let config = Config::from_env();

    // Initialize tracing: RUST_LOG > config level > "info".
    // File logging is optional; the guard must outlive main so buffered
    // writes flush on exit.
    let default_filter = format!("coachsync={}", config.logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    let _file_guard: Option<tracing_appender::non_blocking::WorkerGuard> =
        if config.logging.file_enabled {
            std::fs::create_dir_all(&config.logging.file_dir).with_context(|| {
                format!(
                    "creating log directory {}",
                    config.logging.file_dir.display()
                )
            })?;
            let appender = tracing_appender::rolling::daily(
                &config.logging.file_dir,
                &config.logging.file_prefix,
            );
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false),
                )
                .init();
            Some(guard)
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
            None
        };

    tracing::debug!(api_url = %config.api_url, "configuration loaded");

    // Composition root: one gateway, one store, one bus, explicitly wired.
    // No global singletons - anything that needs the store gets the service.
    let token = config
        .bearer_token
        .clone()
        .context("COACHSYNC_TOKEN is not set (bearer credential required)")?;
    let gateway =
        HttpGateway::new(config.api_url.clone(), token).context("building the HTTP gateway")?;
    let service = SyncService::new(
        Arc::new(gateway),
        LocalStore::new_shared(),
        RefreshBus::new(),
    );

    match args.command {
        cli::Commands::Config { .. } => unreachable!("handled above"),
        cli::Commands::Clients => cli::run_clients(&service, &config).await,
        cli::Commands::Sessions { client_id } => cli::run_sessions(&service, &client_id).await,
        cli::Commands::Report { client_id, out } => {
            cli::run_report(&service, &config, &client_id, out).await
        }
    }
}
