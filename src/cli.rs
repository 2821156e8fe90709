// CLI module - command-line argument parsing and handlers
//
// Subcommands:
// - config --show/--reset/--path: configuration management
// - clients: refresh and print the client roster
// - sessions <client-id>: print a client's sessions with display numbering
// - report <client-id> [--out FILE]: paginate sessions and write the report

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::{Config, VERSION};
use crate::grouping::{compute_numbering, is_first_in_group};
use crate::model::ClientId;
use crate::report::{paginate, render_text, sort_for_report, trailing_number};
use crate::store::SyncService;

/// coachsync - training-session sync client
#[derive(Parser)]
#[command(name = "coachsync")]
#[command(version = VERSION)]
#[command(about = "Sync client for training sessions", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// Refresh and list the client roster
    Clients,

    /// List a client's sessions with display numbering
    Sessions {
        /// Client id
        client_id: String,
    },

    /// Export a paginated training report for a client
    Report {
        /// Client id
        client_id: String,

        /// Output file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// Handle the synchronous config subcommand. Returns true if it was handled
/// (exit after, no service needed).
pub fn handle_config(cli: &Cli) -> bool {
    let Commands::Config { show, reset, path } = &cli.command else {
        return false;
    };

    if *path {
        handle_config_path();
    } else if *show {
        handle_config_show();
    } else if *reset {
        handle_config_reset();
    } else {
        println!("Usage: coachsync config [--show|--reset|--path]");
    }
    true
}

fn handle_config_path() {
    match Config::config_path() {
        Some(path) => println!("{}", path.display()),
        None => {
            eprintln!("Error: Could not determine config path");
            std::process::exit(1);
        }
    }
}

fn handle_config_show() {
    let config = Config::from_env();

    println!("# Effective configuration (env > file > defaults)");
    println!();
    println!("api_url = {:?}", config.api_url);
    println!("owner_id = {:?}", config.owner_id);
    println!(
        "bearer_token = {}",
        if config.bearer_token.is_some() {
            "(set via COACHSYNC_TOKEN)"
        } else {
            "(unset)"
        }
    );
    println!();
    println!("[logging]");
    println!("level = {:?}", config.logging.level);
    println!("file_enabled = {}", config.logging.file_enabled);
    println!("file_dir = {:?}", config.logging.file_dir.display().to_string());
    println!();
    println!("[report]");
    println!("page_height = {}", config.report.page_height);
    println!("session_base = {}", config.report.session_base);
    println!("exercise_row = {}", config.report.exercise_row);
    println!("circuit_header = {}", config.report.circuit_header);

    println!();
    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("# Source: {}", path.display());
        } else {
            println!("# Source: defaults (no config file)");
        }
    }
}

fn handle_config_reset() {
    let Some(path) = Config::config_path() else {
        eprintln!("Error: Could not determine config path");
        std::process::exit(1);
    };

    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("Error creating directory: {e}");
            std::process::exit(1);
        }
    }

    if let Err(e) = std::fs::write(&path, Config::default().to_toml()) {
        eprintln!("Error writing config: {e}");
        std::process::exit(1);
    }

    println!("Config reset to defaults: {}", path.display());
}

// ─────────────────────────────────────────────────────────────────────────────
// Async command handlers
// ─────────────────────────────────────────────────────────────────────────────

pub async fn run_clients(service: &SyncService, config: &Config) -> Result<()> {
    service.refresh_roster(&config.owner_id).await;
    let clients = service.store_snapshot(|store| store.clients());

    if clients.is_empty() {
        println!("No clients cached (check connectivity and COACHSYNC_OWNER_ID).");
        return Ok(());
    }
    for client in clients {
        println!("{}  {} (age {}, goals: {})", client.id, client.name, client.age, client.goals);
    }
    Ok(())
}

pub async fn run_sessions(service: &SyncService, client_id: &str) -> Result<()> {
    let client_id = ClientId::new(client_id);
    let sessions = service
        .refresh_sessions(&client_id)
        .await
        .context("fetching sessions")?;

    for session in &sessions {
        let status = if session.is_completed { "done" } else { "open" };
        println!("{} [{}] {}", session.id, status, session.workout_name);

        let numbering = compute_numbering(&session.exercises);
        for (i, exercise) in session.exercises.iter().enumerate() {
            let marker = if exercise.group.is_some() {
                if is_first_in_group(&session.exercises, i) {
                    "+"
                } else {
                    "|"
                }
            } else {
                " "
            };
            println!("  {marker} {}. {}", numbering[i], exercise.name);
        }
    }
    Ok(())
}

pub async fn run_report(
    service: &SyncService,
    config: &Config,
    client_id: &str,
    out: Option<PathBuf>,
) -> Result<()> {
    let client_id = ClientId::new(client_id);
    service.refresh_roster(&config.owner_id).await;
    let mut sessions = service
        .refresh_sessions(&client_id)
        .await
        .context("fetching sessions")?;

    let client_name = service
        .store_snapshot(|store| store.clients())
        .into_iter()
        .find(|c| c.id == client_id)
        .map(|c| c.name)
        .unwrap_or_else(|| client_id.to_string());

    sort_for_report(&mut sessions, trailing_number);
    let pages = paginate(&sessions, &config.report.metrics());
    let bytes = render_text(&client_name, &pages);

    match out {
        Some(path) => {
            std::fs::write(&path, &bytes)
                .with_context(|| format!("writing report to {}", path.display()))?;
            println!("Wrote {} page(s) to {}", pages.len(), path.display());
        }
        None => {
            use std::io::Write;
            std::io::stdout().write_all(&bytes)?;
        }
    }
    Ok(())
}
