//! # Burnpad Binary
//!
//! The binary is a thin client of the library: it parses arguments, loads
//! configuration, wires a [`FileStore`] into a [`NoteService`] and either runs
//! the HTTP server or performs a single operation against the data directory.
//!
//! Logs go to stderr so that `burnpad read` can write a note's raw bytes to
//! stdout untouched.

use anyhow::Context;
use burnpad::api::{note_url, NoteService};
use burnpad::config::BurnpadConfig;
use burnpad::error::NoteError;
use burnpad::store::fs::FileStore;
use burnpad::store::NoteStore;
use burnpad::web::{self, AppState};
use clap::Parser;
use colored::*;
use std::io::{Read, Write};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod args;
use args::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red(), e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let mut config = BurnpadConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = Some(dir);
    }

    match cli.command {
        Commands::Serve { port } => handle_serve(config, port),
        Commands::Create { text, read_once } => handle_create(&config, text, read_once),
        Commands::Read { id } => handle_read(&config, &id),
        Commands::Sweep => handle_sweep(&config),
    }
}

fn init_tracing(cli: &Cli) {
    let default = match (&cli.command, cli.verbose) {
        (_, true) => "debug,tower_http=debug",
        (Commands::Serve { .. }, false) => "info,tower_http=info",
        _ => "warn",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn open_store(config: &BurnpadConfig) -> anyhow::Result<FileStore> {
    let dir = config.data_dir()?;
    Ok(FileStore::new(dir))
}

fn handle_serve(mut config: BurnpadConfig, port: Option<u16>) -> anyhow::Result<()> {
    if let Some(port) = port {
        config.port = port;
    }
    tracing::info!("Burnpad v{}", env!("CARGO_PKG_VERSION"));

    let store = open_store(&config)?;
    tracing::info!(data_dir = %store.root().display(), "Using file store");
    let store: Arc<dyn NoteStore> = Arc::new(store);

    let service = NoteService::new(store, config.policy());
    let state = AppState::new(service, config.base_url(), config.request_timeout())
        .context("Failed to load page templates")?;
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    runtime
        .block_on(web::serve(state, addr, config.sweep_interval()))
        .with_context(|| format!("Server on {} failed", addr))?;
    Ok(())
}

fn handle_create(
    config: &BurnpadConfig,
    text: Option<String>,
    read_once: bool,
) -> anyhow::Result<()> {
    let payload = match text {
        Some(text) => text.into_bytes(),
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read note from stdin")?;
            buf
        }
    };

    let service = NoteService::new(open_store(config)?, config.policy());
    let id = service.create_note(payload, read_once)?;

    println!("{}", note_url(&config.base_url(), &id));
    if read_once {
        eprintln!("{}", "Note will be deleted after its first read.".dimmed());
    }
    Ok(())
}

fn handle_read(config: &BurnpadConfig, id: &str) -> anyhow::Result<()> {
    // Accept a pasted URL as well as a bare id.
    let id = id.trim().trim_end_matches('/');
    let id = id.rsplit('/').next().unwrap_or(id);

    let service = NoteService::new(open_store(config)?, config.policy());
    let payload = service.consume_note(id)?.ok_or(NoteError::NotFound)?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&payload)?;
    stdout.flush()?;
    Ok(())
}

fn handle_sweep(config: &BurnpadConfig) -> anyhow::Result<()> {
    let service = NoteService::new(open_store(config)?, config.policy());
    let report = service.sweep()?;

    println!(
        "{}",
        format!(
            "Removed {} expired notes and {} stale files.",
            report.expired_removed, report.stale_artifacts_removed
        )
        .green()
    );
    Ok(())
}
