//! Neon application binary - composition root.
//!
//! 1. Parse the CLI and load configuration from TOML
//! 2. Initialize logging and open the account database
//! 3. `register` / `setup`: interactive account management
//! 4. `run`: sign in, start the listener worker on its own thread, and
//!    drive the dashboard console on the async runtime

mod assistant;
mod cli;
mod console;
mod prompt;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use neon_core::config::{expand_home, NeonConfig};
use neon_core::status::{StatusBoard, StatusReporter};
use neon_listener::SessionState;
use neon_storage::{AccountRepository, Database};

use crate::cli::{CliArgs, Command};
use crate::console::Console;

pub type AppResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// How long to wait for the worker to finish its current capture on exit.
const WORKER_SHUTDOWN_GRACE: Duration = Duration::from_secs(20);

fn init_tracing(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn open_accounts(config: &NeonConfig) -> AppResult<AccountRepository> {
    let data_dir = config.data_dir();
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        tracing::error!(path = %data_dir.display(), error = %e, "Failed to create data directory");
        return Err(e.into());
    }
    let db_path = data_dir.join("neon.db");
    let db = Database::new(&db_path)?;
    tracing::info!(path = %db_path.display(), "Account database opened");
    Ok(AccountRepository::new(Arc::new(db)))
}

fn setup(repo: &AccountRepository) -> AppResult<()> {
    let Some(account) = prompt::login(repo)? else {
        println!("Too many failed attempts.");
        return Ok(());
    };
    prompt::choose_wake_word(repo, &account)?;
    Ok(())
}

async fn run(config: NeonConfig, repo: AccountRepository) -> AppResult<()> {
    let Some(mut account) = prompt::login(&repo)? else {
        println!("Too many failed attempts.");
        return Ok(());
    };
    if account.needs_setup() {
        account.wake_word = prompt::choose_wake_word(&repo, &account)?;
    }

    // === Shared state ===

    let board = Arc::new(StatusBoard::new());
    let reporter: Arc<dyn StatusReporter> = board.clone();
    let session = Arc::new(SessionState::new(&account.wake_word, reporter.clone()));
    tracing::info!(user_id = %account.id, wake_word = %session.wake_word(), "Session started");

    tokio::spawn(console::print_status(board.subscribe()));

    // === Listener worker ===

    let speaker = assistant::build_speaker(&config);
    let processor = Arc::new(assistant::build_orchestrator(
        &config,
        reporter,
        speaker.clone(),
    ));
    let (done_tx, done_rx) = tokio::sync::oneshot::channel();
    {
        let session = Arc::clone(&session);
        let config = config.clone();
        std::thread::Builder::new()
            .name("neon-listener".into())
            .spawn(move || {
                let result = assistant::run_worker(config, session, speaker, processor);
                let _ = done_tx.send(result);
            })?;
    }

    // === Console ===

    println!(
        "Signed in as {}. Say '{}' once the assistant is on.\n",
        account.full_name(),
        account.wake_word
    );
    let mut dashboard = Console {
        session: Arc::clone(&session),
        repo,
        account,
        latest: board.subscribe(),
    };
    dashboard.run(console::spawn_stdin_reader()?).await?;

    session.set_enabled(false);
    session.request_shutdown();
    println!("Shutting down...");
    // The worker thread is detached; if it is stuck in a capture past the
    // grace period the process exits without it.
    match tokio::time::timeout(WORKER_SHUTDOWN_GRACE, done_rx).await {
        Ok(Ok(Ok(()))) => tracing::info!("Listener worker exited"),
        Ok(Ok(Err(e))) => tracing::warn!(error = %e, "Listener worker stopped with an error"),
        Ok(Err(_)) => tracing::error!("Listener worker panicked"),
        Err(_) => tracing::warn!("Listener worker did not stop in time"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let args = CliArgs::parse();

    let config_file = args.resolve_config_path();
    let mut config = NeonConfig::load_or_default(&config_file);
    if let Some(dir) = args.resolve_data_dir() {
        config.general.data_dir = dir;
    }
    let level = args
        .resolve_log_level()
        .unwrap_or_else(|| config.general.log_level.clone());
    init_tracing(&level);

    tracing::info!("Starting Neon v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        path = %config_file.display(),
        data_dir = %expand_home(&config.general.data_dir).display(),
        "Configuration loaded"
    );

    let repo = open_accounts(&config)?;
    match args.command {
        Command::Register(register) => prompt::register(&repo, register),
        Command::Setup => setup(&repo),
        Command::Run => run(config, repo).await,
    }
}
