//! Server binary: loads configuration, opens the store, then either
//! serves the dispatcher over TCP, replays and reports, or prints a
//! one-shot stats snapshot. The subcommand bodies are thin: all real
//! behavior lives in `kvcore-engine`.

mod config;
mod error;
mod logging;
mod server;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use kvcore_engine::{Engine, EngineConfig};
use kvcore_vfs::StdFilesystem;
use tracing::info;

use crate::config::KvConfig;
use crate::error::KvcoredError;

#[derive(Parser, Debug)]
#[command(name = "kvcored", about = "Embedded key-value store server")]
struct Cli {
    /// Path to a TOML configuration file; missing is not an error.
    #[arg(long, default_value = "kvcored.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Open the store and serve the wire protocol over TCP.
    Serve,
    /// Replay the write-ahead log and report the recovered state, without
    /// starting a listener.
    Recover,
    /// Open the store, print its stats snapshot, and exit.
    Stats,
}

fn run(cli: &Cli) -> Result<(), KvcoredError> {
    let kv_config = config::load(Some(&cli.config))?;
    logging::init(&kv_config.log_level).ok();

    match cli.command {
        Command::Serve => serve(&kv_config)?,
        Command::Recover => recover(&kv_config.engine)?,
        Command::Stats => stats(&kv_config.engine)?,
    }
    Ok(())
}

fn serve(kv_config: &KvConfig) -> Result<(), KvcoredError> {
    let engine = Engine::open(StdFilesystem, kv_config.engine.clone())?;
    let engine = Arc::new(engine);
    server::serve(Arc::clone(&engine), &kv_config.listen_addr).map_err(KvcoredError::Open)?;
    engine.close()?;
    Ok(())
}

fn recover(engine_config: &EngineConfig) -> Result<(), KvcoredError> {
    let engine = Engine::open(StdFilesystem, engine_config.clone())?;
    let stats = engine.stats()?;
    info!(key_count = stats.key_count, sequence = stats.sequence, "recovery complete");
    #[expect(clippy::print_stdout, reason = "recover's whole purpose is reporting to the operator's terminal")]
    {
        println!("{stats}");
    }
    engine.close()?;
    Ok(())
}

fn stats(engine_config: &EngineConfig) -> Result<(), KvcoredError> {
    let engine = Engine::open(StdFilesystem, engine_config.clone())?;
    let stats = engine.stats()?;
    #[expect(clippy::print_stdout, reason = "stats' whole purpose is reporting to the operator's terminal")]
    {
        println!("{stats}");
    }
    engine.close()?;
    Ok(())
}

#[expect(clippy::exit, reason = "process exit codes are this binary's contract with its operator")]
fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        tracing::error!(error = %err, "kvcored exiting with an error");
        std::process::exit(err.exit_code());
    }
}
