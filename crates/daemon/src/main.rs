// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! faunanet-watcherd: the worker child process.
//!
//! Spawned by the supervisor with `--run-dir <output>`; reads the run
//! directory's `config.yml` and analyzes new recordings until told to
//! stop. Not meant to be invoked by hand.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use faunanet_daemon::WorkerLoop;

#[derive(Parser)]
#[command(
    name = "faunanet-watcherd",
    about = "faunanet worker process; spawned by the faunanet shell, not meant to be invoked directly"
)]
struct Args {
    /// Run output directory holding the config.yml snapshot to execute.
    #[arg(long)]
    run_dir: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Logging failures must not stop the worker; analysis is the job.
    let _log_guard = setup_logging(&args.run_dir).ok();

    info!(run_dir = %args.run_dir.display(), pid = std::process::id(), "worker starting");

    match WorkerLoop::new(&args.run_dir).run().await {
        Ok(()) => {
            info!("worker exiting cleanly");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("worker failed: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Per-run file logging: `<run_dir>/worker.log` through a non-blocking
/// appender, env-filtered (default `info`).
fn setup_logging(
    run_dir: &std::path::Path,
) -> Result<tracing_appender::non_blocking::WorkerGuard, std::io::Error> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if !run_dir.is_dir() {
        return Err(std::io::Error::other("run directory does not exist"));
    }

    let file_appender = tracing_appender::rolling::never(run_dir, "worker.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(guard)
}
