// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! faunanet: interactive shell over the watcher supervisor.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod args;
mod config_file;
mod repl;

use std::process::ExitCode;

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "faunanet",
    version,
    about = "Acoustic classification watcher shell. Type 'help' inside for commands."
)]
struct Cli {}

#[tokio::main]
async fn main() -> ExitCode {
    let _cli = Cli::parse();
    setup_logging();

    match repl::Repl::new().run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("An error occured: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Shell diagnostics go to stderr so command output stays clean.
fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_ansi(false))
        .init();
}
