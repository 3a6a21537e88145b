// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The interactive shell: parse a line, query the watcher state, then
//! execute the transition or print the diagnostic. All failures are
//! recovered here; only shell I/O errors terminate the process.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use faunanet_daemon::{ControlError, Watcher, WatcherStatus};

use crate::args::{expect_no_args, parse_kwargs};
use crate::config_file;

const PROMPT: &str = "(faunanet) ";
const INTRO: &str = "Welcome to faunanet! Type help or ? to list commands.";

/// One parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ShellCommand {
    Empty,
    Help,
    Start { args: String },
    Stop { args: String },
    Pause { args: String },
    GoOn { args: String },
    Restart { args: String },
    ChangeAnalyzer { args: String },
    Status { args: String },
    Cleanup { args: String },
    Exit { args: String },
    Unknown(String),
}

pub(crate) fn parse_command(line: &str) -> ShellCommand {
    let line = line.trim();
    if line.is_empty() {
        return ShellCommand::Empty;
    }
    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim().to_string()),
        None => (line, String::new()),
    };
    match name {
        "help" | "?" => ShellCommand::Help,
        "start" => ShellCommand::Start { args: rest },
        "stop" => ShellCommand::Stop { args: rest },
        "pause" => ShellCommand::Pause { args: rest },
        "go_on" => ShellCommand::GoOn { args: rest },
        "restart" => ShellCommand::Restart { args: rest },
        "change_analyzer" => ShellCommand::ChangeAnalyzer { args: rest },
        "status" => ShellCommand::Status { args: rest },
        "cleanup" => ShellCommand::Cleanup { args: rest },
        "exit" => ShellCommand::Exit { args: rest },
        other => ShellCommand::Unknown(other.to_string()),
    }
}

pub(crate) struct Repl {
    watcher: Option<Watcher>,
}

impl Repl {
    pub(crate) fn new() -> Self {
        Self { watcher: None }
    }

    pub(crate) async fn run(mut self) -> Result<()> {
        println!("{INTRO}");
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            print!("{PROMPT}");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                // EOF: leave like an explicit exit
                self.handle_exit().await;
                break;
            };

            let command = parse_command(&line);
            let leave = self.dispatch(command).await;
            self.report_faults();
            if leave {
                break;
            }
        }
        Ok(())
    }

    /// Execute one command; returns whether the shell should exit.
    async fn dispatch(&mut self, command: ShellCommand) -> bool {
        match command {
            ShellCommand::Empty => {}
            ShellCommand::Help => print_help(),
            ShellCommand::Start { args } => self.do_start(&args).await,
            ShellCommand::Stop { args } => self.do_stop(&args).await,
            ShellCommand::Pause { args } => self.do_pause(&args).await,
            ShellCommand::GoOn { args } => self.do_go_on(&args).await,
            ShellCommand::Restart { args } => self.do_restart(&args).await,
            ShellCommand::ChangeAnalyzer { args } => self.do_change_analyzer(&args).await,
            ShellCommand::Status { args } => self.do_status(&args),
            ShellCommand::Cleanup { args } => self.do_cleanup(&args).await,
            ShellCommand::Exit { args } => {
                if expect_no_args(&args).map_err(|e| println!("{e}")).is_err() {
                    return false;
                }
                self.handle_exit().await;
                println!("Exiting faunanet shell");
                return true;
            }
            ShellCommand::Unknown(name) => println!("Unknown command: {name}"),
        }
        false
    }

    async fn do_start(&mut self, args: &str) {
        let kwargs = match parse_kwargs(args, &["cfg"]) {
            Ok(kwargs) => kwargs,
            Err(e) => {
                println!("{e}");
                return;
            }
        };
        let cfg_path = kwargs.get("cfg").map(|p| config_file::expand_user(p));
        if cfg_path.is_none() {
            println!("No config file provided, falling back to default");
        }

        let Some(watcher) = self.watcher.as_mut() else {
            let config = match config_file::load_watcher_config(cfg_path.as_deref()) {
                Ok(config) => config,
                Err(e) => {
                    println!("An error occured while trying to build the watcher: {e:#}");
                    return;
                }
            };
            let mut watcher = match Watcher::new(config) {
                Ok(watcher) => watcher,
                Err(e) => {
                    println!("An error occured while trying to build the watcher: {e}");
                    return;
                }
            };
            if let Err(e) = watcher.start().await {
                println!(
                    "Something went wrong while trying to start the watcher: {e}. \
                     A new start attempt can be made when the error has been addressed."
                );
            }
            // Keep the watcher either way, like a shell session would
            self.watcher = Some(watcher);
            return;
        };

        if watcher.is_running() {
            println!(
                "The watcher is running. Cannot be started again with different parameters. \
                 Try 'change_analyzer' to use different parameters."
            );
        } else {
            println!(
                "It appears that there is a watcher process that is not running. \
                 Trying to start with current parameters. Use the 'change_analyzer' \
                 command to change the parameters."
            );
            if let Err(e) = watcher.start().await {
                println!(
                    "Something went wrong while trying to start the watcher: {e}. \
                     A new start attempt can be made when the error has been addressed."
                );
            }
        }
    }

    async fn do_stop(&mut self, args: &str) {
        if let Err(e) = expect_no_args(args) {
            println!("{e}");
            return;
        }
        let Some(watcher) = self.watcher.as_mut() else {
            println!("Cannot stop watcher, no watcher present");
            return;
        };
        if !watcher.is_running() {
            println!("Cannot stop watcher, is not running");
            return;
        }
        if let Err(e) = watcher.stop().await {
            println!(
                "Could not stop watcher: {e}. This may have left data in a corrupt \
                 state. A new watcher must be started if this session is to be continued."
            );
            self.watcher = None;
        }
    }

    async fn do_pause(&mut self, args: &str) {
        if let Err(e) = expect_no_args(args) {
            println!("{e}");
            return;
        }
        match &mut self.watcher {
            None => {
                println!("Cannot pause watcher process. No watcher has been created yet. Run 'start' first.")
            }
            Some(watcher) => {
                if !watcher.is_running() {
                    println!("Cannot pause watcher process because it is not running.");
                } else if let Err(e) = watcher.pause().await {
                    println!("Could not pause watcher: {e}");
                } else {
                    println!("Watcher paused.");
                }
            }
        }
    }

    async fn do_go_on(&mut self, args: &str) {
        if let Err(e) = expect_no_args(args) {
            println!("{e}");
            return;
        }
        match &mut self.watcher {
            None => {
                println!("Cannot continue watcher process. No watcher has been created yet. Run 'start' first.")
            }
            Some(watcher) => {
                if !watcher.is_running() {
                    println!("Cannot continue watcher process because it is not running.");
                } else if let Err(e) = watcher.go_on().await {
                    println!("Could not continue watcher: {e}");
                } else {
                    println!("Continuing the watcher process.");
                }
            }
        }
    }

    async fn do_restart(&mut self, args: &str) {
        if let Err(e) = expect_no_args(args) {
            println!("{e}");
            return;
        }
        match &mut self.watcher {
            None => {
                println!("Cannot restart the watcher because it has not yet been created. Run 'start' first.")
            }
            Some(watcher) => {
                if !watcher.is_running() {
                    println!("The watcher is not running. Call 'start' first");
                } else if watcher.is_sleeping() {
                    println!("The watcher is asleep. Continue it first and then restart.");
                } else if let Err(e) = watcher.restart().await {
                    println!(
                        "An error occured when trying to restart the process: {e}. \
                         It may be in an inconsistent state; stop it and start a new one."
                    );
                }
            }
        }
    }

    async fn do_change_analyzer(&mut self, args: &str) {
        let kwargs = match parse_kwargs(args, &["cfg"]) {
            Ok(kwargs) => kwargs,
            Err(e) => {
                println!("{e}");
                return;
            }
        };
        let Some(cfg) = kwargs.get("cfg") else {
            println!("When trying to change the analyzer you must give a new config file.");
            return;
        };

        let Some(watcher) = self.watcher.as_mut() else {
            println!("Watcher has not been created, cannot change analyzer consequently. Run 'start' first.");
            return;
        };

        let change = match config_file::load_analyzer_change(&config_file::expand_user(cfg)) {
            Ok(change) => change,
            Err(e) => {
                println!("Could not read the analyzer config file: {e:#}");
                return;
            }
        };

        match watcher.change_analyzer(change).await {
            Ok(()) => println!("Analyzer changed."),
            Err(e @ ControlError::Precondition(_)) => println!("{e}"),
            Err(e) => println!(
                "An error occured while trying to change the analyzer: {e}. \
                 The watcher has been reset to its initial state, but must be restarted by hand."
            ),
        }
    }

    fn do_status(&mut self, args: &str) {
        if let Err(e) = expect_no_args(args) {
            println!("{e}");
            return;
        }
        match &mut self.watcher {
            None => println!("No existing watcher, run 'start' first."),
            Some(watcher) => print_status(&watcher.status()),
        }
    }

    async fn do_cleanup(&mut self, args: &str) {
        if let Err(e) = expect_no_args(args) {
            println!("{e}");
            return;
        }
        let Some(watcher) = self.watcher.as_mut() else {
            println!("Cannot run cleanup because there is no active watcher process. Run 'start' first.");
            return;
        };
        match watcher.clean_up().await {
            Ok(report) => {
                for (folder, missings) in &report.sealed {
                    println!(
                        "Sealed {} ({} re-analyzed)",
                        folder.display(),
                        missings.len()
                    );
                }
                for (folder, reason) in &report.skipped {
                    println!("Skipped {}: {reason}", folder.display());
                }
            }
            Err(e) => println!("{e}"),
        }
    }

    /// Stop a running watcher before leaving the shell.
    async fn handle_exit(&mut self) {
        if let Some(watcher) = self.watcher.as_mut() {
            if watcher.is_running() {
                if let Err(e) = watcher.stop().await {
                    println!("Could not stop watcher: {e}");
                }
            }
        }
    }

    fn report_faults(&mut self) {
        if let Some(watcher) = self.watcher.as_mut() {
            for fault in watcher.drain_faults() {
                println!("Worker fault: {fault}");
            }
        }
    }
}

fn print_help() {
    println!("Commands:");
    println!("start: start a watcher for analyzing incoming files in a directory. Usage: 'start --cfg=<path>'. Without an argument, the default config is used.");
    println!("stop: stop a previously started watcher");
    println!("pause: pause a running watcher once the current file is finished");
    println!("go_on: continue a paused watcher");
    println!("restart: restart the watcher process");
    println!("change_analyzer: swap the analyzer model. Usage: 'change_analyzer --cfg=<path>'");
    println!("status: show the watcher state");
    println!("cleanup: re-analyze inputs missing from previous run outputs");
    println!("exit: leave this shell.");
}

fn print_status(status: &WatcherStatus) {
    println!("state: {}", status.state);
    println!("may_do_work: {}", status.may_do_work);
    println!("input: {}", status.input.display());
    println!("output: {}", display_opt(&status.output));
    println!("old_output: {}", display_opt(&status.old_output));
    println!("model_name: {}", status.model_name);
    println!("pattern: {}", status.pattern);
    println!("delete_recordings: {}", status.delete_recordings);
    println!("first_analyzed: {}", display_opt(&status.stats.first_analyzed));
    println!("last_analyzed: {}", display_opt(&status.stats.last_analyzed));
    println!("analyzed_count: {}", status.stats.analyzed_count);
}

fn display_opt(path: &Option<PathBuf>) -> String {
    path.as_deref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
#[path = "repl_tests.rs"]
mod tests;
