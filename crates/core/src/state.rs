// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control-plane state machine.
//!
//! ```text
//!               ┌───────┐    start       ┌──────────┐
//!               │ IDLE  │ ──────────────▶│ RUNNING  │
//!               └───────┘                └────┬─────┘
//!                   ▲                         │
//!                   │                pause    │  resume
//!                   │                         ▼
//!              stop │                   ┌──────────┐
//!                   │                   │ SLEEPING │
//!                   │                   └────┬─────┘
//!                   │                        │
//!                   └────────── stop ────────┘
//! ```
//!
//! The command layer is (parse args) → (query state) → (execute the
//! transition or print the diagnostic). `transition` is the single
//! table deciding which commands are legal in which state.

use std::fmt;

use thiserror::Error;

/// Observable state of the watcher supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    /// No worker process exists.
    Idle,
    /// Worker alive and permitted to pick up work.
    Running,
    /// Worker alive but `may_work` cleared.
    Sleeping,
}

impl ControlState {
    /// Worker process exists and is alive.
    pub fn is_running(&self) -> bool {
        matches!(self, ControlState::Running | ControlState::Sleeping)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ControlState::Idle => "idle",
            ControlState::Running => "running",
            ControlState::Sleeping => "sleeping",
        }
    }
}

impl fmt::Display for ControlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A control command issued against the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Start,
    Stop,
    Pause,
    Resume,
    Restart,
    ChangeAnalyzer,
    CleanUp,
    Status,
    Exit,
}

impl ControlCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlCommand::Start => "start",
            ControlCommand::Stop => "stop",
            ControlCommand::Pause => "pause",
            ControlCommand::Resume => "go_on",
            ControlCommand::Restart => "restart",
            ControlCommand::ChangeAnalyzer => "change_analyzer",
            ControlCommand::CleanUp => "cleanup",
            ControlCommand::Status => "status",
            ControlCommand::Exit => "exit",
        }
    }
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed event produced by a legal transition; the supervisor executes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandEvent {
    SpawnWorker,
    HaltWorker,
    SuspendWorker,
    ResumeWorker,
    RestartWorker,
    SwapAnalyzer,
    Reconcile,
    Report,
    Shutdown,
}

/// A command was issued in a state that does not permit it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("cannot {command} while the watcher is {state}")]
pub struct PreconditionViolated {
    pub command: ControlCommand,
    pub state: ControlState,
}

/// The transition table of the control plane.
///
/// `change_analyzer` requires a running, non-sleeping worker; `start`
/// requires no worker; `stop`/`pause`/`go_on`/`restart` require a live
/// worker (`go_on` is idempotent and legal while running). `cleanup`,
/// `status`, and `exit` are legal in every state.
pub fn transition(
    state: ControlState,
    command: ControlCommand,
) -> Result<CommandEvent, PreconditionViolated> {
    use ControlCommand as Cmd;
    use ControlState as St;

    let violated = || PreconditionViolated { command, state };

    match (state, command) {
        (St::Idle, Cmd::Start) => Ok(CommandEvent::SpawnWorker),
        (St::Running | St::Sleeping, Cmd::Start) => Err(violated()),

        (St::Running | St::Sleeping, Cmd::Stop) => Ok(CommandEvent::HaltWorker),
        (St::Idle, Cmd::Stop) => Err(violated()),

        (St::Running | St::Sleeping, Cmd::Pause) => Ok(CommandEvent::SuspendWorker),
        (St::Idle, Cmd::Pause) => Err(violated()),

        (St::Running | St::Sleeping, Cmd::Resume) => Ok(CommandEvent::ResumeWorker),
        (St::Idle, Cmd::Resume) => Err(violated()),

        (St::Running | St::Sleeping, Cmd::Restart) => Ok(CommandEvent::RestartWorker),
        (St::Idle, Cmd::Restart) => Err(violated()),

        (St::Running, Cmd::ChangeAnalyzer) => Ok(CommandEvent::SwapAnalyzer),
        (St::Idle | St::Sleeping, Cmd::ChangeAnalyzer) => Err(violated()),

        (_, Cmd::CleanUp) => Ok(CommandEvent::Reconcile),
        (_, Cmd::Status) => Ok(CommandEvent::Report),
        (_, Cmd::Exit) => Ok(CommandEvent::Shutdown),
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
