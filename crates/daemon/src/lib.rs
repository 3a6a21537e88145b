// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! faunanet-daemon: the watcher supervisor and its worker process.
//!
//! Architecture:
//! - Supervisor: owns the worker child process, the run output
//!   directories, and the control plane (start/pause/resume/stop/
//!   restart/swap/clean-up).
//! - Worker (`faunanet-watcherd`): owns the file event source and the
//!   recording; analyzes each new input to completion as a unit.
//! - The only cross-process state is the `may_work`/`done_analyzing`
//!   flag pair, mirrored over the child's stdio pipe protocol, plus the
//!   bounded fault queue fed by `fatal` status messages.

pub mod cleanup;
pub mod env;
pub mod error;
pub mod fs_events;
pub mod protocol;
pub mod signals;
pub mod spawn;
pub mod watcher;
pub mod worker;

pub use cleanup::CleanupReport;
pub use error::{CleanupError, ControlError, WorkerError};
pub use fs_events::{FileEvent, FileEventSource, NotifyEventSource, PollingEventSource, WatchError};
pub use protocol::{ControlMsg, ProtocolError, StatusMsg};
pub use signals::Flag;
pub use spawn::{RunStats, WorkerHandle};
pub use watcher::{AnalyzerChange, Watcher, WatcherStatus};
pub use worker::WorkerLoop;
