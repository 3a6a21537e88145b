// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervisor-side and worker-side error taxonomy.
//!
//! Configuration and control-state errors are recovered at the command
//! layer; worker errors terminate the run and surface through the fault
//! queue; swap errors trigger best-effort rollback and re-raise.

use std::path::PathBuf;

use thiserror::Error;

use faunanet_analyzers::AnalysisError;
use faunanet_core::{ConfigError, PreconditionViolated};
use faunanet_storage::SinkError;

use crate::fs_events::WatchError;
use crate::protocol::ProtocolError;

/// Control-plane failures raised by the supervisor.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("watcher process still running, stop first")]
    AlreadyRunning,

    #[error(transparent)]
    Precondition(#[from] PreconditionViolated),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Something went wrong when starting the watcher process, undoing changes and returning")]
    StartFailed(#[source] Box<ControlError>),

    #[error("worker did not signal ready: {0}")]
    WorkerNotReady(String),

    #[error("failed to spawn worker process: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("failed to signal the worker process: {0}")]
    Signal(#[source] std::io::Error),

    #[error("Something went wrong when trying to stop the watcher process")]
    StopFailed(#[source] std::io::Error),

    #[error("Error when while trying to change the watcher process, any changes made have been undone")]
    SwapFailed(#[source] Box<ControlError>),

    #[error("Error when cleaning up data after analyzer change")]
    SwapCleanupFailed(#[source] SinkError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Fatal worker-process failures. Each one is reported over the status
/// pipe before the worker exits non-zero.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error(transparent)]
    Watch(#[from] WatchError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("analysis task panicked: {0}")]
    AnalysisPanicked(String),

    #[error("could not delete analyzed recording {path}: {source}")]
    DeleteRecording {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Clean-up reconciliation failures. Fatal only when no folders are
/// eligible; per-folder failures are recorded and skipped.
#[derive(Debug, Error)]
pub enum CleanupError {
    #[error("No output folders found to clean up")]
    NoFolders,

    #[error(transparent)]
    Sink(#[from] SinkError),
}
