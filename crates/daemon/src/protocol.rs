// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! IPC protocol between the supervisor and the worker child.
//!
//! Wire format: newline-delimited JSON. Control messages travel on the
//! child's stdin, status messages on its stdout. A malformed line is a
//! protocol error; the supervisor treats it as a worker fault.

use std::io::Write;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Supervisor → worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum ControlMsg {
    /// Gate permitting the worker to pick up new files.
    MayWork { allowed: bool },
    /// Stop the file event source and exit cleanly.
    Shutdown,
}

/// Worker → supervisor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StatusMsg {
    /// The recording is built and the event source is watching.
    Ready,
    /// `done_analyzing` cleared: a file is being analyzed.
    Busy { path: PathBuf },
    /// `done_analyzing` set: the file's results are flushed.
    Analyzed { path: PathBuf, detections: usize },
    /// The exception queue: a fatal error, after which the worker exits.
    Fatal { message: String },
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("malformed message '{line}': {source}")]
    Malformed {
        line: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Encode one message as a single JSON line (newline included).
pub fn encode<T: Serialize>(msg: &T) -> Result<String, ProtocolError> {
    let mut line = serde_json::to_string(msg).map_err(ProtocolError::Encode)?;
    line.push('\n');
    Ok(line)
}

/// Decode one line into a message.
pub fn decode<T: DeserializeOwned>(line: &str) -> Result<T, ProtocolError> {
    serde_json::from_str(line.trim()).map_err(|source| ProtocolError::Malformed {
        line: line.trim().to_string(),
        source,
    })
}

/// Synchronous status emitter used by the worker. Each message is
/// written and flushed as one line so the supervisor's reader sees
/// flag transitions promptly.
pub struct StatusWriter<W: Write> {
    inner: W,
}

impl StatusWriter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self {
            inner: std::io::stdout(),
        }
    }
}

impl<W: Write> StatusWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn send(&mut self, msg: &StatusMsg) -> Result<(), crate::error::WorkerError> {
        let line = encode(msg)?;
        self.inner.write_all(line.as_bytes())?;
        self.inner.flush()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
