// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spawning and controlling the worker child process.
//!
//! The child runs `faunanet-watcherd --run-dir <output>` detached from
//! the terminal's process group, with piped stdio carrying the control
//! and status protocol. The supervisor-side [`WorkerHandle`] mirrors
//! the two flags: it owns the authoritative `may_work` value (forwarded
//! to the child as control messages) while the status reader task is
//! the only writer to `done_analyzing` and the fault queue.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::env;
use crate::error::ControlError;
use crate::protocol::{self, ControlMsg, StatusMsg};
use crate::signals::Flag;

/// Capacity of the bounded exception queue. A full queue drops further
/// messages; the worker exits right after its first fatal anyway.
const FAULT_QUEUE_CAPACITY: usize = 16;

/// Analyzed-file bookkeeping for the current run.
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    pub first_analyzed: Option<PathBuf>,
    pub last_analyzed: Option<PathBuf>,
    pub analyzed_count: u64,
}

pub struct WorkerHandle {
    child: Child,
    stdin: ChildStdin,
    may_work: Flag,
    done_analyzing: Flag,
    fault_rx: mpsc::Receiver<String>,
    stats: Arc<Mutex<RunStats>>,
    reader: JoinHandle<()>,
}

impl WorkerHandle {
    /// Spawn the worker for `run_dir` and wait for its ready handshake.
    ///
    /// `may_work` starts set and `done_analyzing` cleared, matching the
    /// supervisor's start sequence. A child that exits or stays silent
    /// past the handshake window is killed and reported as a failure.
    pub async fn spawn(run_dir: &Path) -> Result<Self, ControlError> {
        let bin = env::watcherd_bin();
        let mut child = Command::new(&bin)
            .arg("--run-dir")
            .arg(run_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .process_group(0)
            .kill_on_drop(true)
            .spawn()
            .map_err(ControlError::Spawn)?;

        let stdin = child.stdin.take().ok_or_else(|| {
            ControlError::Spawn(std::io::Error::other("worker stdin not piped"))
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            ControlError::Spawn(std::io::Error::other("worker stdout not piped"))
        })?;

        let may_work = Flag::new(true);
        let done_analyzing = Flag::new(false);
        let (fault_tx, fault_rx) = mpsc::channel(FAULT_QUEUE_CAPACITY);
        let (ready_tx, ready_rx) = oneshot::channel();
        let stats = Arc::new(Mutex::new(RunStats::default()));

        let reader = spawn_status_reader(
            stdout,
            done_analyzing.clone(),
            fault_tx,
            ready_tx,
            Arc::clone(&stats),
        );

        let mut handle = Self {
            child,
            stdin,
            may_work,
            done_analyzing,
            fault_rx,
            stats,
            reader,
        };

        match tokio::time::timeout(env::ready_timeout(), ready_rx).await {
            Ok(Ok(())) => {
                info!(run_dir = %run_dir.display(), pid = ?handle.child.id(), "worker ready");
                Ok(handle)
            }
            Ok(Err(_)) | Err(_) => {
                // Child died before ready, or never signalled. Give the
                // status reader a moment to surface the fatal message.
                tokio::time::sleep(Duration::from_millis(50)).await;
                let detail = handle
                    .drain_faults()
                    .pop()
                    .unwrap_or_else(|| "handshake timed out".to_string());
                let _ = handle.child.start_kill();
                let _ = handle.child.wait().await;
                handle.reader.abort();
                Err(ControlError::WorkerNotReady(detail))
            }
        }
    }

    /// Whether the child process is still alive.
    pub fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    pub fn may_work(&self) -> bool {
        self.may_work.get()
    }

    pub fn done_analyzing(&self) -> &Flag {
        &self.done_analyzing
    }

    pub fn stats(&self) -> RunStats {
        self.stats.lock().clone()
    }

    /// Set `may_work` and forward the transition to the child.
    pub async fn allow_work(&mut self) -> Result<(), ControlError> {
        self.may_work.set();
        self.send_control(&ControlMsg::MayWork { allowed: true })
            .await
    }

    /// Clear `may_work` and forward the transition to the child.
    pub async fn forbid_work(&mut self) -> Result<(), ControlError> {
        self.may_work.clear();
        self.send_control(&ControlMsg::MayWork { allowed: false })
            .await
    }

    /// Drain the exception queue non-destructively for the caller.
    pub fn drain_faults(&mut self) -> Vec<String> {
        let mut faults = Vec::new();
        while let Ok(fault) = self.fault_rx.try_recv() {
            faults.push(fault);
        }
        faults
    }

    async fn send_control(&mut self, msg: &ControlMsg) -> Result<(), ControlError> {
        let line = protocol::encode(msg)
            .map_err(|e| ControlError::Signal(std::io::Error::other(e.to_string())))?;
        self.stdin
            .write_all(line.as_bytes())
            .await
            .map_err(ControlError::Signal)?;
        self.stdin.flush().await.map_err(ControlError::Signal)
    }

    /// Terminate the child: SIGTERM, a bounded join, then SIGKILL.
    pub async fn terminate(mut self, join_window: Duration) -> Result<(), ControlError> {
        if let Some(pid) = self.child.id() {
            if let Err(e) = kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
                // ESRCH means the child is already gone; reap it below
                if e != nix::errno::Errno::ESRCH {
                    self.reader.abort();
                    return Err(ControlError::StopFailed(std::io::Error::other(e)));
                }
            }
        }

        match tokio::time::timeout(join_window, self.child.wait()).await {
            Ok(Ok(status)) => {
                info!(?status, "worker terminated");
            }
            Ok(Err(e)) => {
                self.reader.abort();
                return Err(ControlError::StopFailed(e));
            }
            Err(_) => {
                warn!("worker did not exit after SIGTERM, killing");
                let _ = self.child.start_kill();
                let _ = self.child.wait().await;
            }
        }

        self.reader.abort();
        Ok(())
    }
}

fn spawn_status_reader(
    stdout: tokio::process::ChildStdout,
    done_analyzing: Flag,
    fault_tx: mpsc::Sender<String>,
    ready_tx: oneshot::Sender<()>,
    stats: Arc<Mutex<RunStats>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ready_tx = Some(ready_tx);
        let mut lines = BufReader::new(stdout).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            match protocol::decode::<StatusMsg>(&line) {
                Ok(StatusMsg::Ready) => {
                    if let Some(tx) = ready_tx.take() {
                        let _ = tx.send(());
                    }
                }
                Ok(StatusMsg::Busy { path }) => {
                    done_analyzing.clear();
                    tracing::debug!(path = %path.display(), "worker busy");
                }
                Ok(StatusMsg::Analyzed { path, detections }) => {
                    {
                        let mut stats = stats.lock();
                        if stats.first_analyzed.is_none() {
                            stats.first_analyzed = Some(path.clone());
                        }
                        stats.last_analyzed = Some(path.clone());
                        stats.analyzed_count += 1;
                    }
                    done_analyzing.set();
                    tracing::debug!(path = %path.display(), detections, "worker finished file");
                }
                Ok(StatusMsg::Fatal { message }) => {
                    warn!("worker fault: {message}");
                    let _ = fault_tx.try_send(message);
                }
                Err(e) => {
                    let _ = fault_tx.try_send(format!("malformed status message: {e}"));
                }
            }
        }
        // Pipe closed: the worker is quiescent for good
        done_analyzing.set();
    })
}
