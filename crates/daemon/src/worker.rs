// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The worker loop, run inside the `faunanet-watcherd` child process.
//!
//! Reads the run directory's `config.yml` snapshot (a value copy — no
//! state is shared with the parent), builds its recording through the
//! factory, then serially analyzes every new input the file event
//! source reports. Control messages arrive on stdin; status messages
//! leave on stdout. Any construction or handler error is reported as a
//! `fatal` status and terminates the process non-zero.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::{mpsc, Notify};
use tracing::{debug, info, warn};

use faunanet_analyzers::{PluginRegistry, Recording, RecordingFactory};
use faunanet_core::{DeleteRecordings, WatcherConfig};
use faunanet_storage::{ConfigSnapshot, ResultsSink};

use crate::error::WorkerError;
use crate::fs_events::{FileEvent, FileEventSource, NotifyEventSource};
use crate::protocol::{self, ControlMsg, StatusMsg, StatusWriter};
use crate::signals::Flag;

pub struct WorkerLoop {
    run_dir: PathBuf,
}

impl WorkerLoop {
    pub fn new(run_dir: impl Into<PathBuf>) -> Self {
        Self {
            run_dir: run_dir.into(),
        }
    }

    /// Run until shutdown or fatal error.
    pub async fn run(self) -> Result<(), WorkerError> {
        let mut status = StatusWriter::stdout();
        match self.run_inner(&mut status).await {
            Ok(()) => Ok(()),
            Err(e) => {
                // Push onto the exception queue before exiting non-zero
                let _ = status.send(&StatusMsg::Fatal {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn run_inner(
        &self,
        status: &mut StatusWriter<std::io::Stdout>,
    ) -> Result<(), WorkerError> {
        let snapshot = ConfigSnapshot::read(&self.run_dir)?;
        let config = snapshot.to_watcher_config();
        let output = snapshot.output();

        // Build the recording inside this process; model artifacts may
        // hold handles that must not cross the process boundary.
        let factory = RecordingFactory::new(Arc::new(PluginRegistry::builtin()), &config.model_dir);
        let mut recording = factory.build(
            &config.model_name,
            &config.preprocessor,
            &config.model,
            &config.recording,
            config.species_predictor.as_ref(),
        )?;
        info!(model = %config.model_name, "recording constructed");

        // may_work mirror, driven by control messages from the parent.
        // The parent sets the flag before spawning, so it starts open.
        let may_work = Arc::new(Flag::new(true));
        let shutdown = Arc::new(Notify::new());
        spawn_control_reader(Arc::clone(&may_work), Arc::clone(&shutdown));

        let (event_tx, mut event_rx) = mpsc::channel(256);
        let mut source = NotifyEventSource::default();
        source.watch(&config.input, true, event_tx)?;

        status.send(&StatusMsg::Ready)?;
        info!(input = %config.input.display(), "watching for new recordings");

        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        let mut tick =
            tokio::time::interval(Duration::from_secs(config.check_time.max(1)));

        loop {
            tokio::select! {
                maybe_event = event_rx.recv() => {
                    match maybe_event {
                        Some(FileEvent::Created(path)) => {
                            if !(path.is_file() && config.matches_pattern(&path)) {
                                continue;
                            }
                            // Block until the parent permits work; a
                            // termination signal cancels the wait.
                            tokio::select! {
                                _ = may_work.wait() => {}
                                _ = shutdown.notified() => break,
                                _ = sigterm.recv() => break,
                            }
                            recording = analyze_one(recording, path, &output, &config, status).await?;
                        }
                        Some(FileEvent::Error(message)) => {
                            source.shutdown();
                            return Err(WorkerError::Watch(
                                crate::fs_events::WatchError::Runtime(message),
                            ));
                        }
                        None => break,
                    }
                }
                _ = shutdown.notified() => {
                    info!("shutdown requested by supervisor");
                    break;
                }
                _ = sigterm.recv() => {
                    info!("received SIGTERM, shutting down");
                    break;
                }
                _ = sigint.recv() => {
                    info!("received SIGINT, shutting down");
                    break;
                }
                // Passive heartbeat; fatal errors surface through the
                // event channel between ticks.
                _ = tick.tick() => {}
            }
        }

        source.shutdown();
        Ok(())
    }
}

/// The per-file critical section. Runs serially: the event loop does
/// not pick up the next file until this returns.
async fn analyze_one(
    mut recording: Recording,
    path: PathBuf,
    output: &Path,
    config: &WatcherConfig,
    status: &mut StatusWriter<std::io::Stdout>,
) -> Result<Recording, WorkerError> {
    status.send(&StatusMsg::Busy { path: path.clone() })?;

    recording.path = path.clone();
    recording.analyzed = false;

    let (returned, result) = tokio::task::spawn_blocking(move || {
        let result = recording.analyze();
        (recording, result)
    })
    .await
    .map_err(|e| WorkerError::AnalysisPanicked(e.to_string()))?;
    recording = returned;
    result?;

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("recording")
        .to_string();
    ResultsSink::write(output, &stem, recording.detections())?;

    status.send(&StatusMsg::Analyzed {
        path: path.clone(),
        detections: recording.detections().len(),
    })?;
    debug!(path = %path.display(), detections = recording.detections().len(), "analysis complete");

    if config.delete_recordings == DeleteRecordings::Always {
        std::fs::remove_file(&path).map_err(|source| WorkerError::DeleteRecording {
            path: path.clone(),
            source,
        })?;
    }

    Ok(recording)
}

/// Read control messages from stdin on a background task. EOF means
/// the parent is gone; the worker shuts down rather than running
/// orphaned.
fn spawn_control_reader(may_work: Arc<Flag>, shutdown: Arc<Notify>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => match protocol::decode::<ControlMsg>(&line) {
                    Ok(ControlMsg::MayWork { allowed: true }) => may_work.set(),
                    Ok(ControlMsg::MayWork { allowed: false }) => may_work.clear(),
                    Ok(ControlMsg::Shutdown) => {
                        shutdown.notify_one();
                        return;
                    }
                    Err(e) => warn!("ignoring malformed control message: {e}"),
                },
                Ok(None) | Err(_) => {
                    shutdown.notify_one();
                    return;
                }
            }
        }
    });
}
