// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The watcher supervisor: validates the configuration, owns the run
//! output directories and the worker child process, and executes the
//! control-plane transitions.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use faunanet_analyzers::PluginRegistry;
use faunanet_core::{
    run_dir_name, transition, Clock, ConfigError, ControlCommand, ControlState, DeleteRecordings,
    SystemClock, WatcherConfig,
};
use faunanet_core::config::{ConfigBlock, DEFAULT_CHECK_TIME, DEFAULT_PATTERN};
use faunanet_storage::{list_inputs, ConfigSnapshot, RunOutput};

use crate::cleanup::{self, CleanupReport};
use crate::env;
use crate::error::{CleanupError, ControlError};
use crate::spawn::{RunStats, WorkerHandle};

/// Replacement parameters for an analyzer swap. Unset config blocks
/// default to empty mappings, like at construction.
#[derive(Debug, Clone)]
pub struct AnalyzerChange {
    pub model_name: String,
    pub preprocessor: Option<ConfigBlock>,
    pub model: Option<ConfigBlock>,
    pub recording: Option<ConfigBlock>,
    pub species_predictor: Option<ConfigBlock>,
    pub pattern: String,
    pub check_time: u64,
    pub delete_recordings: DeleteRecordings,
}

impl AnalyzerChange {
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            preprocessor: None,
            model: None,
            recording: None,
            species_predictor: None,
            pattern: DEFAULT_PATTERN.to_string(),
            check_time: DEFAULT_CHECK_TIME,
            delete_recordings: DeleteRecordings::Never,
        }
    }
}

/// Snapshot of the observable supervisor state for the command layer.
#[derive(Debug, Clone)]
pub struct WatcherStatus {
    pub state: ControlState,
    pub may_do_work: bool,
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub old_output: Option<PathBuf>,
    pub model_name: String,
    pub pattern: String,
    pub delete_recordings: DeleteRecordings,
    pub stats: RunStats,
}

pub struct Watcher<C: Clock = SystemClock> {
    config: WatcherConfig,
    clock: C,
    registry: Arc<PluginRegistry>,
    output: Option<PathBuf>,
    old_output: Option<PathBuf>,
    worker: Option<WorkerHandle>,
    /// Faults drained from dead workers, kept until the command layer
    /// collects them.
    faults: Vec<String>,
}

impl Watcher<SystemClock> {
    /// Validate the configuration and create an idle supervisor.
    pub fn new(config: WatcherConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> Watcher<C> {
    pub fn with_clock(config: WatcherConfig, clock: C) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            clock,
            registry: Arc::new(PluginRegistry::builtin()),
            output: None,
            old_output: None,
            worker: None,
            faults: Vec::new(),
        })
    }

    pub fn config(&self) -> &WatcherConfig {
        &self.config
    }

    pub fn input_directory(&self) -> &Path {
        &self.config.input
    }

    /// The current run output directory; exists iff the supervisor has
    /// started at least once.
    pub fn output_directory(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    /// The previous run output, set by an analyzer swap.
    pub fn old_output(&self) -> Option<&Path> {
        self.old_output.as_deref()
    }

    /// Worker process exists and is alive.
    pub fn is_running(&mut self) -> bool {
        self.worker.as_mut().is_some_and(WorkerHandle::is_alive)
    }

    /// Alive but `may_work` cleared.
    pub fn is_sleeping(&mut self) -> bool {
        self.control_state() == ControlState::Sleeping
    }

    pub fn may_do_work(&self) -> bool {
        self.worker.as_ref().is_some_and(WorkerHandle::may_work)
    }

    pub fn control_state(&mut self) -> ControlState {
        if !self.is_running() {
            ControlState::Idle
        } else if self.may_do_work() {
            ControlState::Running
        } else {
            ControlState::Sleeping
        }
    }

    pub fn status(&mut self) -> WatcherStatus {
        WatcherStatus {
            state: self.control_state(),
            may_do_work: self.may_do_work(),
            input: self.config.input.clone(),
            output: self.output.clone(),
            old_output: self.old_output.clone(),
            model_name: self.config.model_name.clone(),
            pattern: self.config.pattern.clone(),
            delete_recordings: self.config.delete_recordings,
            stats: self
                .worker
                .as_ref()
                .map(WorkerHandle::stats)
                .unwrap_or_default(),
        }
    }

    /// Worker faults observed since the last drain, oldest first.
    pub fn drain_faults(&mut self) -> Vec<String> {
        let mut faults = std::mem::take(&mut self.faults);
        if let Some(worker) = self.worker.as_mut() {
            faults.extend(worker.drain_faults());
        }
        faults
    }

    /// Start the worker on a fresh timestamped run output directory.
    pub async fn start(&mut self) -> Result<(), ControlError> {
        if self.is_running() {
            return Err(ControlError::AlreadyRunning);
        }
        self.retire_dead_worker();

        let run_dir = self.config.output_root.join(run_dir_name(&self.clock));
        match self.try_start(&run_dir).await {
            Ok(handle) => {
                info!(output = %run_dir.display(), "watcher started");
                self.worker = Some(handle);
                self.output = Some(run_dir);
                Ok(())
            }
            Err(e) => {
                // Undo the partially created run directory
                if run_dir.is_dir() {
                    if let Err(remove_err) = std::fs::remove_dir_all(&run_dir) {
                        warn!(
                            "could not remove partial run directory {}: {remove_err}",
                            run_dir.display()
                        );
                    }
                }
                Err(ControlError::StartFailed(Box::new(e)))
            }
        }
    }

    async fn try_start(&self, run_dir: &Path) -> Result<WorkerHandle, ControlError> {
        std::fs::create_dir_all(run_dir).map_err(|source| ControlError::Io {
            path: run_dir.to_path_buf(),
            source,
        })?;
        ConfigSnapshot::capture(&self.config, run_dir).write(run_dir)?;
        WorkerHandle::spawn(run_dir).await
    }

    /// Pause: wait for the current file to finish, then close the gate.
    pub async fn pause(&mut self) -> Result<(), ControlError> {
        transition(self.control_state(), ControlCommand::Pause)?;
        let worker = self.require_worker(ControlCommand::Pause)?;
        worker.done_analyzing().wait().await;
        worker.forbid_work().await?;
        info!("watcher paused");
        Ok(())
    }

    /// Resume a paused worker. Idempotent while the worker is alive.
    pub async fn go_on(&mut self) -> Result<(), ControlError> {
        transition(self.control_state(), ControlCommand::Resume)?;
        let worker = self.require_worker(ControlCommand::Resume)?;
        worker.allow_work().await?;
        info!("watcher continuing");
        Ok(())
    }

    /// Stop the worker: wait (bounded) for quiescence, then terminate.
    pub async fn stop(&mut self) -> Result<(), ControlError> {
        transition(self.control_state(), ControlCommand::Stop)?;
        let Some(mut worker) = self.worker.take() else {
            return Err(idle_violation(ControlCommand::Stop));
        };

        if !worker.done_analyzing().wait_timeout(env::stop_timeout()).await {
            warn!("stop timeout expired, terminating watcher process now");
        }

        self.faults.extend(worker.drain_faults());
        worker.terminate(env::join_timeout()).await?;
        info!("watcher stopped");
        Ok(())
    }

    /// Restart the worker process. Used when configuration shared with
    /// the worker has changed.
    pub async fn restart(&mut self) -> Result<(), ControlError> {
        info!("restarting the watcher process");
        self.stop().await?;
        self.start().await
    }

    /// Atomically swap the analyzer: snapshot the configuration,
    /// overwrite it, restart, and roll everything back if the restart
    /// fails. On success the previous run output is sealed with a
    /// batch manifest of its inputs.
    pub async fn change_analyzer(&mut self, change: AnalyzerChange) -> Result<(), ControlError> {
        transition(self.control_state(), ControlCommand::ChangeAnalyzer)?;
        if !self.config.model_dir.join(&change.model_name).is_dir() {
            return Err(ConfigError::UnknownModel(change.model_name).into());
        }
        if change.check_time == 0 {
            return Err(ConfigError::CheckTimeZero.into());
        }

        info!(model = %change.model_name, "changing analyzer");
        let previous_config = self.config.clone();
        self.old_output = self.output.clone();

        self.config.model_name = change.model_name;
        self.config.preprocessor = change.preprocessor.unwrap_or_default();
        self.config.model = change.model.unwrap_or_default();
        self.config.recording = change.recording.unwrap_or_default();
        self.config.species_predictor = change.species_predictor;
        self.config.pattern = change.pattern;
        self.config.check_time = change.check_time;
        self.config.delete_recordings = change.delete_recordings;

        if let Err(restart_err) = self.restart().await {
            // Restore every snapshotted field, then get back to a
            // well-defined idle state.
            self.config = previous_config;
            self.old_output = None;
            self.output = Some(self.config.output_root.join(run_dir_name(&self.clock)));
            if self.is_running() {
                if let Err(stop_err) = self.stop().await {
                    warn!("rollback stop failed: {stop_err}");
                }
            }
            warn!("analyzer change failed, previous configuration restored");
            return Err(ControlError::SwapFailed(Box::new(restart_err)));
        }

        if let Err(seal_err) = self.seal_old_output() {
            return Err(ControlError::SwapCleanupFailed(seal_err));
        }
        Ok(())
    }

    /// Seal the previous run output with a manifest of the inputs it
    /// covered.
    fn seal_old_output(&self) -> Result<(), faunanet_storage::SinkError> {
        let Some(old) = self.old_output.as_deref() else {
            return Ok(());
        };
        let run = RunOutput::new(old);
        let snapshot = run.read_snapshot()?;
        let inputs = list_inputs(&snapshot.input(), &snapshot.analysis.pattern)?;
        run.write_batch_manifest(&inputs)?;
        info!(folder = %old.display(), inputs = inputs.len(), "previous run output sealed with batch manifest");
        Ok(())
    }

    /// Reconcile sibling run outputs: re-analyze inputs that have no
    /// result file and seal each folder with `missings.txt`.
    pub async fn clean_up(&mut self) -> Result<CleanupReport, CleanupError> {
        let worker_busy = self.is_running()
            && !self
                .worker
                .as_ref()
                .map(|w| w.done_analyzing().get())
                .unwrap_or(true);
        cleanup::run(
            &self.config.output_root,
            self.output.as_deref(),
            worker_busy,
            Arc::clone(&self.registry),
        )
        .await
    }

    /// Drop the handle of a worker that died on its own, keeping its
    /// faults for the command layer.
    fn retire_dead_worker(&mut self) {
        if let Some(mut worker) = self.worker.take() {
            self.faults.extend(worker.drain_faults());
        }
    }

    fn require_worker(&mut self, command: ControlCommand) -> Result<&mut WorkerHandle, ControlError> {
        match self.worker.as_mut() {
            Some(worker) => Ok(worker),
            None => Err(idle_violation(command)),
        }
    }
}

fn idle_violation(command: ControlCommand) -> ControlError {
    ControlError::Precondition(faunanet_core::PreconditionViolated {
        command,
        state: ControlState::Idle,
    })
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
