// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Crash-safe clean-up reconciliation.
//!
//! Scans sibling run outputs for inputs without a result file,
//! re-analyzes them with the configuration captured in each folder's
//! snapshot, and seals each folder with `missings.txt`. Per-folder
//! failures are recorded and skipped; only an empty scan is fatal.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use faunanet_analyzers::{AnalysisError, PluginRegistry, Recording, RecordingFactory};
use faunanet_core::DeleteRecordings;
use faunanet_storage::{list_inputs, sibling_run_outputs, ResultsSink, RunOutput, SinkError};

use crate::error::CleanupError;

/// What a clean-up pass did.
#[derive(Debug, Default)]
pub struct CleanupReport {
    /// Folders sealed with `missings.txt`, with the inputs re-analyzed
    /// in each.
    pub sealed: Vec<(PathBuf, Vec<PathBuf>)>,
    /// Folders skipped with the failure that stopped them.
    pub skipped: Vec<(PathBuf, String)>,
}

/// One folder's reconciliation failure; recorded, not raised.
#[derive(Debug, Error)]
enum FolderError {
    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("could not delete analyzed recording {path}: {source}")]
    DeleteRecording {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("analysis task panicked: {0}")]
    Panicked(String),
}

pub(crate) async fn run(
    output_root: &Path,
    current: Option<&Path>,
    worker_busy: bool,
    registry: Arc<PluginRegistry>,
) -> Result<CleanupReport, CleanupError> {
    if worker_busy {
        warn!("worker is processing the current output folder; only the other folders are cleaned up");
    }

    let folders = sibling_run_outputs(output_root, current)?;
    if folders.is_empty() {
        return Err(CleanupError::NoFolders);
    }

    let mut report = CleanupReport::default();
    for folder in folders {
        match reconcile_folder(&folder, &registry).await {
            Ok(missings) => {
                info!(
                    folder = %folder.path.display(),
                    reanalyzed = missings.len(),
                    "run output sealed"
                );
                report.sealed.push((folder.path, missings));
            }
            Err(e) => {
                warn!(folder = %folder.path.display(), "clean-up skipped folder: {e}");
                report.skipped.push((folder.path, e.to_string()));
            }
        }
    }
    Ok(report)
}

/// Re-analyze every input of one folder that has no result file, then
/// seal the folder. Returns the re-analyzed inputs.
async fn reconcile_folder(
    folder: &RunOutput,
    registry: &Arc<PluginRegistry>,
) -> Result<Vec<PathBuf>, FolderError> {
    let snapshot = folder.read_snapshot()?;
    let analysis = &snapshot.analysis;

    let factory = RecordingFactory::new(Arc::clone(registry), PathBuf::from(&analysis.model_dir));
    let mut recording = factory.build(
        &analysis.model_name,
        &analysis.preprocessor,
        &analysis.model,
        &analysis.recording,
        analysis.species_predictor.as_ref(),
    )?;

    let inputs = list_inputs(&snapshot.input(), &analysis.pattern)?;
    let mut missings = Vec::new();

    for input in inputs {
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("recording")
            .to_string();
        if folder.has_result_for(&stem) {
            continue;
        }

        recording.path = input.clone();
        recording.analyzed = false;
        recording = analyze_blocking(recording).await?;

        ResultsSink::write(&folder.path, &stem, recording.detections())?;
        missings.push(input.clone());

        if analysis.delete_recordings == DeleteRecordings::Always {
            std::fs::remove_file(&input).map_err(|source| FolderError::DeleteRecording {
                path: input.clone(),
                source,
            })?;
        }
    }

    folder.write_missings(&missings)?;
    Ok(missings)
}

async fn analyze_blocking(mut recording: Recording) -> Result<Recording, FolderError> {
    let (returned, result) = tokio::task::spawn_blocking(move || {
        let result = recording.analyze();
        (recording, result)
    })
    .await
    .map_err(|e| FolderError::Panicked(e.to_string()))?;
    recording = returned;
    result?;
    Ok(recording)
}

#[cfg(test)]
#[path = "cleanup_tests.rs"]
mod tests;
