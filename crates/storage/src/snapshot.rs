// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `config.yml` snapshot: the watcher configuration at the moment a
//! run output directory was created, including which model is active.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use faunanet_core::{ConfigBlock, DeleteRecordings, WatcherConfig};

use crate::error::SinkError;
use crate::run_output::CONFIG_FILE;

/// The single mapping written to `config.yml`. The `Analysis` root is
/// mandatory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    #[serde(rename = "Analysis")]
    pub analysis: AnalysisSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSection {
    pub input: String,
    pub output: String,
    pub check_time: u64,
    pub delete_recordings: DeleteRecordings,
    pub pattern: String,
    pub model_name: String,
    pub model_dir: String,
    #[serde(rename = "Preprocessor")]
    pub preprocessor: ConfigBlock,
    #[serde(rename = "Model")]
    pub model: ConfigBlock,
    #[serde(rename = "Recording")]
    pub recording: ConfigBlock,
    #[serde(rename = "SpeciesPredictor", default)]
    pub species_predictor: Option<ConfigBlock>,
}

impl ConfigSnapshot {
    /// Capture the watcher configuration for the run writing to `output`.
    ///
    /// The model name is echoed into the `Model` mapping as `name`.
    pub fn capture(config: &WatcherConfig, output: &Path) -> Self {
        let mut model = config.model.clone();
        model.insert(
            serde_yaml::Value::from("name"),
            serde_yaml::Value::from(config.model_name.as_str()),
        );

        Self {
            analysis: AnalysisSection {
                input: config.input.display().to_string(),
                output: output.display().to_string(),
                check_time: config.check_time,
                delete_recordings: config.delete_recordings,
                pattern: config.pattern.clone(),
                model_name: config.model_name.clone(),
                model_dir: config.model_dir.display().to_string(),
                preprocessor: config.preprocessor.clone(),
                model,
                recording: config.recording.clone(),
                species_predictor: config.species_predictor.clone(),
            },
        }
    }

    /// Write the snapshot to `run_dir/config.yml`.
    pub fn write(&self, run_dir: &Path) -> Result<(), SinkError> {
        let path = run_dir.join(CONFIG_FILE);
        let text = serde_yaml::to_string(self).map_err(|source| SinkError::Yaml {
            path: path.clone(),
            source,
        })?;
        std::fs::write(&path, text).map_err(|source| SinkError::io(&path, source))
    }

    /// Read the snapshot from `run_dir/config.yml`.
    pub fn read(run_dir: &Path) -> Result<Self, SinkError> {
        let path = run_dir.join(CONFIG_FILE);
        let text =
            std::fs::read_to_string(&path).map_err(|source| SinkError::io(&path, source))?;
        serde_yaml::from_str(&text).map_err(|source| SinkError::Yaml { path, source })
    }

    pub fn input(&self) -> PathBuf {
        PathBuf::from(&self.analysis.input)
    }

    pub fn output(&self) -> PathBuf {
        PathBuf::from(&self.analysis.output)
    }

    /// Rebuild a watcher configuration from the snapshot. The output
    /// root is the parent of the recorded run directory.
    pub fn to_watcher_config(&self) -> WatcherConfig {
        let output = self.output();
        let output_root = output
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| output.clone());
        WatcherConfig {
            input: self.input(),
            output_root,
            model_dir: PathBuf::from(&self.analysis.model_dir),
            model_name: self.analysis.model_name.clone(),
            pattern: self.analysis.pattern.clone(),
            check_time: self.analysis.check_time,
            delete_recordings: self.analysis.delete_recordings,
            preprocessor: self.analysis.preprocessor.clone(),
            model: self.analysis.model.clone(),
            recording: self.analysis.recording.clone(),
            species_predictor: self.analysis.species_predictor.clone(),
        }
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
