// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Watcher configuration: validated at construction, immutable per run,
//! replaced atomically on analyzer swap.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Opaque sub-configuration mapping (preprocessor, model, recording,
/// species-predictor blocks). Deep-copied on entry via `Clone`.
pub type ConfigBlock = serde_yaml::Mapping;

/// Default file suffix for new recordings.
pub const DEFAULT_PATTERN: &str = ".wav";

/// Default worker tick interval in seconds.
pub const DEFAULT_CHECK_TIME: u64 = 1;

/// Mode for input data clean up. `Never` keeps recordings around
/// indefinitely; `Always` deletes a recording immediately after analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteRecordings {
    #[default]
    Never,
    Always,
}

impl DeleteRecordings {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeleteRecordings::Never => "never",
            DeleteRecordings::Always => "always",
        }
    }
}

impl fmt::Display for DeleteRecordings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeleteRecordings {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "never" => Ok(DeleteRecordings::Never),
            "always" => Ok(DeleteRecordings::Always),
            other => Err(ConfigError::InvalidDeleteRecordings(other.to_string())),
        }
    }
}

/// The full set of parameters a watcher run is created with.
///
/// The four sub-config blocks are opaque to the core; they are handed
/// through to the analyzer plugin unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct WatcherConfig {
    /// Directory to read recordings from.
    pub input: PathBuf,
    /// Directory under which timestamped run output directories are created.
    pub output_root: PathBuf,
    /// Directory where model bundles are stored.
    pub model_dir: PathBuf,
    /// Name of the model to use; must match a subdirectory of `model_dir`.
    pub model_name: String,
    /// File suffix to look for, with leading dot.
    pub pattern: String,
    /// Worker tick interval in seconds, >= 1.
    pub check_time: u64,
    pub delete_recordings: DeleteRecordings,
    pub preprocessor: ConfigBlock,
    pub model: ConfigBlock,
    pub recording: ConfigBlock,
    pub species_predictor: Option<ConfigBlock>,
}

impl WatcherConfig {
    /// Create a config with default pattern/check_time/delete_recordings
    /// and empty sub-config blocks. Not validated; call [`validate`].
    ///
    /// [`validate`]: WatcherConfig::validate
    pub fn new(
        input: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
        model_dir: impl Into<PathBuf>,
        model_name: impl Into<String>,
    ) -> Self {
        Self {
            input: input.into(),
            output_root: output_root.into(),
            model_dir: model_dir.into(),
            model_name: model_name.into(),
            pattern: DEFAULT_PATTERN.to_string(),
            check_time: DEFAULT_CHECK_TIME,
            delete_recordings: DeleteRecordings::Never,
            preprocessor: ConfigBlock::new(),
            model: ConfigBlock::new(),
            recording: ConfigBlock::new(),
            species_predictor: None,
        }
    }

    /// Validate the configuration against the filesystem.
    ///
    /// Checked in order: input directory, output root, model directory,
    /// the named model subdirectory, and `check_time`. Each failure is a
    /// distinct [`ConfigError`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.input.is_dir() {
            return Err(ConfigError::InputDirMissing(self.input.clone()));
        }
        if !self.output_root.is_dir() {
            return Err(ConfigError::OutputRootMissing(self.output_root.clone()));
        }
        if !self.model_dir.is_dir() {
            return Err(ConfigError::ModelDirMissing(self.model_dir.clone()));
        }
        if !self.model_path().is_dir() {
            return Err(ConfigError::UnknownModel(self.model_name.clone()));
        }
        if self.check_time == 0 {
            return Err(ConfigError::CheckTimeZero);
        }
        Ok(())
    }

    /// Path to the active model bundle: `model_dir/model_name`.
    pub fn model_path(&self) -> PathBuf {
        self.model_dir.join(&self.model_name)
    }

    /// Whether `path` names a regular file with the configured suffix.
    pub fn matches_pattern(&self, path: &Path) -> bool {
        suffix_of(path).is_some_and(|s| s == self.pattern)
    }
}

/// The suffix of a path including the leading dot, e.g. `".wav"`.
pub fn suffix_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
