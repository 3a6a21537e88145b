// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The run output directory model.
//!
//! `<output_root>/<yymmdd_hhmmss>/` holds the configuration snapshot
//! and detection records of a single supervisor run. `missings.txt`
//! seals a folder: clean-up skips any run output that already has it.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::SinkError;
use crate::snapshot::ConfigSnapshot;

pub const CONFIG_FILE: &str = "config.yml";
pub const MISSINGS_FILE: &str = "missings.txt";
pub const BATCH_MANIFEST_FILE: &str = "batch_manifest.txt";

/// `results_<stem>.csv`
pub fn results_file_name(stem: &str) -> String {
    format!("results_{stem}.csv")
}

/// One timestamped run output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    pub path: PathBuf,
}

impl RunOutput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A sealed folder needs no further reconciliation.
    pub fn is_sealed(&self) -> bool {
        self.path.join(MISSINGS_FILE).is_file()
    }

    pub fn has_result_for(&self, stem: &str) -> bool {
        self.path.join(results_file_name(stem)).is_file()
    }

    pub fn read_snapshot(&self) -> Result<ConfigSnapshot, SinkError> {
        ConfigSnapshot::read(&self.path)
    }

    /// Stems of all `results_<stem>.csv` files in the folder.
    pub fn result_stems(&self) -> Result<BTreeSet<String>, SinkError> {
        let mut stems = BTreeSet::new();
        let entries = std::fs::read_dir(&self.path)
            .map_err(|source| SinkError::io(&self.path, source))?;
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(stem) = name
                .strip_prefix("results_")
                .and_then(|n| n.strip_suffix(".csv"))
            {
                stems.insert(stem.to_string());
            }
        }
        Ok(stems)
    }

    /// Seal the folder: one path per line, LF-terminated, no header.
    pub fn write_missings(&self, paths: &[PathBuf]) -> Result<(), SinkError> {
        write_path_lines(&self.path.join(MISSINGS_FILE), paths)
    }

    /// Write the manifest of inputs the folder covered when the
    /// analyzer was swapped away from it.
    pub fn write_batch_manifest(&self, paths: &[PathBuf]) -> Result<(), SinkError> {
        write_path_lines(&self.path.join(BATCH_MANIFEST_FILE), paths)
    }
}

fn write_path_lines(path: &Path, paths: &[PathBuf]) -> Result<(), SinkError> {
    let mut file =
        std::fs::File::create(path).map_err(|source| SinkError::io(path, source))?;
    for p in paths {
        writeln!(file, "{}", p.display()).map_err(|source| SinkError::io(path, source))?;
    }
    Ok(())
}

/// Run outputs under `output_root` that are neither the current run
/// directory nor already sealed. Plain files are ignored.
pub fn sibling_run_outputs(
    output_root: &Path,
    current: Option<&Path>,
) -> Result<Vec<RunOutput>, SinkError> {
    let entries =
        std::fs::read_dir(output_root).map_err(|source| SinkError::io(output_root, source))?;
    let mut outputs = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        if current.is_some_and(|c| c == path) {
            continue;
        }
        let output = RunOutput::new(path);
        if output.is_sealed() {
            continue;
        }
        outputs.push(output);
    }
    outputs.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(outputs)
}

/// Regular files under `input_dir` whose suffix equals `pattern`.
pub fn list_inputs(input_dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, SinkError> {
    let entries =
        std::fs::read_dir(input_dir).map_err(|source| SinkError::io(input_dir, source))?;
    let mut inputs = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_file() && faunanet_core::config::suffix_of(&path).as_deref() == Some(pattern) {
            inputs.push(path);
        }
    }
    inputs.sort();
    Ok(inputs)
}

#[cfg(test)]
#[path = "run_output_tests.rs"]
mod tests;
