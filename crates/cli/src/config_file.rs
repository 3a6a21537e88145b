// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shell configuration files.
//!
//! A config file is a YAML document with an `Analysis` section. The
//! user's default file (`<config dir>/faunanet/default.yml`) is the
//! base; a `--cfg` file is merged over it leaf-recursively, so a custom
//! file only needs the keys it changes.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use serde_yaml::{Mapping, Value};

use faunanet_core::config::DEFAULT_CHECK_TIME;
use faunanet_core::{ConfigBlock, DeleteRecordings, WatcherConfig};
use faunanet_daemon::AnalyzerChange;

/// `<config dir>/faunanet/default.yml`
pub(crate) fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("faunanet").join("default.yml"))
}

/// Load the watcher configuration: the default file (when present)
/// with `custom` merged over it.
pub(crate) fn load_watcher_config(custom: Option<&Path>) -> Result<WatcherConfig> {
    let mut document = match default_config_path() {
        Some(path) if path.is_file() => read_mapping(&path)?,
        _ => Mapping::new(),
    };

    if let Some(path) = custom {
        let overlay = read_mapping(path)?;
        update_leafs_recursive(&mut document, &overlay);
    }

    watcher_config_from(&document)
}

/// Build the analyzer-swap parameters from a config file.
pub(crate) fn load_analyzer_change(path: &Path) -> Result<AnalyzerChange> {
    let document = read_mapping(path)?;
    let analysis = section(&document, "Analysis")?;

    let mut change = AnalyzerChange::new(
        str_key(analysis, "model_name")?
            .ok_or_else(|| anyhow!("missing mandatory key 'model_name'"))?,
    );
    change.preprocessor = block_key(analysis, "Preprocessor");
    change.model = block_key(analysis, "Model");
    change.recording = block_key(analysis, "Recording");
    change.species_predictor = block_key(analysis, "SpeciesPredictor");
    if let Some(pattern) = str_key(analysis, "pattern")? {
        change.pattern = pattern;
    }
    if let Some(check_time) = u64_key(analysis, "check_time")? {
        change.check_time = check_time;
    }
    if let Some(mode) = str_key(analysis, "delete_recordings")? {
        change.delete_recordings = mode.parse::<DeleteRecordings>()?;
    }
    Ok(change)
}

/// Merge `overlay` into `base`: nested mappings recurse, every other
/// value replaces the base leaf.
pub(crate) fn update_leafs_recursive(base: &mut Mapping, overlay: &Mapping) {
    for (key, value) in overlay {
        match (base.get_mut(key), value) {
            (Some(Value::Mapping(base_child)), Value::Mapping(overlay_child)) => {
                update_leafs_recursive(base_child, overlay_child);
            }
            _ => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}

fn read_mapping(path: &Path) -> Result<Mapping> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("could not read config file {}", path.display()))?;
    serde_yaml::from_str(&text)
        .with_context(|| format!("could not parse config file {}", path.display()))
}

fn watcher_config_from(document: &Mapping) -> Result<WatcherConfig> {
    let analysis = section(document, "Analysis")?;

    let input = path_key(analysis, "input")?;
    let output = path_key(analysis, "output")?;
    let model_dir = path_key(analysis, "model_dir")?;
    let model_name = str_key(analysis, "model_name")?
        .ok_or_else(|| anyhow!("missing mandatory key 'model_name'"))?;

    let mut config = WatcherConfig::new(input, output, model_dir, model_name);
    if let Some(pattern) = str_key(analysis, "pattern")? {
        config.pattern = pattern;
    }
    config.check_time = u64_key(analysis, "check_time")?.unwrap_or(DEFAULT_CHECK_TIME);
    if let Some(mode) = str_key(analysis, "delete_recordings")? {
        config.delete_recordings = mode.parse::<DeleteRecordings>()?;
    }
    config.preprocessor = block_key(analysis, "Preprocessor").unwrap_or_default();
    config.model = block_key(analysis, "Model").unwrap_or_default();
    config.recording = block_key(analysis, "Recording").unwrap_or_default();
    config.species_predictor = block_key(analysis, "SpeciesPredictor");

    Ok(config)
}

fn section<'a>(document: &'a Mapping, name: &str) -> Result<&'a Mapping> {
    match document.get(name) {
        Some(Value::Mapping(section)) => Ok(section),
        Some(_) => bail!("'{name}' must be a mapping"),
        None => bail!("missing mandatory section '{name}'"),
    }
}

fn path_key(analysis: &Mapping, key: &str) -> Result<PathBuf> {
    let value =
        str_key(analysis, key)?.ok_or_else(|| anyhow!("missing mandatory key '{key}'"))?;
    let path = expand_user(&value);
    // Resolve so the snapshot records absolute paths
    Ok(path.canonicalize().unwrap_or(path))
}

fn str_key(analysis: &Mapping, key: &str) -> Result<Option<String>> {
    match analysis.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => bail!("'{key}' must be a string"),
    }
}

fn u64_key(analysis: &Mapping, key: &str) -> Result<Option<u64>> {
    match analysis.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| anyhow!("'{key}' must be a non-negative integer")),
        Some(_) => bail!("'{key}' must be an integer"),
    }
}

fn block_key(analysis: &Mapping, key: &str) -> Option<ConfigBlock> {
    match analysis.get(key) {
        Some(Value::Mapping(block)) => Some(block.clone()),
        _ => None,
    }
}

/// Expand a leading `~` to the user's home directory.
pub(crate) fn expand_user(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
#[path = "config_file_tests.rs"]
mod tests;
