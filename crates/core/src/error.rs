// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration error taxonomy.
//!
//! Raised synchronously at watcher construction; never reaches the worker.

use std::path::PathBuf;
use thiserror::Error;

/// Invalid watcher configuration, naming the offending field.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: input directory does not exist: {0}")]
    InputDirMissing(PathBuf),

    #[error("invalid configuration: output directory does not exist: {0}")]
    OutputRootMissing(PathBuf),

    #[error("invalid configuration: model directory does not exist: {0}")]
    ModelDirMissing(PathBuf),

    #[error("invalid configuration: model '{0}' does not exist in model directory")]
    UnknownModel(String),

    #[error("invalid configuration: 'delete_recordings' must be one of 'never', 'always' (got '{0}')")]
    InvalidDeleteRecordings(String),

    #[error("invalid configuration: 'check_time' must be at least 1 second")]
    CheckTimeZero,

    #[error("invalid configuration: missing mandatory key '{0}'")]
    MissingKey(&'static str),

    #[error("invalid configuration: '{key}' has the wrong type (expected {expected})")]
    WrongType {
        key: &'static str,
        expected: &'static str,
    },
}
