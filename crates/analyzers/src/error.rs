// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors from analyzer construction and per-file analysis.
//!
//! Both are fatal to the worker process; they surface to the supervisor
//! through the worker's fault queue.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("unknown analyzer plugin '{0}'")]
    UnknownPlugin(String),

    #[error("model artifact '{file}' could not be found at {path}")]
    ArtifactMissing { file: &'static str, path: PathBuf },

    #[error("malformed model artifact '{file}' at {path}: {reason}")]
    ArtifactMalformed {
        file: &'static str,
        path: PathBuf,
        reason: String,
    },

    #[error(
        "species range predictor creation failed; does the model provide a 'species_presence_model' file?"
    )]
    SpeciesPredictor(#[source] Box<AnalysisError>),

    #[error("model '{0}' does not support species range prediction")]
    SpeciesRangeUnsupported(&'static str),

    #[error("coordinates out of range: lat {lat}, lon {lon}")]
    BadCoordinates { lat: f64, lon: f64 },

    #[error("could not read recording {path}: {source}")]
    ReadRecording {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("analysis failed for {path}: {reason}")]
    Failed { path: PathBuf, reason: String },
}
