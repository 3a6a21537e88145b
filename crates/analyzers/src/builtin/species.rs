// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Species-range predictor backed by the bundle's `species_presence_model`
//! artifact: one `score label` entry per line, score first so labels may
//! contain spaces.

use std::path::PathBuf;

use faunanet_core::ConfigBlock;
use tracing::debug;

use crate::builtin::SPECIES_PRESENCE_FILE;
use crate::error::AnalysisError;
use crate::plugin::{ScoredSpecies, SpeciesPredictor};

#[derive(Debug)]
pub struct RangePredictor {
    entries: Vec<ScoredSpecies>,
}

impl RangePredictor {
    /// Load the presence table from the bundle artifact.
    ///
    /// The config block is accepted for parity with the other loaders;
    /// the built-in predictor has no tunables beyond the artifact.
    pub fn load(path: PathBuf, _cfg: &ConfigBlock) -> Result<Self, AnalysisError> {
        let text = std::fs::read_to_string(&path).map_err(|_| AnalysisError::ArtifactMissing {
            file: SPECIES_PRESENCE_FILE,
            path: path.clone(),
        })?;

        let mut entries = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (score, label) =
                line.split_once(' ')
                    .ok_or_else(|| AnalysisError::ArtifactMalformed {
                        file: SPECIES_PRESENCE_FILE,
                        path: path.clone(),
                        reason: format!("expected 'score label', got '{line}'"),
                    })?;
            let score: f64 = score
                .parse()
                .map_err(|_| AnalysisError::ArtifactMalformed {
                    file: SPECIES_PRESENCE_FILE,
                    path: path.clone(),
                    reason: format!("unparseable score '{score}'"),
                })?;
            entries.push(ScoredSpecies {
                label: label.trim().to_string(),
                score,
            });
        }

        debug!(species = entries.len(), "species presence table loaded");
        Ok(Self { entries })
    }
}

impl SpeciesPredictor for RangePredictor {
    fn predict(
        &self,
        _date: &str,
        lat: f64,
        lon: f64,
    ) -> Result<Vec<ScoredSpecies>, AnalysisError> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(AnalysisError::BadCoordinates { lat, lon });
        }
        Ok(self.entries.clone())
    }
}

#[cfg(test)]
#[path = "species_tests.rs"]
mod tests;
