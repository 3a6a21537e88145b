// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builds a [`Recording`] from a model name plus the four config blocks.
//!
//! The species predictor is installed iff the recording config carries
//! non-null `date`, `lat`, and `lon`.

use std::path::PathBuf;
use std::sync::Arc;

use faunanet_core::ConfigBlock;

use crate::block;
use crate::error::AnalysisError;
use crate::recording::{Deployment, Recording};
use crate::registry::PluginRegistry;

/// Default detection confidence cutoff when the recording config does
/// not provide `min_conf`.
pub const DEFAULT_MIN_CONF: f64 = 0.25;

/// Default species presence cutoff when the recording config does not
/// provide `species_presence_threshold`.
pub const DEFAULT_PRESENCE_THRESHOLD: f64 = 0.03;

pub struct RecordingFactory {
    registry: Arc<PluginRegistry>,
    model_dir: PathBuf,
}

impl RecordingFactory {
    pub fn new(registry: Arc<PluginRegistry>, model_dir: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            model_dir: model_dir.into(),
        }
    }

    /// Construct a recording for `model_name`.
    ///
    /// Returns a recording with an empty `path` and `analyzed == false`.
    /// A species-predictor construction failure surfaces as
    /// [`AnalysisError::SpeciesPredictor`].
    pub fn build(
        &self,
        model_name: &str,
        preprocessor_cfg: &ConfigBlock,
        model_cfg: &ConfigBlock,
        recording_cfg: &ConfigBlock,
        species_predictor_cfg: Option<&ConfigBlock>,
    ) -> Result<Recording, AnalysisError> {
        let plugin = self
            .registry
            .get(model_name)
            .ok_or_else(|| AnalysisError::UnknownPlugin(model_name.to_string()))?;

        let model_path = self.model_dir.join(model_name);
        let preprocessor = plugin.load_preprocessor(&model_path, preprocessor_cfg)?;
        let model = plugin.load_model(&model_path, model_cfg)?;

        let deployment = deployment_of(recording_cfg);
        let species_predictor = match &deployment {
            Some(_) => {
                let cfg = species_predictor_cfg.cloned().unwrap_or_default();
                let predictor = plugin
                    .load_species_predictor(&model_path, &cfg)
                    .map_err(|e| AnalysisError::SpeciesPredictor(Box::new(e)))?;
                Some(predictor)
            }
            None => None,
        };

        Ok(Recording::new(
            preprocessor,
            model,
            species_predictor,
            deployment,
            block::f64_or(recording_cfg, "min_conf", DEFAULT_MIN_CONF),
            block::f64_or(
                recording_cfg,
                "species_presence_threshold",
                DEFAULT_PRESENCE_THRESHOLD,
            ),
        ))
    }
}

/// The deployment location, present iff `date`, `lat`, and `lon` are
/// all given and non-null.
fn deployment_of(recording_cfg: &ConfigBlock) -> Option<Deployment> {
    let date = block::str_value(recording_cfg, "date")?;
    let lat = block::f64_value(recording_cfg, "lat")?;
    let lon = block::f64_value(recording_cfg, "lon")?;
    Some(Deployment { date, lat, lon })
}

#[cfg(test)]
#[path = "factory_tests.rs"]
mod tests;
