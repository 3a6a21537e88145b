// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Built-in analyzer plugins.
//!
//! Both plugins read their defaults from the model bundle:
//! `preprocessor.cfg` and `model.cfg` (YAML mappings of default
//! parameters), `labels.txt` (one `scientific name_common name` class
//! per line), and, for range-capable models, `species_presence_model`
//! (one `score label` entry per line). Runtime config blocks overlay
//! the bundle defaults key by key.

mod model;
mod preprocessor;
mod species;

use std::path::Path;

use faunanet_core::ConfigBlock;

use crate::block;
use crate::error::AnalysisError;
use crate::plugin::{AnalyzerPlugin, ClassifierModel, Preprocessor, SpeciesPredictor};

pub use model::EnergyClassifier;
pub use preprocessor::WaveformPreprocessor;
pub use species::RangePredictor;

pub(crate) const PREPROCESSOR_CFG_FILE: &str = "preprocessor.cfg";
pub(crate) const MODEL_CFG_FILE: &str = "model.cfg";
pub(crate) const LABELS_FILE: &str = "labels.txt";
pub(crate) const SPECIES_PRESENCE_FILE: &str = "species_presence_model";

/// The stock BirdNET analyzer: bundle labels, range-capable.
pub struct BirdnetDefault;

/// A custom classifier on top of the default embeddings: its own label
/// set plus a trailing `non_event` class, no species range support.
pub struct BirdnetCustom;

/// Read a bundle config artifact and overlay the runtime block on it.
fn bundle_params(
    model_path: &Path,
    file: &'static str,
    overrides: &ConfigBlock,
) -> Result<ConfigBlock, AnalysisError> {
    let path = model_path.join(file);
    let text = std::fs::read_to_string(&path).map_err(|_| AnalysisError::ArtifactMissing {
        file,
        path: path.clone(),
    })?;
    let defaults: ConfigBlock =
        serde_yaml::from_str(&text).map_err(|e| AnalysisError::ArtifactMalformed {
            file,
            path,
            reason: e.to_string(),
        })?;
    Ok(block::merged(defaults, overrides))
}

fn read_labels(model_path: &Path) -> Result<Vec<String>, AnalysisError> {
    let path = model_path.join(LABELS_FILE);
    let text = std::fs::read_to_string(&path).map_err(|_| AnalysisError::ArtifactMissing {
        file: LABELS_FILE,
        path: path.clone(),
    })?;
    let labels: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();
    if labels.is_empty() {
        return Err(AnalysisError::ArtifactMalformed {
            file: LABELS_FILE,
            path,
            reason: "no labels".to_string(),
        });
    }
    Ok(labels)
}

impl AnalyzerPlugin for BirdnetDefault {
    fn name(&self) -> &'static str {
        "birdnet_default"
    }

    fn load_preprocessor(
        &self,
        model_path: &Path,
        cfg: &ConfigBlock,
    ) -> Result<Box<dyn Preprocessor>, AnalysisError> {
        let params = bundle_params(model_path, PREPROCESSOR_CFG_FILE, cfg)?;
        Ok(Box::new(WaveformPreprocessor::from_params(&params)))
    }

    fn load_model(
        &self,
        model_path: &Path,
        cfg: &ConfigBlock,
    ) -> Result<Box<dyn ClassifierModel>, AnalysisError> {
        let params = bundle_params(model_path, MODEL_CFG_FILE, cfg)?;
        let labels = read_labels(model_path)?;
        Ok(Box::new(EnergyClassifier::new(self.name(), labels, &params)))
    }

    fn load_species_predictor(
        &self,
        model_path: &Path,
        cfg: &ConfigBlock,
    ) -> Result<Box<dyn SpeciesPredictor>, AnalysisError> {
        let predictor = RangePredictor::load(model_path.join(SPECIES_PRESENCE_FILE), cfg)?;
        Ok(Box::new(predictor))
    }
}

impl AnalyzerPlugin for BirdnetCustom {
    fn name(&self) -> &'static str {
        "birdnet_custom"
    }

    fn load_preprocessor(
        &self,
        model_path: &Path,
        cfg: &ConfigBlock,
    ) -> Result<Box<dyn Preprocessor>, AnalysisError> {
        let params = bundle_params(model_path, PREPROCESSOR_CFG_FILE, cfg)?;
        Ok(Box::new(WaveformPreprocessor::from_params(&params)))
    }

    fn load_model(
        &self,
        model_path: &Path,
        cfg: &ConfigBlock,
    ) -> Result<Box<dyn ClassifierModel>, AnalysisError> {
        let params = bundle_params(model_path, MODEL_CFG_FILE, cfg)?;
        // The custom classifier scores its own label set plus a trailing
        // non-event class for windows that match nothing.
        let mut labels = read_labels(model_path)?;
        labels.push("non_event".to_string());
        Ok(Box::new(EnergyClassifier::new(self.name(), labels, &params)))
    }

    fn load_species_predictor(
        &self,
        _model_path: &Path,
        _cfg: &ConfigBlock,
    ) -> Result<Box<dyn SpeciesPredictor>, AnalysisError> {
        // The custom classifier carries its own label set and no range
        // model; a stray species_presence_model artifact does not make
        // one supported.
        Err(AnalysisError::SpeciesRangeUnsupported(self.name()))
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
