// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A recording bound to one analyzer: mutable `path`/`analyzed`, an
//! `analyze()` that fills `detections`, and the optional species-range
//! filter applied once and reused for every later call.

use std::path::PathBuf;

use faunanet_core::Detection;
use tracing::debug;

use crate::error::AnalysisError;
use crate::plugin::{ClassifierModel, Preprocessor, SpeciesPredictor};

/// Location and date of a deployment, taken from the recording config
/// when `date`, `lat`, and `lon` are all present and non-null.
#[derive(Debug, Clone, PartialEq)]
pub struct Deployment {
    pub date: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug)]
pub struct Recording {
    /// Path of the file to analyze next. Empty until the worker assigns one.
    pub path: PathBuf,
    /// Cleared before each analysis, set when `analyze` returns.
    pub analyzed: bool,
    /// Species labels allowed by the range predictor; empty when no
    /// predictor is attached. Populated on the first `analyze`.
    pub allowed_species: Vec<String>,
    detections: Vec<Detection>,
    preprocessor: Box<dyn Preprocessor>,
    model: Box<dyn ClassifierModel>,
    species_predictor: Option<Box<dyn SpeciesPredictor>>,
    deployment: Option<Deployment>,
    species_filter_ready: bool,
    min_conf: f64,
    species_presence_threshold: f64,
}

impl Recording {
    pub(crate) fn new(
        preprocessor: Box<dyn Preprocessor>,
        model: Box<dyn ClassifierModel>,
        species_predictor: Option<Box<dyn SpeciesPredictor>>,
        deployment: Option<Deployment>,
        min_conf: f64,
        species_presence_threshold: f64,
    ) -> Self {
        Self {
            path: PathBuf::new(),
            analyzed: false,
            allowed_species: Vec::new(),
            detections: Vec::new(),
            preprocessor,
            model,
            species_predictor,
            deployment,
            species_filter_ready: false,
            min_conf,
            species_presence_threshold,
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn has_species_predictor(&self) -> bool {
        self.species_predictor.is_some()
    }

    /// Detections of the last completed analysis, in chunk order.
    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    /// Analyze the file at `self.path` and replace `detections`.
    ///
    /// The species filter is computed on the first call and reused for
    /// all the analysis calls that may follow.
    pub fn analyze(&mut self) -> Result<(), AnalysisError> {
        if let (Some(predictor), Some(deployment), false) = (
            self.species_predictor.as_deref(),
            self.deployment.as_ref(),
            self.species_filter_ready,
        ) {
            let scored = predictor.predict(&deployment.date, deployment.lat, deployment.lon)?;
            self.allowed_species = scored
                .into_iter()
                .filter(|s| s.score >= self.species_presence_threshold)
                .map(|s| s.label)
                .collect();
            self.species_filter_ready = true;
            debug!(
                allowed = self.allowed_species.len(),
                "species range filter ready"
            );
        }

        let chunks = self.preprocessor.process(&self.path)?;
        self.detections.clear();

        for chunk in &chunks {
            for prediction in self.model.classify(chunk)? {
                if prediction.confidence < self.min_conf {
                    continue;
                }
                if self.species_filter_ready
                    && !self.allowed_species.iter().any(|s| *s == prediction.label)
                {
                    continue;
                }
                let (scientific, common) = split_label(&prediction.label);
                let mut detection = Detection::new();
                detection
                    .insert("label", prediction.label.clone())
                    .insert("scientific_name", scientific)
                    .insert("common_name", common)
                    .insert("confidence", prediction.confidence)
                    .insert("start_time", chunk.start)
                    .insert("end_time", chunk.end);
                self.detections.push(detection);
            }
        }

        self.analyzed = true;
        Ok(())
    }
}

/// Split a combined `scientific name_common name` label.
fn split_label(label: &str) -> (String, String) {
    match label.split_once('_') {
        Some((scientific, common)) => (scientific.to_string(), common.to_string()),
        None => (label.to_string(), String::new()),
    }
}

#[cfg(test)]
#[path = "recording_tests.rs"]
mod tests;
