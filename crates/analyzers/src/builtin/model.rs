// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic classifier stand-in.
//!
//! Scores each window from its signal energy plus a per-label offset
//! derived from a stable hash of the label, mapped through a sigmoid
//! with configurable `sensitivity`. Real inference backends plug in at
//! the same [`ClassifierModel`] seam.

use faunanet_core::ConfigBlock;

use crate::block;
use crate::error::AnalysisError;
use crate::plugin::{AudioChunk, ClassifierModel, Prediction};

pub const DEFAULT_SENSITIVITY: f64 = 1.0;
pub const DEFAULT_THRESHOLD: f64 = 0.1;

pub struct EnergyClassifier {
    name: String,
    labels: Vec<String>,
    sensitivity: f64,
    default_threshold: f64,
}

impl EnergyClassifier {
    pub fn new(name: &str, labels: Vec<String>, params: &ConfigBlock) -> Self {
        Self {
            name: name.to_string(),
            labels,
            sensitivity: block::f64_or(params, "sensitivity", DEFAULT_SENSITIVITY),
            default_threshold: block::f64_or(params, "default_threshold", DEFAULT_THRESHOLD),
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

impl ClassifierModel for EnergyClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn classify(&self, chunk: &AudioChunk) -> Result<Vec<Prediction>, AnalysisError> {
        let rms = root_mean_square(&chunk.samples);
        let mut predictions: Vec<Prediction> = self
            .labels
            .iter()
            .filter_map(|label| {
                let logit = label_offset(label) + 6.0 * rms - 3.0;
                let confidence = sigmoid(self.sensitivity * logit);
                (confidence >= self.default_threshold).then(|| Prediction {
                    label: label.clone(),
                    confidence,
                })
            })
            .collect();
        predictions.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(predictions)
    }
}

fn root_mean_square(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples.iter().map(|s| (*s as f64) * (*s as f64)).sum();
    (sum / samples.len() as f64).sqrt()
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Stable per-label logit offset in [-1, 1] (FNV-1a over the label).
fn label_offset(label: &str) -> f64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in label.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    (hash % 2001) as f64 / 1000.0 - 1.0
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
