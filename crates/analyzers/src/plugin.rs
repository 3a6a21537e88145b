// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The analyzer plugin surface.
//!
//! A plugin publishes the three pieces of an analyzer for one model
//! family: the preprocessor that turns a recording into fixed-length
//! analysis chunks, the classifier that scores each chunk, and the
//! optional species-range predictor. All three are constructed from a
//! model bundle directory plus an opaque config block.

use std::path::Path;

use faunanet_core::ConfigBlock;

use crate::error::AnalysisError;

/// A fixed-length window of decoded audio.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioChunk {
    /// Offset of the window start in seconds.
    pub start: f64,
    /// Offset of the window end in seconds.
    pub end: f64,
    pub samples: Vec<f32>,
}

/// A single class score produced by the classifier for one chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Combined label, `scientific name_common name`.
    pub label: String,
    pub confidence: f64,
}

/// A species with its presence score from the range predictor.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSpecies {
    pub label: String,
    pub score: f64,
}

/// Decodes and windows a recording into analysis chunks.
pub trait Preprocessor: Send {
    fn process(&self, path: &Path) -> Result<Vec<AudioChunk>, AnalysisError>;
}

impl std::fmt::Debug for dyn Preprocessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn Preprocessor")
    }
}

/// Scores one chunk against the model's class list.
pub trait ClassifierModel: Send {
    fn name(&self) -> &str;
    fn classify(&self, chunk: &AudioChunk) -> Result<Vec<Prediction>, AnalysisError>;
}

impl std::fmt::Debug for dyn ClassifierModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn ClassifierModel")
    }
}

/// Predicts which species may be present at a location and date.
pub trait SpeciesPredictor: Send {
    fn predict(&self, date: &str, lat: f64, lon: f64)
        -> Result<Vec<ScoredSpecies>, AnalysisError>;
}

impl std::fmt::Debug for dyn SpeciesPredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn SpeciesPredictor")
    }
}

/// A build-time analyzer plugin, resolved by model name.
pub trait AnalyzerPlugin: Send + Sync {
    /// Plugin name; must match the model bundle directory name.
    fn name(&self) -> &'static str;

    fn load_preprocessor(
        &self,
        model_path: &Path,
        cfg: &ConfigBlock,
    ) -> Result<Box<dyn Preprocessor>, AnalysisError>;

    fn load_model(
        &self,
        model_path: &Path,
        cfg: &ConfigBlock,
    ) -> Result<Box<dyn ClassifierModel>, AnalysisError>;

    fn load_species_predictor(
        &self,
        model_path: &Path,
        cfg: &ConfigBlock,
    ) -> Result<Box<dyn SpeciesPredictor>, AnalysisError>;
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;

    /// Plugin whose model flags every chunk with a fixed label and
    /// confidence. Used to test the factory, recording, and worker
    /// plumbing without real model bundles.
    pub struct FakePlugin {
        pub name: &'static str,
        pub confidence: f64,
        pub with_species_model: bool,
    }

    impl Default for FakePlugin {
        fn default() -> Self {
            Self {
                name: "fake_model",
                confidence: 0.9,
                with_species_model: false,
            }
        }
    }

    struct FakePreprocessor;

    impl Preprocessor for FakePreprocessor {
        fn process(&self, path: &Path) -> Result<Vec<AudioChunk>, AnalysisError> {
            let bytes = std::fs::read(path).map_err(|source| AnalysisError::ReadRecording {
                path: path.to_path_buf(),
                source,
            })?;
            // One three-second chunk per 16 bytes of input, minimum one.
            let chunks = (bytes.len() / 16).max(1);
            Ok((0..chunks)
                .map(|i| AudioChunk {
                    start: i as f64 * 3.0,
                    end: (i + 1) as f64 * 3.0,
                    samples: vec![0.0; 8],
                })
                .collect())
        }
    }

    struct FakeModel {
        confidence: f64,
    }

    impl ClassifierModel for FakeModel {
        fn name(&self) -> &str {
            "fake_model"
        }

        fn classify(&self, _chunk: &AudioChunk) -> Result<Vec<Prediction>, AnalysisError> {
            Ok(vec![Prediction {
                label: "Testudo fake_Fake Tortoise".to_string(),
                confidence: self.confidence,
            }])
        }
    }

    struct FakeSpeciesPredictor;

    impl SpeciesPredictor for FakeSpeciesPredictor {
        fn predict(
            &self,
            _date: &str,
            _lat: f64,
            _lon: f64,
        ) -> Result<Vec<ScoredSpecies>, AnalysisError> {
            Ok(vec![ScoredSpecies {
                label: "Testudo fake_Fake Tortoise".to_string(),
                score: 1.0,
            }])
        }
    }

    impl AnalyzerPlugin for FakePlugin {
        fn name(&self) -> &'static str {
            self.name
        }

        fn load_preprocessor(
            &self,
            _model_path: &Path,
            _cfg: &ConfigBlock,
        ) -> Result<Box<dyn Preprocessor>, AnalysisError> {
            Ok(Box::new(FakePreprocessor))
        }

        fn load_model(
            &self,
            _model_path: &Path,
            _cfg: &ConfigBlock,
        ) -> Result<Box<dyn ClassifierModel>, AnalysisError> {
            Ok(Box::new(FakeModel {
                confidence: self.confidence,
            }))
        }

        fn load_species_predictor(
            &self,
            model_path: &Path,
            _cfg: &ConfigBlock,
        ) -> Result<Box<dyn SpeciesPredictor>, AnalysisError> {
            if !self.with_species_model {
                return Err(AnalysisError::ArtifactMissing {
                    file: "species_presence_model",
                    path: model_path.to_path_buf(),
                });
            }
            Ok(Box::new(FakeSpeciesPredictor))
        }
    }
}
