// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Waveform decoding and windowing.
//!
//! Decodes 16-bit little-endian PCM into `f32` samples and cuts them
//! into `sig_length`-second windows stepping by `sig_length - overlap`.
//! A trailing partial window is kept so short recordings still produce
//! one chunk.

use std::path::Path;

use faunanet_core::ConfigBlock;

use crate::block;
use crate::error::AnalysisError;
use crate::plugin::{AudioChunk, Preprocessor};

pub const DEFAULT_SAMPLE_RATE: u64 = 48_000;
pub const DEFAULT_SIG_LENGTH: f64 = 3.0;
pub const DEFAULT_OVERLAP: f64 = 0.0;

pub struct WaveformPreprocessor {
    sample_rate: u64,
    sig_length: f64,
    overlap: f64,
}

impl WaveformPreprocessor {
    pub fn from_params(params: &ConfigBlock) -> Self {
        let sample_rate = block::u64_or(params, "sample_rate", DEFAULT_SAMPLE_RATE).max(1);
        let sig_length = block::f64_or(params, "sig_length", DEFAULT_SIG_LENGTH);
        let overlap = block::f64_or(params, "overlap", DEFAULT_OVERLAP);
        Self {
            sample_rate,
            sig_length: if sig_length > 0.0 {
                sig_length
            } else {
                DEFAULT_SIG_LENGTH
            },
            // The step must stay positive
            overlap: overlap.clamp(0.0, sig_length.max(0.0)),
        }
    }

    fn decode(&self, path: &Path) -> Result<Vec<f32>, AnalysisError> {
        let bytes = std::fs::read(path).map_err(|source| AnalysisError::ReadRecording {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / i16::MAX as f32)
            .collect())
    }
}

impl Preprocessor for WaveformPreprocessor {
    fn process(&self, path: &Path) -> Result<Vec<AudioChunk>, AnalysisError> {
        let samples = self.decode(path)?;
        let window = (self.sig_length * self.sample_rate as f64) as usize;
        let step = (((self.sig_length - self.overlap) * self.sample_rate as f64) as usize).max(1);

        let mut chunks = Vec::new();
        if samples.is_empty() || window == 0 {
            return Ok(chunks);
        }

        let mut offset = 0usize;
        while offset < samples.len() {
            let end = (offset + window).min(samples.len());
            chunks.push(AudioChunk {
                start: offset as f64 / self.sample_rate as f64,
                end: end as f64 / self.sample_rate as f64,
                samples: samples[offset..end].to_vec(),
            });
            if end == samples.len() {
                break;
            }
            offset += step;
        }
        Ok(chunks)
    }
}

#[cfg(test)]
#[path = "preprocessor_tests.rs"]
mod tests;
