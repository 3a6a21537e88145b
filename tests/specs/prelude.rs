// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for the end-to-end specs.

use std::path::{Path, PathBuf};
use std::sync::Once;
use std::time::Duration;

use tempfile::TempDir;

use faunanet_core::WatcherConfig;
use faunanet_daemon::Watcher;

/// Upper bound for wait_for polling in the specs.
pub const SPEC_WAIT_MAX_MS: u64 = 15_000;

static SETUP: Once = Once::new();

/// Build the binaries the specs drive and pin the worker path, once.
pub fn ensure_spec_binaries() {
    SETUP.call_once(|| {
        let watcherd = assert_cmd::cargo::cargo_bin("faunanet-watcherd");
        let shell = assert_cmd::cargo::cargo_bin("faunanet");
        if !watcherd.is_file() || !shell.is_file() {
            let status = std::process::Command::new(env!("CARGO"))
                .args(["build", "-p", "faunanet-daemon", "-p", "faunanet"])
                .status()
                .expect("failed to run cargo build for the spec binaries");
            assert!(status.success(), "cargo build for spec binaries failed");
        }
        std::env::set_var("FAUNANET_WATCHERD", &watcherd);
        // Keep stop() from sitting in the 30s production timeout when a
        // run analyzed nothing.
        std::env::set_var("FAUNANET_STOP_TIMEOUT_MS", "2000");
        std::env::set_var("FAUNANET_JOIN_TIMEOUT_MS", "5000");
    });
}

pub struct SpecEnv {
    _temp: TempDir,
    pub input: PathBuf,
    pub output_root: PathBuf,
    pub config: WatcherConfig,
}

impl SpecEnv {
    /// Temp directories plus both built-in model bundles, with a
    /// permissive recording config so every window detects something.
    pub fn new() -> Self {
        ensure_spec_binaries();
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("input");
        let output_root = temp.path().join("output");
        let models = temp.path().join("models");
        std::fs::create_dir_all(&input).unwrap();
        std::fs::create_dir_all(&output_root).unwrap();
        write_model_bundle(&models, "birdnet_default", true);
        write_model_bundle(&models, "birdnet_custom", false);

        let mut config = WatcherConfig::new(&input, &output_root, &models, "birdnet_default");
        config.recording = serde_yaml::from_str("min_conf: 0.0").unwrap();
        Self {
            _temp: temp,
            input,
            output_root,
            config,
        }
    }

    pub fn watcher(&self) -> Watcher {
        Watcher::new(self.config.clone()).unwrap()
    }

    /// Drop a loud little PCM recording into the input directory.
    pub fn drop_recording(&self, name: &str) -> PathBuf {
        let path = self.input.join(name);
        let bytes: Vec<u8> = std::iter::repeat(24_000i16.to_le_bytes())
            .take(64)
            .flatten()
            .collect();
        std::fs::write(&path, bytes).unwrap();
        path
    }

    pub fn input_count(&self) -> usize {
        std::fs::read_dir(&self.input).unwrap().count()
    }

    /// `results_*.csv` files in a run directory.
    pub fn csv_count(run_dir: &Path) -> usize {
        match std::fs::read_dir(run_dir) {
            Ok(entries) => entries
                .flatten()
                .filter(|e| {
                    e.file_name()
                        .to_str()
                        .is_some_and(|n| n.starts_with("results_") && n.ends_with(".csv"))
                })
                .count(),
            Err(_) => 0,
        }
    }
}

/// Poll `condition` until it holds or `max_ms` elapses.
pub async fn wait_for<F: FnMut() -> bool>(max_ms: u64, mut condition: F) -> bool {
    let deadline = std::time::Instant::now() + Duration::from_millis(max_ms);
    loop {
        if condition() {
            return true;
        }
        if std::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

/// Write a model bundle the analyzer plugins can load.
pub fn write_model_bundle(model_dir: &Path, name: &str, with_species_model: bool) -> PathBuf {
    let bundle = model_dir.join(name);
    std::fs::create_dir_all(&bundle).unwrap();
    std::fs::write(
        bundle.join("preprocessor.cfg"),
        "sample_rate: 4\nsig_length: 1.0\noverlap: 0.0\n",
    )
    .unwrap();
    std::fs::write(
        bundle.join("model.cfg"),
        "sensitivity: 1.0\ndefault_threshold: 0.1\n",
    )
    .unwrap();
    std::fs::write(
        bundle.join("labels.txt"),
        "Turdus merula_Common Blackbird\nErithacus rubecula_European Robin\n",
    )
    .unwrap();
    if with_species_model {
        std::fs::write(
            bundle.join("species_presence_model"),
            "0.9 Turdus merula_Common Blackbird\n0.4 Erithacus rubecula_European Robin\n",
        )
        .unwrap();
    }
    bundle
}
