// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Analyzer-swap specs: the compound RUNNING → RUNNING transition with
//! config replacement, old-output sealing, and rollback.

use super::prelude::*;
use faunanet_daemon::{AnalyzerChange, ControlError};
use serial_test::serial;
use std::time::Duration;

#[tokio::test]
#[serial]
async fn swap_starts_a_fresh_run_output_and_seals_the_old_one() {
    let env = SpecEnv::new();
    let mut watcher = env.watcher();

    watcher.start().await.unwrap();
    let first_run = watcher.output_directory().unwrap().to_path_buf();

    for i in 0..3 {
        env.drop_recording(&format!("example_{i}.wav"));
    }
    let analyzed = wait_for(SPEC_WAIT_MAX_MS, || SpecEnv::csv_count(&first_run) == 3).await;
    assert!(analyzed, "first run never finished its files");

    // Distinct timestamp for the new run directory
    tokio::time::sleep(Duration::from_millis(1100)).await;

    let mut change = AnalyzerChange::new("birdnet_custom");
    change.recording = Some(serde_yaml::from_str("min_conf: 0.0").unwrap());
    change.delete_recordings = faunanet_core::DeleteRecordings::Always;
    watcher.change_analyzer(change).await.unwrap();

    // old_output points at the previous run directory and carries the
    // batch manifest of its inputs
    assert_eq!(watcher.old_output(), Some(first_run.as_path()));
    let manifest = std::fs::read_to_string(first_run.join("batch_manifest.txt")).unwrap();
    assert_eq!(manifest.lines().count(), 3);

    let second_run = watcher.output_directory().unwrap().to_path_buf();
    assert_ne!(second_run, first_run);
    assert!(second_run.join("config.yml").is_file());

    // The new config is live: the snapshot names the new model
    let snapshot = std::fs::read_to_string(second_run.join("config.yml")).unwrap();
    assert!(snapshot.contains("model_name: birdnet_custom"));

    // Remaining files are analyzed under the new run directory and
    // deleted afterwards (delete_recordings = "always")
    env.drop_recording("example_3.wav");
    env.drop_recording("example_4.wav");
    let swapped = wait_for(SPEC_WAIT_MAX_MS, || SpecEnv::csv_count(&second_run) == 2).await;
    assert!(swapped, "second run never analyzed the new files");
    let deleted = wait_for(SPEC_WAIT_MAX_MS, || {
        !env.input.join("example_3.wav").exists() && !env.input.join("example_4.wav").exists()
    })
    .await;
    assert!(deleted, "new inputs were not deleted");

    // Union of analyzed stems covers every input seen before stop
    watcher.stop().await.unwrap();
    let mut stems: Vec<String> = Vec::new();
    for run in [&first_run, &second_run] {
        for entry in std::fs::read_dir(run).unwrap().flatten() {
            if let Some(name) = entry.file_name().to_str() {
                if let Some(stem) = name
                    .strip_prefix("results_")
                    .and_then(|n| n.strip_suffix(".csv"))
                {
                    stems.push(stem.to_string());
                }
            }
        }
    }
    stems.sort();
    assert_eq!(
        stems,
        ["example_0", "example_1", "example_2", "example_3", "example_4"]
    );
}

#[tokio::test]
#[serial]
async fn failed_swap_rolls_back_the_configuration() {
    let env = SpecEnv::new();
    let mut watcher = env.watcher();

    watcher.start().await.unwrap();
    env.drop_recording("example_0.wav");
    let run_dir = watcher.output_directory().unwrap().to_path_buf();
    let analyzed = wait_for(SPEC_WAIT_MAX_MS, || SpecEnv::csv_count(&run_dir) == 1).await;
    assert!(analyzed);

    let before = watcher.config().clone();
    let dirs_before = std::fs::read_dir(&env.output_root).unwrap().count();

    // Force the respawn inside restart() to fail
    let real_worker = std::env::var("FAUNANET_WATCHERD").unwrap();
    std::env::set_var("FAUNANET_WATCHERD", "/nonexistent/faunanet-watcherd");
    tokio::time::sleep(Duration::from_millis(1100)).await;

    let mut change = AnalyzerChange::new("birdnet_custom");
    change.delete_recordings = faunanet_core::DeleteRecordings::Always;
    let err = watcher.change_analyzer(change).await.unwrap_err();
    std::env::set_var("FAUNANET_WATCHERD", &real_worker);

    assert!(matches!(err, ControlError::SwapFailed(_)));
    assert_eq!(
        err.to_string(),
        "Error when while trying to change the watcher process, any changes made have been undone"
    );
    assert_eq!(watcher.config(), &before);
    assert!(!watcher.is_running());

    // No new run directory was committed
    assert_eq!(
        std::fs::read_dir(&env.output_root).unwrap().count(),
        dirs_before
    );
}

#[tokio::test]
#[serial]
async fn swap_from_sleeping_is_rejected() {
    let env = SpecEnv::new();
    let mut watcher = env.watcher();

    watcher.start().await.unwrap();
    let run_dir = watcher.output_directory().unwrap().to_path_buf();
    env.drop_recording("example_0.wav");
    let analyzed = wait_for(SPEC_WAIT_MAX_MS, || SpecEnv::csv_count(&run_dir) == 1).await;
    assert!(analyzed);

    watcher.pause().await.unwrap();
    let err = watcher
        .change_analyzer(AnalyzerChange::new("birdnet_custom"))
        .await
        .unwrap_err();
    assert!(matches!(err, ControlError::Precondition(_)));

    watcher.stop().await.unwrap();
}
