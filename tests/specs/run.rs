// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Simple-run and delete-always specs.

use super::prelude::*;
use serial_test::serial;
use std::time::Duration;

#[tokio::test]
#[serial]
async fn simple_run_analyzes_every_dropped_file() {
    let env = SpecEnv::new();
    let mut watcher = env.watcher();

    watcher.start().await.unwrap();
    let run_dir = watcher.output_directory().unwrap().to_path_buf();
    assert!(run_dir.join("config.yml").is_file());

    for i in 0..5 {
        env.drop_recording(&format!("example_{i}.wav"));
        tokio::time::sleep(Duration::from_millis(200)).await;
    }

    let all_done = wait_for(SPEC_WAIT_MAX_MS, || SpecEnv::csv_count(&run_dir) == 5).await;
    assert!(all_done, "expected 5 result files in {}", run_dir.display());
    for i in 0..5 {
        assert!(run_dir.join(format!("results_example_{i}.csv")).is_file());
    }

    watcher.stop().await.unwrap();
    assert!(!watcher.is_running());

    // delete_recordings = "never": the input directory keeps all 5 files
    assert_eq!(env.input_count(), 5);

    // The detection schema starts with the label columns
    let text =
        std::fs::read_to_string(run_dir.join("results_example_0.csv")).unwrap();
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.get(0), Some("label"));
    assert_eq!(headers.get(3), Some("confidence"));
}

#[tokio::test]
#[serial]
async fn delete_always_unlinks_each_analyzed_input() {
    let mut env = SpecEnv::new();
    env.config.delete_recordings = faunanet_core::DeleteRecordings::Always;
    let mut watcher = env.watcher();

    watcher.start().await.unwrap();
    let run_dir = watcher.output_directory().unwrap().to_path_buf();

    for i in 0..7 {
        env.drop_recording(&format!("example_{i}.wav"));
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    let all_done = wait_for(SPEC_WAIT_MAX_MS, || SpecEnv::csv_count(&run_dir) == 7).await;
    assert!(all_done, "expected 7 result files");

    watcher.stop().await.unwrap();

    // Every analyzed input is gone; every emitted csv exists
    assert_eq!(env.input_count(), 0);
    assert_eq!(SpecEnv::csv_count(&run_dir), 7);
}

#[tokio::test]
#[serial]
async fn config_snapshot_is_written_before_any_results() {
    let env = SpecEnv::new();
    let mut watcher = env.watcher();

    watcher.start().await.unwrap();
    let run_dir = watcher.output_directory().unwrap().to_path_buf();

    // Invariant: config.yml exists before any results_*.csv
    assert!(run_dir.join("config.yml").is_file());
    assert_eq!(SpecEnv::csv_count(&run_dir), 0);

    env.drop_recording("example_0.wav");
    let done = wait_for(SPEC_WAIT_MAX_MS, || SpecEnv::csv_count(&run_dir) == 1).await;
    assert!(done);

    watcher.stop().await.unwrap();
}
