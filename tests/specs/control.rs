// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control-plane specs: pause/resume semantics and start/stop cycles.

use super::prelude::*;
use serial_test::serial;
use std::time::Duration;

#[tokio::test]
#[serial]
async fn pause_freezes_the_result_count_until_resume() {
    let env = SpecEnv::new();
    let mut watcher = env.watcher();

    watcher.start().await.unwrap();
    let run_dir = watcher.output_directory().unwrap().to_path_buf();

    env.drop_recording("example_0.wav");
    let first = wait_for(SPEC_WAIT_MAX_MS, || SpecEnv::csv_count(&run_dir) >= 1).await;
    assert!(first, "first result never appeared");

    watcher.pause().await.unwrap();
    assert!(watcher.is_sleeping());
    let frozen = SpecEnv::csv_count(&run_dir);

    // New files arrive while sleeping; the count must not move
    env.drop_recording("example_1.wav");
    env.drop_recording("example_2.wav");
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(SpecEnv::csv_count(&run_dir), frozen);

    watcher.go_on().await.unwrap();
    let resumed = wait_for(SPEC_WAIT_MAX_MS, || SpecEnv::csv_count(&run_dir) > frozen).await;
    assert!(resumed, "count never grew after go_on");

    watcher.stop().await.unwrap();
}

#[tokio::test]
#[serial]
async fn start_stop_cycles_are_clean_and_leave_one_run_dir_each() {
    let env = SpecEnv::new();
    let mut watcher = env.watcher();

    watcher.start().await.unwrap();
    watcher.stop().await.unwrap();
    assert!(!watcher.is_running());

    // Distinct second timestamp
    tokio::time::sleep(Duration::from_millis(1100)).await;
    watcher.start().await.unwrap();
    watcher.stop().await.unwrap();
    assert!(!watcher.is_running());

    let run_dirs = std::fs::read_dir(&env.output_root)
        .unwrap()
        .flatten()
        .filter(|e| e.path().is_dir())
        .count();
    assert_eq!(run_dirs, 2);
}

#[tokio::test]
#[serial]
async fn stop_while_idle_is_a_precondition_error() {
    let env = SpecEnv::new();
    let mut watcher = env.watcher();
    let err = watcher.stop().await.unwrap_err();
    assert_eq!(err.to_string(), "cannot stop while the watcher is idle");
}

#[tokio::test]
#[serial]
async fn worker_analyzes_files_in_nested_directories() {
    let env = SpecEnv::new();
    let mut watcher = env.watcher();

    watcher.start().await.unwrap();
    let run_dir = watcher.output_directory().unwrap().to_path_buf();

    let nested = env.input.join("deployment_a");
    std::fs::create_dir_all(&nested).unwrap();
    // Give the recursive watcher a moment to pick up the new directory
    tokio::time::sleep(Duration::from_millis(300)).await;
    let bytes: Vec<u8> = std::iter::repeat(24_000i16.to_le_bytes())
        .take(64)
        .flatten()
        .collect();
    std::fs::write(nested.join("nested_0.wav"), bytes).unwrap();

    let done = wait_for(SPEC_WAIT_MAX_MS, || {
        run_dir.join("results_nested_0.csv").is_file()
    })
    .await;
    assert!(done, "nested file was not analyzed");

    watcher.stop().await.unwrap();
}

#[tokio::test]
#[serial]
async fn non_matching_suffixes_are_ignored() {
    let env = SpecEnv::new();
    let mut watcher = env.watcher();

    watcher.start().await.unwrap();
    let run_dir = watcher.output_directory().unwrap().to_path_buf();

    std::fs::write(env.input.join("notes.txt"), b"not audio").unwrap();
    env.drop_recording("example_0.wav");

    let done = wait_for(SPEC_WAIT_MAX_MS, || SpecEnv::csv_count(&run_dir) >= 1).await;
    assert!(done);
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(SpecEnv::csv_count(&run_dir), 1);
    assert!(!run_dir.join("results_notes.csv").is_file());

    watcher.stop().await.unwrap();
}
