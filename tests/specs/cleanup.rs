// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clean-up reconciliation specs across sibling run outputs.

use super::prelude::*;
use faunanet_storage::ConfigSnapshot;
use serial_test::serial;
use std::path::PathBuf;

/// A run output as `start()` would leave it, with results for a subset
/// of the inputs.
fn seed_run_output(env: &SpecEnv, name: &str, analyzed_stems: &[&str]) -> PathBuf {
    let run_dir = env.output_root.join(name);
    std::fs::create_dir_all(&run_dir).unwrap();
    ConfigSnapshot::capture(&env.config, &run_dir)
        .write(&run_dir)
        .unwrap();
    for stem in analyzed_stems {
        std::fs::write(run_dir.join(format!("results_{stem}.csv")), "label\n").unwrap();
    }
    run_dir
}

#[tokio::test]
#[serial]
async fn cleanup_reanalyzes_missing_inputs_across_folders() {
    let env = SpecEnv::new();
    for i in 0..4 {
        env.drop_recording(&format!("example_{i}.wav"));
    }

    // Two run outputs, each missing results for half their inputs
    let run_a = seed_run_output(&env, "240301_120000", &["example_0", "example_1"]);
    let run_b = seed_run_output(&env, "240301_130000", &["example_2", "example_3"]);

    let mut watcher = env.watcher();
    let report = watcher.clean_up().await.unwrap();
    assert_eq!(report.sealed.len(), 2);
    assert!(report.skipped.is_empty());

    // Each folder now covers all four inputs and is sealed with exactly
    // the re-analyzed ones in missings.txt
    for run_dir in [&run_a, &run_b] {
        assert_eq!(SpecEnv::csv_count(run_dir), 4);
        assert!(run_dir.join("missings.txt").is_file());
    }
    let missings_a = std::fs::read_to_string(run_a.join("missings.txt")).unwrap();
    assert_eq!(missings_a.lines().count(), 2);
    assert!(missings_a.contains("example_2.wav"));
    assert!(missings_a.contains("example_3.wav"));
    let missings_b = std::fs::read_to_string(run_b.join("missings.txt")).unwrap();
    assert_eq!(missings_b.lines().count(), 2);
    assert!(missings_b.contains("example_0.wav"));
    assert!(missings_b.contains("example_1.wav"));
}

#[tokio::test]
#[serial]
async fn cleanup_twice_equals_cleanup_once() {
    let env = SpecEnv::new();
    env.drop_recording("example_0.wav");
    seed_run_output(&env, "240301_120000", &[]);

    let mut watcher = env.watcher();
    watcher.clean_up().await.unwrap();
    // Everything sealed: the second call has nothing eligible
    let err = watcher.clean_up().await.unwrap_err();
    assert_eq!(err.to_string(), "No output folders found to clean up");
}

#[tokio::test]
#[serial]
async fn cleanup_skips_the_current_run_output() {
    let env = SpecEnv::new();
    env.drop_recording("example_0.wav");
    seed_run_output(&env, "240301_120000", &[]);

    let mut watcher = env.watcher();
    watcher.start().await.unwrap();
    let current = watcher.output_directory().unwrap().to_path_buf();

    let report = watcher.clean_up().await.unwrap();
    assert_eq!(report.sealed.len(), 1);
    assert!(!current.join("missings.txt").is_file());

    watcher.stop().await.unwrap();
}

#[tokio::test]
#[serial]
async fn cleanup_with_no_previous_runs_fails() {
    let env = SpecEnv::new();
    let mut watcher = env.watcher();
    let err = watcher.clean_up().await.unwrap_err();
    assert_eq!(err.to_string(), "No output folders found to clean up");
}
