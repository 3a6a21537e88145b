// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shell specs: command parsing and diagnostics over the real binary.

use assert_cmd::Command;
use serial_test::serial;

fn shell() -> Command {
    super::prelude::ensure_spec_binaries();
    Command::cargo_bin("faunanet").unwrap()
}

#[test]
#[serial]
fn help_lists_the_commands() {
    let output = shell().write_stdin("help\nexit\n").assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    for command in ["start", "stop", "pause", "go_on", "change_analyzer", "cleanup", "exit"] {
        assert!(stdout.contains(command), "help misses {command}");
    }
}

#[test]
#[serial]
fn unknown_command_is_reported() {
    let output = shell().write_stdin("levitate\nexit\n").assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("Unknown command: levitate"));
}

#[test]
#[serial]
fn stop_without_watcher_prints_a_diagnostic() {
    let output = shell().write_stdin("stop\nexit\n").assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("Cannot stop watcher, no watcher present"));
}

#[test]
#[serial]
fn malformed_start_arguments_are_rejected() {
    let output = shell()
        .write_stdin("start --cfg\nexit\n")
        .assert()
        .success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("Invalid input. Expected options structure is --name=<arg>"));
}

#[test]
#[serial]
fn no_arg_commands_reject_arguments() {
    let output = shell()
        .write_stdin("stop now\nexit\n")
        .assert()
        .success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("Invalid input. Expected no arguments."));
}

#[test]
#[serial]
fn status_without_watcher_points_at_start() {
    let output = shell().write_stdin("status\nexit\n").assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("No existing watcher, run 'start' first."));
}

#[test]
#[serial]
fn exit_is_clean_and_eof_behaves_like_exit() {
    let output = shell().write_stdin("exit\n").assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("Exiting faunanet shell"));

    // EOF without an explicit exit still leaves with code 0
    shell().write_stdin("").assert().success();
}

#[test]
#[serial]
fn change_analyzer_requires_a_config_file() {
    let output = shell()
        .write_stdin("change_analyzer\nexit\n")
        .assert()
        .success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("you must give a new config file"));
}
