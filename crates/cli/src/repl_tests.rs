// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    empty = { "", ShellCommand::Empty },
    whitespace = { "   ", ShellCommand::Empty },
    help = { "help", ShellCommand::Help },
    question_mark = { "?", ShellCommand::Help },
    stop = { "stop", ShellCommand::Stop { args: String::new() } },
    pause = { "pause", ShellCommand::Pause { args: String::new() } },
    go_on = { "go_on", ShellCommand::GoOn { args: String::new() } },
    restart = { "restart", ShellCommand::Restart { args: String::new() } },
    status = { "status", ShellCommand::Status { args: String::new() } },
    cleanup = { "cleanup", ShellCommand::Cleanup { args: String::new() } },
    exit = { "exit", ShellCommand::Exit { args: String::new() } },
)]
fn bare_commands_parse(line: &str, expected: ShellCommand) {
    assert_eq!(parse_command(line), expected);
}

#[test]
fn start_keeps_its_argument_string() {
    assert_eq!(
        parse_command("start --cfg=/tmp/watcher.yml"),
        ShellCommand::Start {
            args: "--cfg=/tmp/watcher.yml".to_string()
        }
    );
}

#[test]
fn change_analyzer_keeps_its_argument_string() {
    assert_eq!(
        parse_command("change_analyzer  --cfg=swap.yml "),
        ShellCommand::ChangeAnalyzer {
            args: "--cfg=swap.yml".to_string()
        }
    );
}

#[test]
fn unknown_commands_are_reported_by_name() {
    assert_eq!(
        parse_command("levitate now"),
        ShellCommand::Unknown("levitate".to_string())
    );
}

#[test]
fn leading_whitespace_is_ignored() {
    assert_eq!(parse_command("  stop  "), ShellCommand::Stop { args: String::new() });
}
