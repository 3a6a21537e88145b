// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[test]
fn empty_line_yields_no_kwargs() {
    assert!(parse_kwargs("", &["cfg"]).unwrap().is_empty());
    assert!(parse_kwargs("   ", &["cfg"]).unwrap().is_empty());
}

#[test]
fn single_cfg_pair_parses() {
    let kwargs = parse_kwargs("--cfg=/tmp/watcher.yml", &["cfg"]).unwrap();
    assert_eq!(kwargs.get("cfg").map(String::as_str), Some("/tmp/watcher.yml"));
}

#[parameterized(
    bare_word = { "watcher.yml" },
    dashes_only = { "--cfg" },
)]
fn missing_equals_is_a_structure_error(line: &str) {
    assert_eq!(parse_kwargs(line, &["cfg"]).unwrap_err(), ArgError::BadStructure);
}

#[test]
fn missing_keyword_is_reported_by_name() {
    let err = parse_kwargs("--config=/tmp/x.yml", &["cfg"]).unwrap_err();
    assert_eq!(err.to_string(), "Keyword --cfg not found in passed line");
}

#[test]
fn too_many_pairs_is_rejected() {
    let err = parse_kwargs("--cfg=a.yml --extra=1", &["cfg"]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid input. Expected 1 blocks of the form --name=<arg> with names cfg"
    );
}

#[test]
fn no_args_commands_reject_input() {
    assert!(expect_no_args("").is_ok());
    assert_eq!(
        expect_no_args("now").unwrap_err(),
        "Invalid input. Expected no arguments."
    );
}
