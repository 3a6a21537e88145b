// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Helpers for reading the opaque YAML sub-config mappings.

use faunanet_core::ConfigBlock;
use serde_yaml::Value;

/// Overlay `overrides` on top of `defaults`, key by key.
pub(crate) fn merged(mut defaults: ConfigBlock, overrides: &ConfigBlock) -> ConfigBlock {
    for (key, value) in overrides {
        defaults.insert(key.clone(), value.clone());
    }
    defaults
}

pub(crate) fn f64_or(block: &ConfigBlock, key: &str, default: f64) -> f64 {
    match block.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(default),
        _ => default,
    }
}

pub(crate) fn u64_or(block: &ConfigBlock, key: &str, default: u64) -> u64 {
    match block.get(key) {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(default),
        _ => default,
    }
}

/// A present, non-null float value (numbers only; strings do not coerce).
pub(crate) fn f64_value(block: &ConfigBlock, key: &str) -> Option<f64> {
    match block.get(key)? {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// A present, non-null string value. Numbers are rendered to text so
/// dates can be written unquoted in config files.
pub(crate) fn str_value(block: &ConfigBlock, key: &str) -> Option<String> {
    match block.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
#[path = "block_tests.rs"]
mod tests;
