// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

/// Resolve the worker binary: `FAUNANET_WATCHERD` > a sibling of the
/// current executable (or its parent directory, for test harnesses in
/// `target/debug/deps`) > `faunanet-watcherd` on PATH.
pub fn watcherd_bin() -> PathBuf {
    if let Ok(bin) = std::env::var("FAUNANET_WATCHERD") {
        return PathBuf::from(bin);
    }

    if let Ok(exe) = std::env::current_exe() {
        for dir in exe.ancestors().skip(1).take(2) {
            let candidate = dir.join("faunanet-watcherd");
            if candidate.is_file() {
                return candidate;
            }
        }
    }

    PathBuf::from("faunanet-watcherd")
}

fn duration_ms(var: &str, default: Duration) -> Duration {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}

/// How long `stop` waits for `done_analyzing` before terminating
/// (default: 30s, configurable via `FAUNANET_STOP_TIMEOUT_MS`).
pub fn stop_timeout() -> Duration {
    duration_ms("FAUNANET_STOP_TIMEOUT_MS", Duration::from_secs(30))
}

/// Bounded join window after SIGTERM, before escalating to SIGKILL
/// (default: 5s, configurable via `FAUNANET_JOIN_TIMEOUT_MS`).
pub fn join_timeout() -> Duration {
    duration_ms("FAUNANET_JOIN_TIMEOUT_MS", Duration::from_secs(5))
}

/// How long `start` waits for the worker's ready handshake
/// (default: 10s, configurable via `FAUNANET_READY_TIMEOUT_MS`).
pub fn ready_timeout() -> Duration {
    duration_ms("FAUNANET_READY_TIMEOUT_MS", Duration::from_secs(10))
}
