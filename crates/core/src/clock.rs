// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction for testable time handling

use chrono::{Duration as ChronoDuration, Local, NaiveDate, NaiveDateTime};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A clock that provides the current time
pub trait Clock: Clone + Send + Sync {
    fn now(&self) -> Instant;
    /// Local wall-clock time, used for naming run output directories.
    fn local_time(&self) -> NaiveDateTime;
}

/// Real system clock
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn local_time(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Fake clock for testing with controllable time
#[derive(Clone)]
pub struct FakeClock {
    current: Arc<Mutex<Instant>>,
    wall: Arc<Mutex<NaiveDateTime>>,
}

impl FakeClock {
    pub fn new() -> Self {
        let wall = NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .unwrap_or_default();
        Self {
            current: Arc::new(Mutex::new(Instant::now())),
            wall: Arc::new(Mutex::new(wall)),
        }
    }

    /// Advance the clock by the given duration
    pub fn advance(&self, duration: Duration) {
        *self.current.lock() += duration;
        let mut wall = self.wall.lock();
        *wall = *wall + ChronoDuration::from_std(duration).unwrap_or(ChronoDuration::zero());
    }

    /// Set the wall-clock time to a specific value
    pub fn set_local_time(&self, wall: NaiveDateTime) {
        *self.wall.lock() = wall;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        *self.current.lock()
    }

    fn local_time(&self) -> NaiveDateTime {
        *self.wall.lock()
    }
}

/// Name of a run output directory: the supervisor-local start timestamp.
pub fn run_dir_name<C: Clock>(clock: &C) -> String {
    clock.local_time().format("%y%m%d_%H%M%S").to_string()
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
