// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem-event ingestion.
//!
//! [`NotifyEventSource`] wraps the platform watcher from the `notify`
//! crate; [`PollingEventSource`] is the fallback for platforms where
//! the native watcher is unreliable. Both deliver [`FileEvent`]s into
//! the same channel; duplicates are tolerated downstream because
//! analysis is idempotent per input.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher as _};
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("failed to watch {path}: {source}")]
    Start {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error("file event source failed: {0}")]
    Runtime(String),
}

/// One event out of a file event source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEvent {
    /// A file was created under the watched directory.
    Created(PathBuf),
    /// The watcher itself failed; fatal for the worker.
    Error(String),
}

/// A source of create events for a directory tree.
pub trait FileEventSource: Send {
    /// Start watching; events flow into `events` from a background
    /// thread until [`shutdown`] or drop.
    ///
    /// [`shutdown`]: FileEventSource::shutdown
    fn watch(
        &mut self,
        dir: &Path,
        recursive: bool,
        events: mpsc::Sender<FileEvent>,
    ) -> Result<(), WatchError>;

    /// Stop the background observer and join it.
    fn shutdown(&mut self);
}

/// Native watcher via the `notify` crate.
#[derive(Default)]
pub struct NotifyEventSource {
    watcher: Option<RecommendedWatcher>,
}

impl FileEventSource for NotifyEventSource {
    fn watch(
        &mut self,
        dir: &Path,
        recursive: bool,
        events: mpsc::Sender<FileEvent>,
    ) -> Result<(), WatchError> {
        let tx = events;
        let mut watcher = notify::recommended_watcher(
            move |result: Result<notify::Event, notify::Error>| match result {
                Ok(event) if matches!(event.kind, EventKind::Create(_)) => {
                    for path in event.paths {
                        let _ = tx.blocking_send(FileEvent::Created(path));
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    let _ = tx.blocking_send(FileEvent::Error(e.to_string()));
                }
            },
        )
        .map_err(|source| WatchError::Start {
            path: dir.to_path_buf(),
            source,
        })?;

        let mode = if recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher
            .watch(dir, mode)
            .map_err(|source| WatchError::Start {
                path: dir.to_path_buf(),
                source,
            })?;

        self.watcher = Some(watcher);
        Ok(())
    }

    fn shutdown(&mut self) {
        // Dropping the watcher stops its observer thread.
        self.watcher = None;
    }
}

/// How often the polling fallback rescans, and the sub-interval at
/// which it checks for cancellation.
const POLL_INTERVAL: Duration = Duration::from_millis(500);
const CANCEL_CHECK_INTERVAL: Duration = Duration::from_millis(50);

/// Polling fallback: rescans the tree on a fixed interval and reports
/// paths not seen before. Files already present when the watch starts
/// are recorded but not reported.
pub struct PollingEventSource {
    interval: Duration,
    cancel: Option<Arc<AtomicBool>>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl Default for PollingEventSource {
    fn default() -> Self {
        Self::with_interval(POLL_INTERVAL)
    }
}

impl PollingEventSource {
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            cancel: None,
            thread: None,
        }
    }
}

impl FileEventSource for PollingEventSource {
    fn watch(
        &mut self,
        dir: &Path,
        recursive: bool,
        events: mpsc::Sender<FileEvent>,
    ) -> Result<(), WatchError> {
        let cancel = Arc::new(AtomicBool::new(false));
        self.cancel = Some(Arc::clone(&cancel));

        let dir = dir.to_path_buf();
        let interval = self.interval;
        self.thread = Some(std::thread::spawn(move || {
            let mut known: HashSet<PathBuf> = HashSet::new();
            collect_files(&dir, recursive, &mut known);

            while !cancel.load(Ordering::Relaxed) {
                let mut seen: HashSet<PathBuf> = HashSet::new();
                collect_files(&dir, recursive, &mut seen);
                for path in seen.difference(&known) {
                    if events
                        .blocking_send(FileEvent::Created(path.clone()))
                        .is_err()
                    {
                        return;
                    }
                }
                known = seen;

                // Sleep in sub-intervals so cancellation is prompt
                let mut slept = Duration::ZERO;
                while slept < interval && !cancel.load(Ordering::Relaxed) {
                    let step = CANCEL_CHECK_INTERVAL.min(interval - slept);
                    std::thread::sleep(step);
                    slept += step;
                }
            }
        }));
        Ok(())
    }

    fn shutdown(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.store(true, Ordering::Relaxed);
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for PollingEventSource {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn collect_files(dir: &Path, recursive: bool, into: &mut HashSet<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if recursive {
                collect_files(&path, recursive, into);
            }
        } else if path.is_file() {
            into.insert(path);
        }
    }
}

#[cfg(test)]
#[path = "fs_events_tests.rs"]
mod tests;
