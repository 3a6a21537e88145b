// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The two watcher flags, `may_work` and `done_analyzing`.
//!
//! A [`Flag`] is a non-resetting boolean with `wait`/`set`/`clear`
//! semantics on a `tokio::sync::watch` channel: waiting drains the
//! signal non-destructively, and nothing auto-resets a flag.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

/// Clones share the same underlying flag.
#[derive(Debug, Clone)]
pub struct Flag {
    tx: Arc<watch::Sender<bool>>,
}

impl Flag {
    pub fn new(initial: bool) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn set(&self) {
        self.tx.send_replace(true);
    }

    pub fn clear(&self) {
        self.tx.send_replace(false);
    }

    pub fn get(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait until the flag is set. Returns immediately if it already is.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in self, so the channel cannot close while
        // we hold &self.
        let _ = rx.wait_for(|v| *v).await;
    }

    /// Wait until the flag is set, up to `timeout`. Returns whether the
    /// flag was observed set.
    pub async fn wait_timeout(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, self.wait()).await.is_ok()
    }
}

#[cfg(test)]
#[path = "signals_tests.rs"]
mod tests;
