// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::Arc;

#[test]
fn set_clear_get() {
    let flag = Flag::new(false);
    assert!(!flag.get());
    flag.set();
    assert!(flag.get());
    flag.set();
    assert!(flag.get());
    flag.clear();
    assert!(!flag.get());
}

#[tokio::test]
async fn wait_returns_immediately_when_set() {
    let flag = Flag::new(true);
    tokio::time::timeout(Duration::from_millis(100), flag.wait())
        .await
        .unwrap();
}

#[tokio::test]
async fn wait_blocks_until_set() {
    let flag = Arc::new(Flag::new(false));
    let waiter = {
        let flag = Arc::clone(&flag);
        tokio::spawn(async move {
            flag.wait().await;
        })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!waiter.is_finished());
    flag.set();
    tokio::time::timeout(Duration::from_secs(1), waiter)
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn waiting_does_not_consume_the_signal() {
    let flag = Flag::new(false);
    flag.set();
    flag.wait().await;
    flag.wait().await;
    assert!(flag.get());
}

#[tokio::test]
async fn wait_timeout_reports_outcome() {
    let flag = Flag::new(false);
    assert!(!flag.wait_timeout(Duration::from_millis(20)).await);
    flag.set();
    assert!(flag.wait_timeout(Duration::from_millis(20)).await);
}

#[tokio::test]
async fn clear_while_waiting_keeps_the_waiter_parked() {
    let flag = Arc::new(Flag::new(false));
    let waiter = {
        let flag = Arc::clone(&flag);
        tokio::spawn(async move { flag.wait().await })
    };
    flag.clear();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!waiter.is_finished());
    flag.set();
    tokio::time::timeout(Duration::from_secs(1), waiter)
        .await
        .unwrap()
        .unwrap();
}
