/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

mod support;

use integration_test_utils::{wait_until, ConnectionOp};
use mailbox_streamer::{CoordinatorConfig, CoordinatorError, ReconnectPolicy};
use support::{assert_add_ok, make_harness, make_harness_with_config, Harness, SETTLE, WAIT};

fn fast_reconnect(max_attempts: Option<u32>) -> CoordinatorConfig {
    CoordinatorConfig {
        reconnect: ReconnectPolicy {
            initial_backoff_ms: 5,
            max_backoff_ms: 20,
            multiplier: 2.0,
            max_attempts,
        },
        ..Default::default()
    }
}

async fn wait_for_open(harness: &Harness) -> bool {
    wait_until(WAIT, || harness.collection.is_connection_open()).await
}

#[tokio::test]
async fn unexpected_drop_reopens_exactly_once() {
    let harness = make_harness("single-drop").await;
    assert_add_ok(&harness, "alice@x.com").await;
    harness.client.clear_ops();

    harness
        .client
        .connection()
        .simulate_drop("connection reset by peer")
        .await;

    assert!(wait_for_open(&harness).await);
    tokio::time::sleep(SETTLE).await;
    assert_eq!(harness.client.ops(), vec![ConnectionOp::Open]);
    assert!(harness.collection.contains("alice@x.com").await);
}

#[tokio::test]
async fn repeated_drop_callbacks_collapse_into_one_reopen() {
    let harness = make_harness("double-drop").await;
    assert_add_ok(&harness, "alice@x.com").await;
    harness.client.clear_ops();

    let connection = harness.client.connection();
    connection.simulate_drop("first").await;
    connection.simulate_drop("second").await;

    assert!(wait_for_open(&harness).await);
    tokio::time::sleep(SETTLE).await;
    assert_eq!(harness.client.count_ops(&ConnectionOp::Open), 1);
}

#[tokio::test]
async fn spurious_disconnect_on_open_connection_is_ignored() {
    let harness = make_harness("spurious").await;
    assert_add_ok(&harness, "alice@x.com").await;
    harness.client.clear_ops();

    harness.client.connection().fire_disconnect("stale callback").await;

    tokio::time::sleep(SETTLE).await;
    assert!(harness.collection.is_connection_open());
    assert!(harness.client.ops().is_empty());
}

#[tokio::test]
async fn drop_with_no_subscriptions_stays_closed() {
    let harness = make_harness("empty-drop").await;
    assert_add_ok(&harness, "alice@x.com").await;
    assert!(harness.collection.remove("alice@x.com").await.unwrap());
    harness.client.clear_ops();

    harness.client.connection().simulate_drop("idle timeout").await;

    tokio::time::sleep(SETTLE).await;
    assert!(!harness.collection.is_connection_open());
    assert!(harness.client.ops().is_empty());
}

#[tokio::test]
async fn failed_reopen_backs_off_and_retries() {
    let harness = make_harness_with_config("backoff", fast_reconnect(Some(5))).await;
    assert_add_ok(&harness, "alice@x.com").await;
    harness.client.clear_ops();
    harness.client.fail_next_opens(2);

    harness.client.connection().simulate_drop("network down").await;

    assert!(wait_for_open(&harness).await);
    tokio::time::sleep(SETTLE).await;
    assert_eq!(harness.client.count_ops(&ConnectionOp::Open), 3);
}

#[tokio::test]
async fn reconnect_gives_up_after_max_attempts() {
    let harness = make_harness_with_config("give-up", fast_reconnect(Some(2))).await;
    assert_add_ok(&harness, "alice@x.com").await;
    harness.client.clear_ops();
    harness.client.fail_next_opens(2);

    harness.client.connection().simulate_drop("network down").await;

    assert!(wait_until(WAIT, || harness.client.count_ops(&ConnectionOp::Open) == 2).await);
    tokio::time::sleep(SETTLE).await;
    assert_eq!(harness.client.count_ops(&ConnectionOp::Open), 2);
    assert!(!harness.collection.is_connection_open());
    assert!(harness.collection.contains("alice@x.com").await);

    // The next mutation brings the connection back.
    assert_add_ok(&harness, "bob@x.com").await;
    assert!(harness.collection.is_connection_open());
}

#[tokio::test]
async fn mutations_stay_available_while_reconnecting() {
    let harness = make_harness_with_config("mutate-during-backoff", fast_reconnect(None)).await;
    assert_add_ok(&harness, "alice@x.com").await;
    harness.client.fail_next_opens(1);

    harness.client.connection().simulate_drop("network down").await;
    assert!(wait_until(WAIT, || harness.client.count_ops(&ConnectionOp::Open) == 2).await);

    assert_add_ok(&harness, "bob@x.com").await;

    tokio::time::sleep(SETTLE).await;
    assert!(harness.collection.is_connection_open());
    assert_eq!(harness.collection.len().await, 2);
}

#[tokio::test]
async fn disposed_collection_never_reconnects() {
    let harness = make_harness("disposed").await;
    assert_add_ok(&harness, "alice@x.com").await;
    let connection = harness.client.connection();

    harness.collection.dispose().await.unwrap();
    harness.client.clear_ops();
    connection.simulate_drop("late drop").await;

    tokio::time::sleep(SETTLE).await;
    assert!(harness.client.ops().is_empty());
    assert!(!harness.collection.is_connection_open());
    assert!(matches!(
        harness.collection.remove("alice@x.com").await,
        Err(CoordinatorError::Closed)
    ));
}
