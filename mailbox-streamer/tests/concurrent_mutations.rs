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

use futures::future::join_all;
use integration_test_utils::{wait_until, ConnectionOp};
use mailbox_streamer::StreamingSubscriptionCollection;
use std::sync::Arc;
use support::{inbox, make_harness, new_mail, SETTLE, WAIT};

async fn add_all(collection: &Arc<StreamingSubscriptionCollection>, principals: &[String]) {
    let tasks = principals.iter().cloned().map(|principal| {
        let collection = collection.clone();
        tokio::spawn(async move { collection.add(&principal, inbox(), new_mail()).await })
    });

    for result in join_all(tasks).await {
        assert!(result.unwrap().is_ok());
    }
}

async fn remove_all(collection: &Arc<StreamingSubscriptionCollection>, principals: &[String]) {
    let tasks = principals.iter().cloned().map(|principal| {
        let collection = collection.clone();
        tokio::spawn(async move { collection.remove(&principal).await })
    });

    for result in join_all(tasks).await {
        assert!(result.unwrap().unwrap());
    }
}

fn addresses(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|n| format!("{prefix}{n}@x.com")).collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_mutations_never_overlap_on_the_connection() {
    let harness = make_harness("concurrent").await;
    let client = harness.client.clone();
    let collection = Arc::new(harness.collection);

    let first_wave = addresses("user", 16);
    add_all(&collection, &first_wave).await;
    assert_eq!(collection.len().await, 16);
    assert!(collection.is_connection_open());

    let (leaving, staying) = first_wave.split_at(8);
    let second_wave = addresses("guest", 8);
    tokio::join!(
        remove_all(&collection, leaving),
        add_all(&collection, &second_wave)
    );

    let mut expected: Vec<String> = staying.iter().chain(&second_wave).cloned().collect();
    expected.sort();
    let active: Vec<String> = collection
        .active_principals()
        .await
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(active, expected);
    assert!(collection.is_connection_open());
    assert_eq!(client.connection().subscriptions().len(), 16);

    remove_all(&collection, &expected).await;
    assert!(collection.is_empty().await);
    assert!(!collection.is_connection_open());
    assert!(client.connection().subscriptions().is_empty());

    assert_eq!(client.max_concurrent_ops(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn drops_during_mutations_settle_with_connection_open() {
    let harness = make_harness("concurrent-drops").await;
    let client = harness.client.clone();
    let collection = Arc::new(harness.collection);
    add_all(&collection, &addresses("seed", 2)).await;

    let connection = client.connection();
    let dropper = tokio::spawn(async move {
        for round in 0..5 {
            connection.simulate_drop(&format!("flap {round}")).await;
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }
    });
    add_all(&collection, &addresses("late", 6)).await;
    dropper.await.unwrap();

    assert!(wait_until(WAIT, || collection.is_connection_open()).await);
    tokio::time::sleep(SETTLE).await;
    assert!(collection.is_connection_open());
    assert_eq!(collection.len().await, 8);
    assert!(client.count_ops(&ConnectionOp::Open) >= 1);
    assert_eq!(client.max_concurrent_ops(), 1);
}
