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

// Not every test binary uses every helper.
#![allow(dead_code)]

use integration_test_utils::{FakeStreamingClient, RecordingProcessor};
use mailbox_streamer::{
    CoordinatorConfig, EventCategory, ResourceId, StreamingSubscriptionCollection,
    SubscriptionId,
};
use std::sync::Arc;
use std::time::Duration;

pub(crate) const ENDPOINT: &str = "https://outlook.example.com/EWS/Exchange.asmx";
pub(crate) const SETTLE: Duration = Duration::from_millis(50);
pub(crate) const WAIT: Duration = Duration::from_secs(2);

pub(crate) struct Harness {
    pub(crate) client: Arc<FakeStreamingClient>,
    pub(crate) processor: RecordingProcessor,
    pub(crate) collection: StreamingSubscriptionCollection,
}

pub(crate) async fn make_harness(group_id: &str) -> Harness {
    make_harness_with_config(group_id, CoordinatorConfig::default()).await
}

pub(crate) async fn make_harness_with_config(group_id: &str, config: CoordinatorConfig) -> Harness {
    integration_test_utils::init_logging();

    let client = Arc::new(FakeStreamingClient::new(ENDPOINT));
    let processor = RecordingProcessor::new();
    let collection = StreamingSubscriptionCollection::with_config(
        client.clone(),
        Arc::new(processor.clone()),
        group_id,
        config,
    )
    .await
    .expect("collection creation should succeed");

    Harness {
        client,
        processor,
        collection,
    }
}

pub(crate) fn inbox() -> Vec<ResourceId> {
    vec![ResourceId::new("inbox")]
}

pub(crate) fn new_mail() -> Vec<EventCategory> {
    vec![EventCategory::NewMail]
}

pub(crate) async fn assert_add_ok(harness: &Harness, principal: &str) {
    assert!(harness
        .collection
        .add(principal, inbox(), new_mail())
        .await
        .is_ok());
}

pub(crate) fn subscription_id_for(harness: &Harness, principal: &str) -> SubscriptionId {
    harness
        .client
        .handle_for(principal)
        .expect("principal should have been subscribed")
        .id()
        .clone()
}
