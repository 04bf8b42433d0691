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

//! Maps inbound notification batches back to the principal that subscribed.

use crate::control_plane::subscription_registry::SubscriptionRegistry;
use crate::notification::{EventProcessor, NotificationBatch, RoutedEventRecord};
use crate::observability::events;
use crate::principal::PrincipalKey;
use crate::service::SubscriptionId;
use std::sync::Arc;
use tracing::debug;

const COMPONENT: &str = "event_router";

pub(crate) struct EventRouter {
    group_id: String,
    registry: Arc<SubscriptionRegistry>,
    processor: Arc<dyn EventProcessor>,
}

impl EventRouter {
    pub(crate) fn new(
        group_id: &str,
        registry: Arc<SubscriptionRegistry>,
        processor: Arc<dyn EventProcessor>,
    ) -> Self {
        Self {
            group_id: group_id.to_string(),
            registry,
            processor,
        }
    }

    pub(crate) async fn resolve(&self, subscription_id: &SubscriptionId) -> Option<PrincipalKey> {
        self.registry.principal_for(subscription_id).await
    }

    /// Delivers `batch` to the processor. Returns `false` when no registered
    /// subscription matches, which happens when a remove races an in-flight batch.
    pub(crate) async fn route(&self, batch: NotificationBatch) -> bool {
        let NotificationBatch {
            subscription_id,
            events: payloads,
        } = batch;

        let Some(principal) = self.resolve(&subscription_id).await else {
            debug!(
                event = events::NOTIFICATION_DROPPED_UNKNOWN_SUBSCRIPTION,
                component = COMPONENT,
                group_id = self.group_id.as_str(),
                subscription_id = subscription_id.as_str(),
                event_count = payloads.len(),
                "dropping notification for unknown subscription"
            );
            return false;
        };

        debug!(
            event = events::NOTIFICATION_ROUTED,
            component = COMPONENT,
            group_id = self.group_id.as_str(),
            principal = principal.as_str(),
            subscription_id = subscription_id.as_str(),
            event_count = payloads.len(),
            "routing notification batch"
        );

        self.processor
            .process(RoutedEventRecord::new(principal, payloads));
        true
    }
}
