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

//! Inbound notification model and the outward event-processing callback.

use crate::principal::PrincipalKey;
use crate::service::SubscriptionId;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Identifier of a watched resource (typically a mail folder).
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ResourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Category of change a subscription is interested in.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    NewMail,
    Created,
    Deleted,
    Modified,
    Moved,
    Copied,
    FreeBusyChanged,
}

/// A single raw notification payload delivered by the remote service.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub category: EventCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<ResourceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_item_id: Option<String>,
}

impl NotificationEvent {
    pub fn new(category: EventCategory) -> Self {
        Self {
            category,
            resource_id: None,
            item_id: None,
            old_item_id: None,
        }
    }

    pub fn with_resource(mut self, resource_id: ResourceId) -> Self {
        self.resource_id = Some(resource_id);
        self
    }

    pub fn with_item(mut self, item_id: impl Into<String>) -> Self {
        self.item_id = Some(item_id.into());
        self
    }
}

/// A batch of events the connection delivered for one subscription.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotificationBatch {
    pub subscription_id: SubscriptionId,
    pub events: Vec<NotificationEvent>,
}

impl NotificationBatch {
    pub fn new(subscription_id: SubscriptionId, events: Vec<NotificationEvent>) -> Self {
        Self {
            subscription_id,
            events,
        }
    }
}

/// The `(principal, events)` pair handed to the [`EventProcessor`] after routing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutedEventRecord {
    principal: PrincipalKey,
    events: Vec<NotificationEvent>,
}

impl RoutedEventRecord {
    pub(crate) fn new(principal: PrincipalKey, events: Vec<NotificationEvent>) -> Self {
        Self { principal, events }
    }

    pub fn principal(&self) -> &PrincipalKey {
        &self.principal
    }

    pub fn events(&self) -> &[NotificationEvent] {
        &self.events
    }
}

/// External consumer of routed notifications.
///
/// Invoked on the connection's notification task, once per routed batch.
/// Closures of shape `Fn(RoutedEventRecord)` implement this trait.
pub trait EventProcessor: Send + Sync {
    fn process(&self, record: RoutedEventRecord);
}

impl<F> EventProcessor for F
where
    F: Fn(RoutedEventRecord) + Send + Sync,
{
    fn process(&self, record: RoutedEventRecord) {
        self(record)
    }
}
