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

//! Boundary to the remote notification-service SDK.
//!
//! The coordinator never speaks the streaming protocol itself. It drives an
//! implementation of [`StreamingClient`], which hands out one
//! [`StreamingConnection`] and reports inbound traffic through the
//! [`ConnectionListener`] installed at creation time.

use crate::notification::{EventCategory, NotificationBatch, ResourceId};
use crate::principal::PrincipalKey;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Status codes reported by the remote service.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ServiceErrorCode {
    InvalidArgument,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    ResourceExhausted,
    Unavailable,
    Internal,
}

/// Failure reported by the remote service for a single request.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{code:?}: {message}")]
pub struct ServiceError {
    code: ServiceErrorCode,
    message: String,
}

impl ServiceError {
    pub fn fail_with_code(code: ServiceErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> ServiceErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Identifier the remote service assigns to a subscription; inbound batches carry it.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SubscriptionId(String);

impl SubscriptionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SubscriptionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque token for one active remote subscription.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubscriptionHandle {
    id: SubscriptionId,
}

impl SubscriptionHandle {
    pub fn new(id: SubscriptionId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> &SubscriptionId {
        &self.id
    }
}

/// Hints that let the remote service direct a request to the backend node
/// hosting the principal's mailbox.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoutingHints {
    pub anchor_mailbox: String,
    pub prefer_server_affinity: bool,
}

impl RoutingHints {
    pub fn for_principal(principal: &PrincipalKey) -> Self {
        Self {
            anchor_mailbox: principal.as_str().to_string(),
            prefer_server_affinity: true,
        }
    }
}

/// Everything the client needs to create one subscription on behalf of a principal.
///
/// `principal` is the impersonated identity for the call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubscribeRequest {
    pub principal: PrincipalKey,
    pub routing: RoutingHints,
    pub resource_ids: BTreeSet<ResourceId>,
    pub event_categories: BTreeSet<EventCategory>,
}

impl SubscribeRequest {
    pub fn new(
        principal: PrincipalKey,
        resource_ids: BTreeSet<ResourceId>,
        event_categories: BTreeSet<EventCategory>,
    ) -> Self {
        Self {
            routing: RoutingHints::for_principal(&principal),
            principal,
            resource_ids,
            event_categories,
        }
    }
}

/// Details attached to a transport-level disconnect.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DisconnectContext {
    pub reason: Option<String>,
    pub error: Option<ServiceError>,
}

/// Details attached to an error the service raised for one subscription.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubscriptionErrorContext {
    pub subscription_id: Option<SubscriptionId>,
    pub error: ServiceError,
}

/// Callback surface of a [`StreamingConnection`].
///
/// Implementations are invoked from tasks owned by the transport.
#[async_trait]
pub trait ConnectionListener: Send + Sync {
    async fn on_notification(&self, batch: NotificationBatch);

    async fn on_disconnect(&self, context: DisconnectContext);

    async fn on_subscription_error(&self, context: SubscriptionErrorContext);
}

/// One physical streaming connection multiplexing many subscriptions.
#[async_trait]
pub trait StreamingConnection: Send + Sync {
    async fn open(&self) -> Result<(), ServiceError>;

    async fn close(&self) -> Result<(), ServiceError>;

    fn is_open(&self) -> bool;

    async fn add_subscription(&self, handle: &SubscriptionHandle) -> Result<(), ServiceError>;

    async fn remove_subscription(&self, handle: &SubscriptionHandle) -> Result<(), ServiceError>;

    async fn dispose(&self);
}

/// Client for the remote notification service.
#[async_trait]
pub trait StreamingClient: Send + Sync {
    /// URL of the service endpoint the client talks to.
    fn endpoint(&self) -> &str;

    async fn create_connection(
        &self,
        max_notifications_per_batch: u16,
        listener: Arc<dyn ConnectionListener>,
    ) -> Result<Arc<dyn StreamingConnection>, ServiceError>;

    async fn subscribe_to_streaming_notifications(
        &self,
        request: SubscribeRequest,
    ) -> Result<SubscriptionHandle, ServiceError>;
}
