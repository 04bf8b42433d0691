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

use crate::config::CoordinatorConfig;
use crate::control_plane::connection_lifecycle::{CloseIntent, ConnectionLifecycle, MutationGuard};
use crate::control_plane::subscription_registry::SubscriptionRegistry;
use crate::data_plane::connection_listener::CoordinatorListener;
use crate::data_plane::event_router::EventRouter;
use crate::error::CoordinatorError;
use crate::notification::{EventCategory, EventProcessor, ResourceId};
use crate::observability::{events, fields};
use crate::principal::PrincipalKey;
use crate::runtime::disconnect_supervisor::spawn_disconnect_supervisor;
use crate::service::{
    ConnectionListener, ServiceError, StreamingClient, SubscribeRequest, SubscriptionHandle,
};
use std::sync::Arc;
use tokio::sync::mpsc::unbounded_channel;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const COMPONENT: &str = "subscription_collection";

/// A set of per-principal streaming subscriptions sharing one connection.
///
/// The connection is open whenever at least one subscription exists. Every
/// `add`, `remove`, `clear` and `dispose` closes it, applies the change and
/// reopens it under one per-instance lock. Drops the coordinator did not
/// initiate are repaired in the background according to the configured
/// [`ReconnectPolicy`](crate::ReconnectPolicy).
pub struct StreamingSubscriptionCollection {
    group_id: String,
    client: Arc<dyn StreamingClient>,
    lifecycle: Arc<ConnectionLifecycle>,
    registry: Arc<SubscriptionRegistry>,
    supervisor: JoinHandle<()>,
}

impl StreamingSubscriptionCollection {
    /// Creates a collection with [`CoordinatorConfig::default`].
    ///
    /// `group_id` labels the connection in diagnostics only.
    pub async fn new(
        client: Arc<dyn StreamingClient>,
        processor: Arc<dyn EventProcessor>,
        group_id: &str,
    ) -> Result<Self, CoordinatorError> {
        Self::with_config(client, processor, group_id, CoordinatorConfig::default()).await
    }

    pub async fn with_config(
        client: Arc<dyn StreamingClient>,
        processor: Arc<dyn EventProcessor>,
        group_id: &str,
        config: CoordinatorConfig,
    ) -> Result<Self, CoordinatorError> {
        config.validate()?;

        let registry = Arc::new(SubscriptionRegistry::new());
        let intent = CloseIntent::default();
        let (events_tx, events_rx) = unbounded_channel();

        let router = EventRouter::new(group_id, registry.clone(), processor);
        let listener: Arc<dyn ConnectionListener> = Arc::new(CoordinatorListener::new(
            group_id,
            router,
            intent.clone(),
            events_tx,
        ));

        let connection = client
            .create_connection(config.max_notifications_per_batch, listener)
            .await
            .map_err(CoordinatorError::Connection)?;

        let lifecycle = Arc::new(ConnectionLifecycle::new(
            group_id,
            connection,
            intent,
            config.reconnect,
        ));
        let supervisor =
            spawn_disconnect_supervisor(group_id, lifecycle.clone(), registry.clone(), events_rx);

        debug!(
            component = COMPONENT,
            group_id,
            endpoint = client.endpoint(),
            "subscription collection created"
        );

        Ok(Self {
            group_id: group_id.to_string(),
            client,
            lifecycle,
            registry,
            supervisor,
        })
    }

    /// Subscribes `principal_id` to `event_categories` on `resource_ids`.
    ///
    /// An existing subscription for the same principal is replaced once the new
    /// one is attached and the old one detached. If any of those steps fails the
    /// new handle is released and the old subscription stays in place.
    pub async fn add<R, C>(
        &self,
        principal_id: &str,
        resource_ids: R,
        event_categories: C,
    ) -> Result<(), CoordinatorError>
    where
        R: IntoIterator<Item = ResourceId>,
        C: IntoIterator<Item = EventCategory>,
    {
        let principal = PrincipalKey::parse(principal_id)?;
        let request = SubscribeRequest::new(
            principal.clone(),
            resource_ids.into_iter().collect(),
            event_categories.into_iter().collect(),
        );

        let mut guard = self.lifecycle.lock().await?;
        debug!(
            event = events::SUBSCRIPTION_ADD_START,
            component = COMPONENT,
            group_id = self.group_id.as_str(),
            principal = principal.as_str(),
            "adding subscription"
        );

        guard
            .close_intentionally()
            .await
            .map_err(CoordinatorError::Connection)?;

        let handle = match self
            .client
            .subscribe_to_streaming_notifications(request)
            .await
        {
            Ok(handle) => handle,
            Err(err) => {
                return Err(self
                    .fail_add(&mut guard, principal, err, "remote service rejected subscription")
                    .await);
            }
        };

        if let Err(err) = guard.connection().add_subscription(&handle).await {
            self.discard_handle(&guard, &principal, &handle).await;
            return Err(self
                .fail_add(&mut guard, principal, err, "connection refused new subscription")
                .await);
        }

        // The old handle must leave the connection before the registry forgets it.
        if let Some(previous) = self.registry.get(&principal).await {
            if let Err(err) = guard.connection().remove_subscription(&previous).await {
                self.discard_handle(&guard, &principal, &handle).await;
                return Err(self
                    .fail_add(&mut guard, principal, err, "unable to detach replaced subscription")
                    .await);
            }
            debug!(
                event = events::SUBSCRIPTION_REPLACED,
                component = COMPONENT,
                group_id = self.group_id.as_str(),
                principal = principal.as_str(),
                subscription_id = previous.id().as_str(),
                "replaced existing subscription"
            );
        }

        let subscription_id = handle.id().clone();
        self.registry.insert(principal.clone(), handle).await;

        guard.reopen().await.map_err(CoordinatorError::Connection)?;

        info!(
            event = events::SUBSCRIPTION_ADD_OK,
            component = COMPONENT,
            group_id = self.group_id.as_str(),
            principal = principal.as_str(),
            subscription_id = subscription_id.as_str(),
            "subscription added"
        );
        Ok(())
    }

    /// Removes the subscription for `principal_id`.
    ///
    /// Returns `Ok(false)` without touching the connection when the principal
    /// has no subscription.
    pub async fn remove(&self, principal_id: &str) -> Result<bool, CoordinatorError> {
        let principal = PrincipalKey::parse(principal_id)?;
        let mut guard = self.lifecycle.lock().await?;

        let Some(handle) = self.registry.get(&principal).await else {
            debug!(
                event = events::SUBSCRIPTION_REMOVE_NOT_FOUND,
                component = COMPONENT,
                group_id = self.group_id.as_str(),
                principal = principal.as_str(),
                "no subscription to remove"
            );
            return Ok(false);
        };

        debug!(
            event = events::SUBSCRIPTION_REMOVE_START,
            component = COMPONENT,
            group_id = self.group_id.as_str(),
            principal = principal.as_str(),
            subscription_id = handle.id().as_str(),
            "removing subscription"
        );

        guard
            .close_intentionally()
            .await
            .map_err(CoordinatorError::Connection)?;

        if let Err(err) = guard.connection().remove_subscription(&handle).await {
            warn!(
                event = events::SUBSCRIPTION_REMOVE_FAILED,
                component = COMPONENT,
                group_id = self.group_id.as_str(),
                principal = principal.as_str(),
                subscription_id = handle.id().as_str(),
                err = %err,
                "remote service rejected unsubscribe"
            );
            self.restore_after_failure(&mut guard).await;
            return Err(CoordinatorError::Subscription {
                principal,
                source: err,
            });
        }

        self.registry.remove(&principal).await;

        if !self.registry.is_empty().await {
            guard.reopen().await.map_err(CoordinatorError::Connection)?;
        }

        info!(
            event = events::SUBSCRIPTION_REMOVE_OK,
            component = COMPONENT,
            group_id = self.group_id.as_str(),
            principal = principal.as_str(),
            subscription_id = handle.id().as_str(),
            "subscription removed"
        );
        Ok(true)
    }

    /// Drops every subscription and leaves the connection closed.
    pub async fn clear(&self) -> Result<(), CoordinatorError> {
        let mut guard = self.lifecycle.lock().await?;

        let closed = guard.close_intentionally().await;
        let released = self.release_all(&guard).await;

        info!(
            event = events::SUBSCRIPTION_CLEAR,
            component = COMPONENT,
            group_id = self.group_id.as_str(),
            registry_len = released,
            "cleared subscriptions"
        );
        closed.map_err(CoordinatorError::Connection)
    }

    /// Closes and releases the connection. Later structural calls fail with
    /// [`CoordinatorError::Closed`]; calling `dispose` again is a no-op.
    pub async fn dispose(&self) -> Result<(), CoordinatorError> {
        let mut guard = match self.lifecycle.lock().await {
            Ok(guard) => guard,
            Err(CoordinatorError::Closed) => return Ok(()),
            Err(err) => return Err(err),
        };

        let closed = guard.close_intentionally().await;
        let released = self.release_all(&guard).await;
        guard.connection().dispose().await;
        guard.mark_disposed();
        self.supervisor.abort();

        info!(
            event = events::COLLECTION_DISPOSED,
            component = COMPONENT,
            group_id = self.group_id.as_str(),
            registry_len = released,
            "subscription collection disposed"
        );
        closed.map_err(CoordinatorError::Connection)
    }

    /// Snapshot of principals with an active subscription, sorted.
    pub async fn active_principals(&self) -> Vec<PrincipalKey> {
        self.registry.principals().await
    }

    /// Whether `principal_id` currently has a subscription. Malformed ids never do.
    pub async fn contains(&self, principal_id: &str) -> bool {
        match PrincipalKey::parse(principal_id) {
            Ok(principal) => self.registry.contains(&principal).await,
            Err(_) => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.registry.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.registry.is_empty().await
    }

    pub fn is_connection_open(&self) -> bool {
        self.lifecycle.is_open()
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// Endpoint of the remote service, for diagnostics.
    pub fn target_endpoint(&self) -> &str {
        self.client.endpoint()
    }

    /// Logs a failed add, restores the connection and builds the caller's error.
    async fn fail_add(
        &self,
        guard: &mut MutationGuard<'_>,
        principal: PrincipalKey,
        err: ServiceError,
        message: &'static str,
    ) -> CoordinatorError {
        warn!(
            event = events::SUBSCRIPTION_ADD_FAILED,
            component = COMPONENT,
            group_id = self.group_id.as_str(),
            principal = principal.as_str(),
            err = %err,
            "{message}"
        );
        self.restore_after_failure(guard).await;
        CoordinatorError::Subscription {
            principal,
            source: err,
        }
    }

    /// Best-effort release of a handle that never made it into the registry.
    async fn discard_handle(
        &self,
        guard: &MutationGuard<'_>,
        principal: &PrincipalKey,
        handle: &SubscriptionHandle,
    ) {
        if let Err(err) = guard.connection().remove_subscription(handle).await {
            debug!(
                event = events::SUBSCRIPTION_REMOVE_FAILED,
                component = COMPONENT,
                group_id = self.group_id.as_str(),
                principal = principal.as_str(),
                subscription_id = handle.id().as_str(),
                err = %err,
                "unable to release discarded subscription"
            );
        }
    }

    /// After a failed request, reopens the connection for the principals that
    /// are still registered.
    async fn restore_after_failure(&self, guard: &mut MutationGuard<'_>) {
        if self.registry.is_empty().await {
            return;
        }

        if let Err(err) = guard.reopen().await {
            warn!(
                event = events::CONNECTION_OPEN_FAILED,
                component = COMPONENT,
                group_id = self.group_id.as_str(),
                reason = fields::REASON_RESTORE_AFTER_FAILURE,
                err = %err,
                "unable to reopen connection after failed request"
            );
        }
    }

    /// Empties the registry and detaches each handle from the connection.
    async fn release_all(&self, guard: &MutationGuard<'_>) -> usize {
        let drained = self.registry.drain().await;

        for (principal, handle) in &drained {
            if let Err(err) = guard.connection().remove_subscription(handle).await {
                warn!(
                    event = events::SUBSCRIPTION_REMOVE_FAILED,
                    component = COMPONENT,
                    group_id = self.group_id.as_str(),
                    principal = principal.as_str(),
                    subscription_id = handle.id().as_str(),
                    err = %err,
                    "unable to detach subscription while clearing"
                );
            }
        }

        drained.len()
    }
}

impl Drop for StreamingSubscriptionCollection {
    fn drop(&mut self) {
        self.supervisor.abort();
    }
}
