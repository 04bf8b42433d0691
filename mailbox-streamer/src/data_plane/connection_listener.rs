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

//! Listener installed on the streaming connection.

use crate::control_plane::connection_lifecycle::CloseIntent;
use crate::data_plane::event_router::EventRouter;
use crate::notification::NotificationBatch;
use crate::observability::{events, fields};
use crate::service::{ConnectionListener, DisconnectContext, SubscriptionErrorContext};
use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

const COMPONENT: &str = "connection_listener";

/// Work handed from connection callbacks to the disconnect supervisor.
#[derive(Debug)]
pub(crate) enum ConnectionEvent {
    UnexpectedDisconnect(DisconnectContext),
}

pub(crate) struct CoordinatorListener {
    group_id: String,
    router: EventRouter,
    intent: CloseIntent,
    supervisor: UnboundedSender<ConnectionEvent>,
}

impl CoordinatorListener {
    pub(crate) fn new(
        group_id: &str,
        router: EventRouter,
        intent: CloseIntent,
        supervisor: UnboundedSender<ConnectionEvent>,
    ) -> Self {
        Self {
            group_id: group_id.to_string(),
            router,
            intent,
            supervisor,
        }
    }
}

#[async_trait]
impl ConnectionListener for CoordinatorListener {
    async fn on_notification(&self, batch: NotificationBatch) {
        self.router.route(batch).await;
    }

    async fn on_disconnect(&self, context: DisconnectContext) {
        let reason = context.reason.as_deref().unwrap_or(fields::NONE);

        // Sampled now: by the time the supervisor runs, the mutation that set
        // the flag has already cleared it.
        if self.intent.is_set() {
            debug!(
                event = events::DISCONNECT_INTENTIONAL,
                component = COMPONENT,
                group_id = self.group_id.as_str(),
                reason,
                "connection closed by coordinator"
            );
            return;
        }

        warn!(
            event = events::DISCONNECT_UNEXPECTED,
            component = COMPONENT,
            group_id = self.group_id.as_str(),
            reason,
            err = ?context.error,
            "streaming connection dropped unexpectedly"
        );

        if let Err(err) = self
            .supervisor
            .send(ConnectionEvent::UnexpectedDisconnect(context))
        {
            debug!(
                event = events::SUPERVISOR_CHANNEL_CLOSED,
                component = COMPONENT,
                group_id = self.group_id.as_str(),
                err = %err,
                "disconnect supervisor is gone, not reconnecting"
            );
        }
    }

    async fn on_subscription_error(&self, context: SubscriptionErrorContext) {
        let principal = match context.subscription_id.as_ref() {
            Some(subscription_id) => self.router.resolve(subscription_id).await,
            None => None,
        };

        warn!(
            event = events::SUBSCRIPTION_ERROR_REPORTED,
            component = COMPONENT,
            group_id = self.group_id.as_str(),
            principal = %fields::format_principal(principal.as_ref()),
            subscription_id = %fields::format_subscription_id(context.subscription_id.as_ref()),
            err = %context.error,
            "remote service reported a subscription error"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{ConnectionEvent, CoordinatorListener};
    use crate::control_plane::connection_lifecycle::CloseIntent;
    use crate::control_plane::subscription_registry::SubscriptionRegistry;
    use crate::data_plane::event_router::EventRouter;
    use crate::notification::{NotificationBatch, RoutedEventRecord};
    use crate::service::{
        ConnectionListener, DisconnectContext, ServiceError, ServiceErrorCode,
        SubscriptionErrorContext, SubscriptionHandle, SubscriptionId,
    };
    use crate::PrincipalKey;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

    fn listener() -> (
        CoordinatorListener,
        CloseIntent,
        UnboundedReceiver<ConnectionEvent>,
        Arc<AtomicUsize>,
        Arc<SubscriptionRegistry>,
    ) {
        let registry = Arc::new(SubscriptionRegistry::new());
        let routed = Arc::new(AtomicUsize::new(0));
        let counter = routed.clone();
        let router = EventRouter::new(
            "test-group",
            registry.clone(),
            Arc::new(move |_record: RoutedEventRecord| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        let intent = CloseIntent::default();
        let (tx, rx) = unbounded_channel();
        let listener = CoordinatorListener::new("test-group", router, intent.clone(), tx);
        (listener, intent, rx, routed, registry)
    }

    #[tokio::test]
    async fn intentional_disconnect_is_not_forwarded() {
        let (listener, intent, mut rx, _, _) = listener();

        intent.mark();
        listener.on_disconnect(DisconnectContext::default()).await;

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn unexpected_disconnect_is_forwarded_once() {
        let (listener, _intent, mut rx, _, _) = listener();

        listener
            .on_disconnect(DisconnectContext {
                reason: Some("peer reset".to_string()),
                error: None,
            })
            .await;

        let ConnectionEvent::UnexpectedDisconnect(context) = rx.try_recv().unwrap();
        assert_eq!(context.reason.as_deref(), Some("peer reset"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn notifications_and_errors_do_not_reach_supervisor() {
        let (listener, _intent, mut rx, routed, registry) = listener();
        registry
            .insert(
                PrincipalKey::parse("alice@x.com").unwrap(),
                SubscriptionHandle::new(SubscriptionId::new("h1")),
            )
            .await;

        listener
            .on_notification(NotificationBatch::new(SubscriptionId::new("h1"), Vec::new()))
            .await;
        listener
            .on_subscription_error(SubscriptionErrorContext {
                subscription_id: Some(SubscriptionId::new("h1")),
                error: ServiceError::fail_with_code(ServiceErrorCode::Internal, "boom"),
            })
            .await;

        assert_eq!(routed.load(Ordering::SeqCst), 1);
        assert!(rx.try_recv().is_err());
    }
}
