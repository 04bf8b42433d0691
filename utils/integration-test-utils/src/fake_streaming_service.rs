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

use async_trait::async_trait;
use mailbox_streamer::{
    ConnectionListener, DisconnectContext, NotificationBatch, NotificationEvent, ServiceError,
    ServiceErrorCode, StreamingClient, StreamingConnection, SubscribeRequest,
    SubscriptionErrorContext, SubscriptionHandle, SubscriptionId,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;
use uuid::Uuid;

/// One structural call observed by the fake service, in call order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConnectionOp {
    Open,
    Close,
    Subscribe(String),
    AddSubscription(SubscriptionId),
    RemoveSubscription(SubscriptionId),
    Dispose,
}

/// Counts structural calls that are in progress at the same time.
#[derive(Default)]
struct OverlapTracker {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl OverlapTracker {
    async fn track<T>(&self, op: impl std::future::Future<Output = T>) -> T {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        // Give concurrent callers a chance to interleave.
        tokio::task::yield_now().await;
        let result = op.await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

#[derive(Default)]
struct SharedState {
    ops: Mutex<Vec<ConnectionOp>>,
    overlap: OverlapTracker,
    rejected_principals: Mutex<HashSet<String>>,
    rejected_unsubscribes: Mutex<HashSet<SubscriptionId>>,
    rejected_adds: Mutex<HashSet<String>>,
    failing_opens: AtomicUsize,
}

impl SharedState {
    fn record(&self, op: ConnectionOp) {
        self.ops.lock().unwrap().push(op);
    }
}

/// In-memory stand-in for the remote notification service client.
pub struct FakeStreamingClient {
    endpoint: String,
    state: Arc<SharedState>,
    connection: Mutex<Option<Arc<FakeConnection>>>,
    handles: Mutex<HashMap<String, SubscriptionHandle>>,
    requests: Mutex<Vec<SubscribeRequest>>,
    max_notifications_per_batch: AtomicUsize,
}

impl FakeStreamingClient {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            state: Arc::new(SharedState::default()),
            connection: Mutex::new(None),
            handles: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            max_notifications_per_batch: AtomicUsize::new(0),
        }
    }

    /// The connection handed out by `create_connection`.
    pub fn connection(&self) -> Arc<FakeConnection> {
        self.connection
            .lock()
            .unwrap()
            .clone()
            .expect("create_connection has not been called")
    }

    /// Makes every subscribe request for `principal` fail.
    pub fn reject_principal(&self, principal: &str) {
        self.state
            .rejected_principals
            .lock()
            .unwrap()
            .insert(principal.to_lowercase());
    }

    pub fn accept_principal(&self, principal: &str) {
        self.state
            .rejected_principals
            .lock()
            .unwrap()
            .remove(&principal.to_lowercase());
    }

    /// Makes the connection refuse to detach `subscription_id`.
    pub fn reject_unsubscribe(&self, subscription_id: &SubscriptionId) {
        self.state
            .rejected_unsubscribes
            .lock()
            .unwrap()
            .insert(subscription_id.clone());
    }

    /// Makes the connection refuse to attach any handle issued for `principal`.
    pub fn reject_add_subscription(&self, principal: &str) {
        self.state
            .rejected_adds
            .lock()
            .unwrap()
            .insert(principal.to_lowercase());
    }

    /// Makes the next `count` calls to `open` fail.
    pub fn fail_next_opens(&self, count: usize) {
        self.state.failing_opens.store(count, Ordering::SeqCst);
    }

    /// Latest handle issued for `principal`.
    pub fn handle_for(&self, principal: &str) -> Option<SubscriptionHandle> {
        self.handles
            .lock()
            .unwrap()
            .get(&principal.to_lowercase())
            .cloned()
    }

    pub fn subscribe_requests(&self) -> Vec<SubscribeRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn max_notifications_per_batch(&self) -> usize {
        self.max_notifications_per_batch.load(Ordering::SeqCst)
    }

    pub fn ops(&self) -> Vec<ConnectionOp> {
        self.state.ops.lock().unwrap().clone()
    }

    pub fn clear_ops(&self) {
        self.state.ops.lock().unwrap().clear();
    }

    pub fn count_ops(&self, wanted: &ConnectionOp) -> usize {
        self.state
            .ops
            .lock()
            .unwrap()
            .iter()
            .filter(|op| *op == wanted)
            .count()
    }

    /// Highest number of structural calls ever observed running at once.
    pub fn max_concurrent_ops(&self) -> usize {
        self.state.overlap.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StreamingClient for FakeStreamingClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn create_connection(
        &self,
        max_notifications_per_batch: u16,
        listener: Arc<dyn ConnectionListener>,
    ) -> Result<Arc<dyn StreamingConnection>, ServiceError> {
        self.max_notifications_per_batch
            .store(max_notifications_per_batch as usize, Ordering::SeqCst);

        let connection = Arc::new(FakeConnection {
            state: self.state.clone(),
            listener,
            open: AtomicBool::new(false),
            subscriptions: Mutex::new(Vec::new()),
        });
        *self.connection.lock().unwrap() = Some(connection.clone());
        Ok(connection)
    }

    async fn subscribe_to_streaming_notifications(
        &self,
        request: SubscribeRequest,
    ) -> Result<SubscriptionHandle, ServiceError> {
        let state = self.state.clone();
        state
            .overlap
            .track(async {
                let principal = request.principal.as_str().to_string();
                state.record(ConnectionOp::Subscribe(principal.clone()));
                self.requests.lock().unwrap().push(request);

                if state.rejected_principals.lock().unwrap().contains(&principal) {
                    return Err(ServiceError::fail_with_code(
                        ServiceErrorCode::PermissionDenied,
                        format!("impersonation of {principal} denied"),
                    ));
                }

                let handle =
                    SubscriptionHandle::new(SubscriptionId::new(format!("{principal}/{}", Uuid::new_v4())));
                debug!("fake service issued {} for {principal}", handle.id());
                self.handles
                    .lock()
                    .unwrap()
                    .insert(principal, handle.clone());
                Ok(handle)
            })
            .await
    }
}

/// In-memory streaming connection that can be driven from tests.
pub struct FakeConnection {
    state: Arc<SharedState>,
    listener: Arc<dyn ConnectionListener>,
    open: AtomicBool,
    subscriptions: Mutex<Vec<SubscriptionId>>,
}

impl FakeConnection {
    pub fn subscriptions(&self) -> Vec<SubscriptionId> {
        self.subscriptions.lock().unwrap().clone()
    }

    /// Drops the transport as the peer would, then fires the disconnect callback.
    pub async fn simulate_drop(&self, reason: &str) {
        self.open.store(false, Ordering::SeqCst);
        self.listener
            .on_disconnect(DisconnectContext {
                reason: Some(reason.to_string()),
                error: Some(ServiceError::fail_with_code(
                    ServiceErrorCode::Unavailable,
                    reason.to_string(),
                )),
            })
            .await;
    }

    /// Fires the disconnect callback without changing the open state.
    pub async fn fire_disconnect(&self, reason: &str) {
        self.listener
            .on_disconnect(DisconnectContext {
                reason: Some(reason.to_string()),
                error: None,
            })
            .await;
    }

    pub async fn deliver(&self, subscription_id: SubscriptionId, events: Vec<NotificationEvent>) {
        self.listener
            .on_notification(NotificationBatch::new(subscription_id, events))
            .await;
    }

    pub async fn raise_subscription_error(
        &self,
        subscription_id: Option<SubscriptionId>,
        error: ServiceError,
    ) {
        self.listener
            .on_subscription_error(SubscriptionErrorContext {
                subscription_id,
                error,
            })
            .await;
    }
}

#[async_trait]
impl StreamingConnection for FakeConnection {
    async fn open(&self) -> Result<(), ServiceError> {
        self.state
            .overlap
            .track(async {
                self.state.record(ConnectionOp::Open);
                if self
                    .state
                    .failing_opens
                    .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                    .is_ok()
                {
                    return Err(ServiceError::fail_with_code(
                        ServiceErrorCode::Unavailable,
                        "streaming endpoint unreachable",
                    ));
                }
                self.open.store(true, Ordering::SeqCst);
                Ok(())
            })
            .await
    }

    async fn close(&self) -> Result<(), ServiceError> {
        self.state
            .overlap
            .track(async {
                self.state.record(ConnectionOp::Close);
                self.open.store(false, Ordering::SeqCst);
            })
            .await;

        // The SDK reports every close, requested or not, through the disconnect callback.
        self.listener
            .on_disconnect(DisconnectContext {
                reason: Some("closed by client".to_string()),
                error: None,
            })
            .await;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    async fn add_subscription(&self, handle: &SubscriptionHandle) -> Result<(), ServiceError> {
        self.state
            .overlap
            .track(async {
                self.state
                    .record(ConnectionOp::AddSubscription(handle.id().clone()));
                let principal = handle.id().as_str().split('/').next().unwrap_or_default();
                if self.state.rejected_adds.lock().unwrap().contains(principal) {
                    return Err(ServiceError::fail_with_code(
                        ServiceErrorCode::ResourceExhausted,
                        "connection subscription limit reached",
                    ));
                }
                self.subscriptions.lock().unwrap().push(handle.id().clone());
                Ok(())
            })
            .await
    }

    async fn remove_subscription(&self, handle: &SubscriptionHandle) -> Result<(), ServiceError> {
        self.state
            .overlap
            .track(async {
                self.state
                    .record(ConnectionOp::RemoveSubscription(handle.id().clone()));
                if self
                    .state
                    .rejected_unsubscribes
                    .lock()
                    .unwrap()
                    .contains(handle.id())
                {
                    return Err(ServiceError::fail_with_code(
                        ServiceErrorCode::Internal,
                        "unsubscribe rejected",
                    ));
                }
                self.subscriptions
                    .lock()
                    .unwrap()
                    .retain(|id| id != handle.id());
                Ok(())
            })
            .await
    }

    async fn dispose(&self) {
        self.state.record(ConnectionOp::Dispose);
        self.open.store(false, Ordering::SeqCst);
    }
}
