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

//! Ownership of the single physical connection and its open/close transitions.

use crate::config::ReconnectPolicy;
use crate::control_plane::subscription_registry::SubscriptionRegistry;
use crate::error::CoordinatorError;
use crate::observability::{events, fields};
use crate::service::{ServiceError, StreamingConnection};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

const COMPONENT: &str = "connection_lifecycle";

/// Records whether the coordinator itself asked the connection to close.
///
/// Shared with the connection listener, which samples it when a disconnect
/// callback fires. Only set while the coordinator lock is held.
#[derive(Clone, Debug, Default)]
pub(crate) struct CloseIntent(Arc<AtomicBool>);

impl CloseIntent {
    pub(crate) fn mark(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub(crate) fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub(crate) fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
struct LifecycleState {
    disposed: bool,
}

/// Result of handling one unexpected disconnect.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum RecoveryOutcome {
    Reopened { attempts: u32 },
    Skipped { reason: &'static str },
    GaveUp { attempts: u32 },
}

/// Connection lifecycle controller.
///
/// `state` is the coordinator-wide lock: every structural mutation and every
/// disconnect-driven reopen runs while holding it.
pub(crate) struct ConnectionLifecycle {
    group_id: String,
    connection: Arc<dyn StreamingConnection>,
    intent: CloseIntent,
    state: Mutex<LifecycleState>,
    reconnect_policy: ReconnectPolicy,
}

impl ConnectionLifecycle {
    pub(crate) fn new(
        group_id: &str,
        connection: Arc<dyn StreamingConnection>,
        intent: CloseIntent,
        reconnect_policy: ReconnectPolicy,
    ) -> Self {
        Self {
            group_id: group_id.to_string(),
            connection,
            intent,
            state: Mutex::new(LifecycleState::default()),
            reconnect_policy,
        }
    }

    pub(crate) fn is_open(&self) -> bool {
        self.connection.is_open()
    }

    /// Acquires the coordinator lock for a structural mutation.
    pub(crate) async fn lock(&self) -> Result<MutationGuard<'_>, CoordinatorError> {
        let state = self.state.lock().await;
        if state.disposed {
            return Err(CoordinatorError::Closed);
        }

        Ok(MutationGuard {
            lifecycle: self,
            state,
        })
    }

    async fn open_connection(&self) -> Result<(), ServiceError> {
        if self.connection.is_open() {
            return Ok(());
        }

        match self.connection.open().await {
            Ok(()) => {
                debug!(
                    event = events::CONNECTION_OPEN,
                    component = COMPONENT,
                    group_id = self.group_id.as_str(),
                    "opened streaming connection"
                );
                Ok(())
            }
            Err(err) => {
                warn!(
                    event = events::CONNECTION_OPEN_FAILED,
                    component = COMPONENT,
                    group_id = self.group_id.as_str(),
                    err = %err,
                    "unable to open streaming connection"
                );
                Err(err)
            }
        }
    }

    async fn close_connection(&self) -> Result<(), ServiceError> {
        if !self.connection.is_open() {
            return Ok(());
        }

        match self.connection.close().await {
            Ok(()) => {
                debug!(
                    event = events::CONNECTION_CLOSE,
                    component = COMPONENT,
                    group_id = self.group_id.as_str(),
                    "closed streaming connection"
                );
                Ok(())
            }
            Err(err) => {
                warn!(
                    event = events::CONNECTION_CLOSE_FAILED,
                    component = COMPONENT,
                    group_id = self.group_id.as_str(),
                    err = %err,
                    "unable to close streaming connection"
                );
                Err(err)
            }
        }
    }

    /// Restores the connection after a disconnect the coordinator did not ask for.
    ///
    /// Each attempt re-checks, under the lock, that the collection is live,
    /// still has subscriptions and is not already open. The lock is released
    /// while backing off so mutations are not starved.
    pub(crate) async fn recover_from_disconnect(
        &self,
        registry: &SubscriptionRegistry,
    ) -> RecoveryOutcome {
        let mut attempts: u32 = 0;

        loop {
            let delay = self.reconnect_policy.delay_for_attempt(attempts);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let state = self.state.lock().await;

            let skip_reason = if state.disposed {
                Some(fields::REASON_DISPOSED)
            } else if registry.is_empty().await {
                Some(fields::REASON_REGISTRY_EMPTY)
            } else if self.connection.is_open() {
                Some(fields::REASON_ALREADY_OPEN)
            } else {
                None
            };

            if let Some(reason) = skip_reason {
                debug!(
                    event = events::RECONNECT_SKIPPED,
                    component = COMPONENT,
                    group_id = self.group_id.as_str(),
                    attempt = attempts,
                    reason,
                    "no reconnect needed"
                );
                return RecoveryOutcome::Skipped { reason };
            }

            attempts += 1;
            debug!(
                event = events::RECONNECT_ATTEMPT,
                component = COMPONENT,
                group_id = self.group_id.as_str(),
                attempt = attempts,
                delay_ms = delay.as_millis() as u64,
                "reopening streaming connection"
            );

            match self.connection.open().await {
                Ok(()) => {
                    info!(
                        event = events::RECONNECT_OK,
                        component = COMPONENT,
                        group_id = self.group_id.as_str(),
                        attempt = attempts,
                        "streaming connection restored"
                    );
                    return RecoveryOutcome::Reopened { attempts };
                }
                Err(err) => {
                    if !self.reconnect_policy.allows_attempt(attempts) {
                        error!(
                            event = events::RECONNECT_GAVE_UP,
                            component = COMPONENT,
                            group_id = self.group_id.as_str(),
                            attempt = attempts,
                            err = %err,
                            "giving up on reopening streaming connection"
                        );
                        return RecoveryOutcome::GaveUp { attempts };
                    }

                    warn!(
                        event = events::RECONNECT_FAILED,
                        component = COMPONENT,
                        group_id = self.group_id.as_str(),
                        attempt = attempts,
                        err = %err,
                        "reopen attempt failed, backing off"
                    );
                }
            }

            drop(state);
        }
    }
}

/// Exclusive access to the connection for one structural mutation.
///
/// Dropping the guard clears the intentional-close flag before the lock is
/// released, whichever path the mutation took.
pub(crate) struct MutationGuard<'a> {
    lifecycle: &'a ConnectionLifecycle,
    state: MutexGuard<'a, LifecycleState>,
}

impl MutationGuard<'_> {
    pub(crate) fn connection(&self) -> &Arc<dyn StreamingConnection> {
        &self.lifecycle.connection
    }

    /// Flags the close as intentional, then closes the connection if open.
    pub(crate) async fn close_intentionally(&mut self) -> Result<(), ServiceError> {
        self.lifecycle.intent.mark();
        self.lifecycle.close_connection().await
    }

    /// Opens the connection unless it is already open.
    ///
    /// The intentional-close flag is cleared first: any disconnect reported
    /// from here on was not requested by this mutation.
    pub(crate) async fn reopen(&mut self) -> Result<(), ServiceError> {
        self.lifecycle.intent.clear();
        self.lifecycle.open_connection().await
    }

    pub(crate) fn mark_disposed(&mut self) {
        self.state.disposed = true;
    }
}

impl Drop for MutationGuard<'_> {
    fn drop(&mut self) {
        self.lifecycle.intent.clear();
    }
}
