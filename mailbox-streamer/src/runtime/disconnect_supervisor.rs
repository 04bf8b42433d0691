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

use crate::control_plane::connection_lifecycle::ConnectionLifecycle;
use crate::control_plane::subscription_registry::SubscriptionRegistry;
use crate::data_plane::connection_listener::ConnectionEvent;
use crate::observability::events;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::debug;

const COMPONENT: &str = "disconnect_supervisor";

/// Spawns the task that reopens the connection after unexpected disconnects.
///
/// Events are handled one at a time in arrival order. The task runs until the
/// channel closes or the owning collection aborts it.
pub(crate) fn spawn_disconnect_supervisor(
    group_id: &str,
    lifecycle: Arc<ConnectionLifecycle>,
    registry: Arc<SubscriptionRegistry>,
    mut connection_events: UnboundedReceiver<ConnectionEvent>,
) -> JoinHandle<()> {
    let group_id = group_id.to_string();

    tokio::spawn(async move {
        while let Some(event) = connection_events.recv().await {
            match event {
                ConnectionEvent::UnexpectedDisconnect(context) => {
                    let outcome = lifecycle.recover_from_disconnect(&registry).await;
                    debug!(
                        component = COMPONENT,
                        group_id = group_id.as_str(),
                        reason = ?context.reason,
                        outcome = ?outcome,
                        "handled unexpected disconnect"
                    );
                }
            }
        }

        debug!(
            event = events::SUPERVISOR_CHANNEL_CLOSED,
            component = COMPONENT,
            group_id = group_id.as_str(),
            "disconnect supervisor stopped"
        );
    })
}
