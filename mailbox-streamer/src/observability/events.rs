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

//! Canonical structured event names used across `mailbox-streamer`.

// Subscription collection lifecycle events.
pub const SUBSCRIPTION_ADD_START: &str = "subscription_add_start";
pub const SUBSCRIPTION_ADD_OK: &str = "subscription_add_ok";
pub const SUBSCRIPTION_ADD_FAILED: &str = "subscription_add_failed";
pub const SUBSCRIPTION_REPLACED: &str = "subscription_replaced";
pub const SUBSCRIPTION_REMOVE_START: &str = "subscription_remove_start";
pub const SUBSCRIPTION_REMOVE_OK: &str = "subscription_remove_ok";
pub const SUBSCRIPTION_REMOVE_FAILED: &str = "subscription_remove_failed";
pub const SUBSCRIPTION_REMOVE_NOT_FOUND: &str = "subscription_remove_not_found";
pub const SUBSCRIPTION_CLEAR: &str = "subscription_clear";
pub const COLLECTION_DISPOSED: &str = "collection_disposed";

// Connection lifecycle events.
pub const CONNECTION_OPEN: &str = "connection_open";
pub const CONNECTION_OPEN_FAILED: &str = "connection_open_failed";
pub const CONNECTION_CLOSE: &str = "connection_close";
pub const CONNECTION_CLOSE_FAILED: &str = "connection_close_failed";
pub const DISCONNECT_INTENTIONAL: &str = "disconnect_intentional";
pub const DISCONNECT_UNEXPECTED: &str = "disconnect_unexpected";
pub const RECONNECT_ATTEMPT: &str = "reconnect_attempt";
pub const RECONNECT_OK: &str = "reconnect_ok";
pub const RECONNECT_FAILED: &str = "reconnect_failed";
pub const RECONNECT_GAVE_UP: &str = "reconnect_gave_up";
pub const RECONNECT_SKIPPED: &str = "reconnect_skipped";
pub const SUPERVISOR_CHANNEL_CLOSED: &str = "supervisor_channel_closed";

// Inbound routing events.
pub const NOTIFICATION_ROUTED: &str = "notification_routed";
pub const NOTIFICATION_DROPPED_UNKNOWN_SUBSCRIPTION: &str =
    "notification_dropped_unknown_subscription";
pub const SUBSCRIPTION_ERROR_REPORTED: &str = "subscription_error_reported";
