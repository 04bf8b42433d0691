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

//! Data-plane layer.
//!
//! Receives callbacks from the connection: notification batches are routed to
//! the event processor on the calling task, unexpected disconnects are queued
//! for the disconnect supervisor, and subscription errors are reported.

pub(crate) mod connection_listener;
pub(crate) mod event_router;
