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

//! Control-plane layer.
//!
//! Owns the single streaming connection, the intentional-close flag that
//! separates reconfiguration from outages, and the principal registry. Every
//! structural change happens while the coordinator lock is held and the
//! connection is closed, so the remote service never observes a half-updated
//! subscription set.

pub(crate) mod connection_lifecycle;
pub(crate) mod subscription_registry;
