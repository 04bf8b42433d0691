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

use crate::config::ConfigError;
use crate::principal::{PrincipalKey, ValidationError};
use crate::service::ServiceError;

/// Errors surfaced to callers of the subscription collection.
#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    #[error("invalid principal identifier: {0}")]
    Validation(#[from] ValidationError),

    /// The remote service rejected a subscribe or unsubscribe request.
    #[error("subscription request for {principal} was rejected: {source}")]
    Subscription {
        principal: PrincipalKey,
        #[source]
        source: ServiceError,
    },

    /// Opening or closing the shared connection failed. Registry changes made
    /// before the failure are kept.
    #[error("streaming connection transition failed: {0}")]
    Connection(#[source] ServiceError),

    #[error("subscription collection has been disposed")]
    Closed,

    #[error(transparent)]
    Config(#[from] ConfigError),
}
