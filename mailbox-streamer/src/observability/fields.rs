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

//! Canonical structured field keys and value-format helpers.

use crate::principal::PrincipalKey;
use crate::service::SubscriptionId;

pub const EVENT: &str = "event";
pub const COMPONENT: &str = "component";
pub const GROUP_ID: &str = "group_id";
pub const PRINCIPAL: &str = "principal";
pub const SUBSCRIPTION_ID: &str = "subscription_id";
pub const EVENT_COUNT: &str = "event_count";
pub const ATTEMPT: &str = "attempt";
pub const DELAY_MS: &str = "delay_ms";
pub const REGISTRY_LEN: &str = "registry_len";
pub const REASON: &str = "reason";
pub const ERR: &str = "err";

pub const NONE: &str = "none";
pub const REASON_DISPOSED: &str = "disposed";
pub const REASON_REGISTRY_EMPTY: &str = "registry_empty";
pub const REASON_ALREADY_OPEN: &str = "already_open";
pub const REASON_RESTORE_AFTER_FAILURE: &str = "restore_after_failure";

pub fn format_principal(principal: Option<&PrincipalKey>) -> String {
    principal
        .map(|principal| principal.as_str().to_string())
        .unwrap_or_else(|| NONE.to_string())
}

pub fn format_subscription_id(subscription_id: Option<&SubscriptionId>) -> String {
    subscription_id
        .map(|id| id.as_str().to_string())
        .unwrap_or_else(|| NONE.to_string())
}

#[cfg(test)]
mod tests {
    use super::{format_principal, format_subscription_id, NONE};
    use crate::service::SubscriptionId;
    use crate::PrincipalKey;

    #[test]
    fn format_principal_falls_back_when_absent() {
        let principal = PrincipalKey::parse("alice@x.com").unwrap();

        assert_eq!(format_principal(Some(&principal)), "alice@x.com");
        assert_eq!(format_principal(None), NONE);
    }

    #[test]
    fn format_subscription_id_falls_back_when_absent() {
        let id = SubscriptionId::new("sub-1");

        assert_eq!(format_subscription_id(Some(&id)), "sub-1");
        assert_eq!(format_subscription_id(None), NONE);
    }
}
