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

//! Principal-to-subscription registry.
//!
//! Writers must hold the coordinator lock; readers (the event router) only
//! take the registry's own read lock.

use crate::principal::PrincipalKey;
use crate::service::{SubscriptionHandle, SubscriptionId};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// At most one active subscription per principal.
pub(crate) struct SubscriptionRegistry {
    entries: RwLock<HashMap<PrincipalKey, SubscriptionHandle>>,
}

impl SubscriptionRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts or replaces the handle for `principal`, returning the previous one.
    pub(crate) async fn insert(
        &self,
        principal: PrincipalKey,
        handle: SubscriptionHandle,
    ) -> Option<SubscriptionHandle> {
        let mut entries = self.entries.write().await;
        entries.insert(principal, handle)
    }

    pub(crate) async fn remove(&self, principal: &PrincipalKey) -> Option<SubscriptionHandle> {
        let mut entries = self.entries.write().await;
        entries.remove(principal)
    }

    /// Empties the registry, returning every entry it held.
    pub(crate) async fn drain(&self) -> Vec<(PrincipalKey, SubscriptionHandle)> {
        let mut entries = self.entries.write().await;
        entries.drain().collect()
    }

    pub(crate) async fn get(&self, principal: &PrincipalKey) -> Option<SubscriptionHandle> {
        let entries = self.entries.read().await;
        entries.get(principal).cloned()
    }

    pub(crate) async fn contains(&self, principal: &PrincipalKey) -> bool {
        let entries = self.entries.read().await;
        entries.contains_key(principal)
    }

    pub(crate) async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.len()
    }

    pub(crate) async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Snapshot of registered principals, sorted for stable output.
    pub(crate) async fn principals(&self) -> Vec<PrincipalKey> {
        let entries = self.entries.read().await;
        let mut principals: Vec<PrincipalKey> = entries.keys().cloned().collect();
        principals.sort();
        principals
    }

    /// Resolves which principal owns `subscription_id`.
    ///
    /// Linear in the number of subscriptions, which stays in the tens.
    pub(crate) async fn principal_for(
        &self,
        subscription_id: &SubscriptionId,
    ) -> Option<PrincipalKey> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .find(|(_, handle)| handle.id() == subscription_id)
            .map(|(principal, _)| principal.clone())
    }
}
