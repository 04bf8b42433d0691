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

//! Principal identity used to key subscriptions.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const MAX_ADDRESS_LEN: usize = 254;
const MAX_LOCAL_PART_LEN: usize = 64;

/// Reasons a principal identifier is rejected.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("principal identifier is empty")]
    Empty,
    #[error("principal identifier `{0}` must contain exactly one '@'")]
    MissingSeparator(String),
    #[error("principal identifier `{0}` has an empty or oversized local part")]
    InvalidLocalPart(String),
    #[error("principal identifier `{0}` has an invalid domain")]
    InvalidDomain(String),
    #[error("principal identifier `{0}` contains whitespace or control characters")]
    IllegalCharacter(String),
    #[error("principal identifier exceeds 254 characters")]
    TooLong,
}

/// A validated mailbox address identifying the party a subscription belongs to.
///
/// The address is trimmed and lower-cased on construction, so equality and
/// hashing operate on the normalized form.
///
/// ```
/// use mailbox_streamer::PrincipalKey;
///
/// let alice: PrincipalKey = " Alice@Example.COM ".parse().unwrap();
/// assert_eq!(alice.as_str(), "alice@example.com");
/// assert!("not-an-email".parse::<PrincipalKey>().is_err());
/// ```
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PrincipalKey(String);

impl PrincipalKey {
    pub fn parse(address: &str) -> Result<Self, ValidationError> {
        let normalized = address.trim().to_lowercase();

        if normalized.is_empty() {
            return Err(ValidationError::Empty);
        }
        if normalized.len() > MAX_ADDRESS_LEN {
            return Err(ValidationError::TooLong);
        }
        if normalized
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(ValidationError::IllegalCharacter(normalized));
        }

        let mut parts = normalized.split('@');
        let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
            (Some(local), Some(domain), None) => (local, domain),
            _ => return Err(ValidationError::MissingSeparator(normalized)),
        };

        if local.is_empty()
            || local.len() > MAX_LOCAL_PART_LEN
            || local.starts_with('.')
            || local.ends_with('.')
            || local.contains("..")
        {
            return Err(ValidationError::InvalidLocalPart(normalized));
        }

        if !is_valid_domain(domain) {
            return Err(ValidationError::InvalidDomain(normalized));
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Domain part of the address.
    pub fn domain(&self) -> &str {
        self.0
            .split_once('@')
            .map(|(_, domain)| domain)
            .unwrap_or_default()
    }
}

fn is_valid_domain(domain: &str) -> bool {
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label
                    .chars()
                    .all(|c| c.is_alphanumeric() || c == '-')
        })
}

impl FromStr for PrincipalKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PrincipalKey {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PrincipalKey> for String {
    fn from(value: PrincipalKey) -> Self {
        value.0
    }
}

impl AsRef<str> for PrincipalKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for PrincipalKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{PrincipalKey, ValidationError};
    use std::collections::HashSet;

    #[test]
    fn parse_normalizes_case_and_whitespace() {
        let key = PrincipalKey::parse("  Bob.Smith@Contoso.com\t").unwrap();

        assert_eq!(key.as_str(), "bob.smith@contoso.com");
        assert_eq!(key.domain(), "contoso.com");
        assert_eq!(key.to_string(), "bob.smith@contoso.com");
    }

    #[test]
    fn equal_addresses_collapse_in_hash_sets() {
        let mut keys = HashSet::new();
        keys.insert(PrincipalKey::parse("alice@x.com").unwrap());
        keys.insert(PrincipalKey::parse("ALICE@X.COM").unwrap());

        assert_eq!(keys.len(), 1);
    }

    #[test]
    fn parse_rejects_malformed_identifiers() {
        assert_eq!(PrincipalKey::parse("   "), Err(ValidationError::Empty));
        assert!(matches!(
            PrincipalKey::parse("not-an-email"),
            Err(ValidationError::MissingSeparator(_))
        ));
        assert!(matches!(
            PrincipalKey::parse("a@b@c.com"),
            Err(ValidationError::MissingSeparator(_))
        ));
        assert!(matches!(
            PrincipalKey::parse("@x.com"),
            Err(ValidationError::InvalidLocalPart(_))
        ));
        assert!(matches!(
            PrincipalKey::parse("a..b@x.com"),
            Err(ValidationError::InvalidLocalPart(_))
        ));
        assert!(matches!(
            PrincipalKey::parse("alice@localhost"),
            Err(ValidationError::InvalidDomain(_))
        ));
        assert!(matches!(
            PrincipalKey::parse("alice@-x.com"),
            Err(ValidationError::InvalidDomain(_))
        ));
        assert!(matches!(
            PrincipalKey::parse("al ice@x.com"),
            Err(ValidationError::IllegalCharacter(_))
        ));
    }

    #[test]
    fn parse_rejects_oversized_addresses() {
        let local = "a".repeat(65);
        assert!(matches!(
            PrincipalKey::parse(&format!("{local}@x.com")),
            Err(ValidationError::InvalidLocalPart(_))
        ));

        let domain = format!("{}.com", "d".repeat(260));
        assert_eq!(
            PrincipalKey::parse(&format!("a@{domain}")),
            Err(ValidationError::TooLong)
        );
    }

    #[test]
    fn serde_round_trip_goes_through_validation() {
        let key: PrincipalKey = serde_json::from_str("\"Carol@X.com\"").unwrap();
        assert_eq!(key.as_str(), "carol@x.com");

        assert!(serde_json::from_str::<PrincipalKey>("\"nope\"").is_err());
    }
}
