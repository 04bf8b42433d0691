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

//! Coordinator configuration.
//!
//! Configuration can be built in code or loaded from a JSON5 file:
//!
//! ```
//! use mailbox_streamer::CoordinatorConfig;
//!
//! let config = CoordinatorConfig::from_json5_str(
//!     r#"{
//!         max_notifications_per_batch: 50,
//!         reconnect: { initial_backoff_ms: 100, max_attempts: 3 },
//!     }"#,
//! )
//! .unwrap();
//! assert_eq!(config.max_notifications_per_batch, 50);
//! assert_eq!(config.reconnect.max_attempts, Some(3));
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_MAX_NOTIFICATIONS_PER_BATCH: u16 = 30;

/// Failures while loading a [`CoordinatorConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unable to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("unable to parse config file: {0}")]
    Parse(#[from] json5::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CoordinatorConfig {
    /// Upper bound on events the service packs into one notification batch.
    #[serde(default = "default_max_notifications_per_batch")]
    pub max_notifications_per_batch: u16,
    #[serde(default)]
    pub reconnect: ReconnectPolicy,
}

fn default_max_notifications_per_batch() -> u16 {
    DEFAULT_MAX_NOTIFICATIONS_PER_BATCH
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            max_notifications_per_batch: DEFAULT_MAX_NOTIFICATIONS_PER_BATCH,
            reconnect: ReconnectPolicy::default(),
        }
    }
}

impl CoordinatorConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json5_str(&contents)
    }

    pub fn from_json5_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = json5::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_notifications_per_batch == 0 {
            return Err(ConfigError::Invalid(
                "max_notifications_per_batch must be greater than zero".to_string(),
            ));
        }
        self.reconnect.validate()
    }
}

/// Policy for reopening the connection after an unexpected disconnect.
///
/// The first reopen attempt is immediate. Each further attempt waits
/// `initial_backoff_ms * multiplier^(n - 1)`, capped at `max_backoff_ms`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct ReconnectPolicy {
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub multiplier: f64,
    /// Total attempts per disconnect, including the immediate one. `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_backoff_ms: 250,
            max_backoff_ms: 30_000,
            multiplier: 2.0,
            max_attempts: Some(10),
        }
    }
}

impl ReconnectPolicy {
    /// A single immediate attempt and no retries.
    pub fn immediate_only() -> Self {
        Self {
            initial_backoff_ms: 0,
            max_backoff_ms: 0,
            multiplier: 1.0,
            max_attempts: Some(1),
        }
    }

    /// Delay before the zero-based `attempt`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
        let delay_ms = (self.initial_backoff_ms as f64) * self.multiplier.powi(exponent);
        let capped = delay_ms.min(self.max_backoff_ms as f64);

        Duration::from_millis(capped.max(0.0) as u64)
    }

    /// Whether another attempt is allowed after `attempts_made` attempts.
    pub fn allows_attempt(&self, attempts_made: u32) -> bool {
        self.max_attempts
            .map_or(true, |max_attempts| attempts_made < max_attempts)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.multiplier.is_finite() && self.multiplier >= 1.0) {
            return Err(ConfigError::Invalid(
                "reconnect.multiplier must be a finite value >= 1.0".to_string(),
            ));
        }
        if self.max_backoff_ms < self.initial_backoff_ms {
            return Err(ConfigError::Invalid(
                "reconnect.max_backoff_ms must not be below initial_backoff_ms".to_string(),
            ));
        }
        if self.max_attempts == Some(0) {
            return Err(ConfigError::Invalid(
                "reconnect.max_attempts must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoordinatorConfig, ReconnectPolicy};
    use std::time::Duration;

    #[test]
    fn defaults_fill_missing_fields() {
        let config = CoordinatorConfig::from_json5_str("{}").unwrap();

        assert_eq!(config, CoordinatorConfig::default());
        assert_eq!(config.max_notifications_per_batch, 30);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = CoordinatorConfig::from_json5_str("{ max_batch: 4 }");

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let result = CoordinatorConfig::from_json5_str("{ max_notifications_per_batch: 0 }");

        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn backoff_grows_then_caps() {
        let policy = ReconnectPolicy {
            initial_backoff_ms: 100,
            max_backoff_ms: 500,
            multiplier: 2.0,
            max_attempts: None,
        };

        assert_eq!(policy.delay_for_attempt(0), Duration::ZERO);
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(400));
        assert_eq!(policy.delay_for_attempt(4), Duration::from_millis(500));
        assert_eq!(policy.delay_for_attempt(40), Duration::from_millis(500));
        assert!(policy.allows_attempt(u32::MAX - 1));
    }

    #[test]
    fn attempt_ceiling_is_enforced() {
        let policy = ReconnectPolicy::immediate_only();

        assert!(policy.allows_attempt(0));
        assert!(!policy.allows_attempt(1));
    }

    #[test]
    fn invalid_policies_are_rejected() {
        let shrinking = r#"{ reconnect: { multiplier: 0.5 } }"#;
        let inverted = r#"{ reconnect: { initial_backoff_ms: 10, max_backoff_ms: 5 } }"#;
        let zero_attempts = r#"{ reconnect: { max_attempts: 0 } }"#;

        for contents in [shrinking, inverted, zero_attempts] {
            assert!(matches!(
                CoordinatorConfig::from_json5_str(contents),
                Err(ConfigError::Invalid(_))
            ));
        }
    }

    #[test]
    fn missing_file_reports_io_error() {
        let result = CoordinatorConfig::from_file("/nonexistent/mailbox-streamer.json5");

        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
