// Copyright (c) 2025 - Cowboy AI, Inc.
//! Service configuration
//!
//! One explicit struct, built once at startup and handed to whoever needs it.
//!
//! | variable                     | default                 |
//! |------------------------------|-------------------------|
//! | `NATS_URL`                   | `nats://localhost:4222` |
//! | `NATS_CLIENT_NAME`           | `analytics-service`     |
//! | `NATS_CONNECT_TIMEOUT_SECS`  | `10`                    |
//! | `NATS_REQUEST_TIMEOUT_SECS`  | `5`                     |
//! | `ANALYTICS_EVENTS_ENABLED`   | `true`                  |
//! | `METRIC_DATA_RETENTION_DAYS` | `90`                    |
//!
//! `NATS_URL` may list several servers separated by commas. A value that is
//! set but does not parse is a configuration error.

use std::str::FromStr;
use std::time::Duration;

use crate::errors::{InfrastructureError, InfrastructureResult};
use crate::nats::NatsConfig;

pub const DEFAULT_RETENTION_DAYS: u32 = 90;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsConfig {
    pub nats: NatsConfig,
    /// Publish domain events after each command
    pub events_enabled: bool,
    /// Samples older than this are eligible for purge
    pub retention_days: u32,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            nats: NatsConfig::default(),
            events_enabled: true,
            retention_days: DEFAULT_RETENTION_DAYS,
        }
    }
}

impl AnalyticsConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> InfrastructureResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> InfrastructureResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let servers = match lookup("NATS_URL") {
            Some(url) => url
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            None => defaults.nats.servers,
        };
        if servers.is_empty() {
            return Err(InfrastructureError::Configuration(
                "NATS_URL lists no servers".to_string(),
            ));
        }

        let nats = NatsConfig {
            servers,
            name: lookup("NATS_CLIENT_NAME").unwrap_or(defaults.nats.name),
            connect_timeout: parse_or(&lookup, "NATS_CONNECT_TIMEOUT_SECS", 10)
                .map(Duration::from_secs)?,
            request_timeout: parse_or(&lookup, "NATS_REQUEST_TIMEOUT_SECS", 5)
                .map(Duration::from_secs)?,
        };

        Ok(Self {
            nats,
            events_enabled: parse_or(&lookup, "ANALYTICS_EVENTS_ENABLED", defaults.events_enabled)?,
            retention_days: parse_or(&lookup, "METRIC_DATA_RETENTION_DAYS", defaults.retention_days)?,
        })
    }

    pub fn retention(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.retention_days))
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> InfrastructureResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e| {
            InfrastructureError::Configuration(format!("{key}={raw:?} is invalid: {e}"))
        }),
    }
}
