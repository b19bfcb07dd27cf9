// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Connection Configuration

use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use super::keepalive::DEFAULT_KEEPALIVE_INTERVAL;
use super::protocol::{WireSchema, MAX_HEADERS, MAX_MESSAGE_SIZE};

/// Environment variable overriding the keepalive interval (milliseconds).
pub const ENV_KEEPALIVE_MS: &str = "CHATSOCK_KEEPALIVE_MS";
/// Environment variable overriding the maximum frame size (bytes).
pub const ENV_MAX_FRAME_SIZE: &str = "CHATSOCK_MAX_FRAME_SIZE";
/// Environment variable overriding the request timeout (milliseconds).
pub const ENV_REQUEST_TIMEOUT_MS: &str = "CHATSOCK_REQUEST_TIMEOUT_MS";
/// Environment variable overriding the pending request limit.
pub const ENV_MAX_PENDING: &str = "CHATSOCK_MAX_PENDING";

/// Configuration for a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Interval between keepalive requests.
    pub keepalive_interval: Duration,
    /// Largest encoded frame accepted in either direction.
    pub max_frame_size: usize,
    /// How long `request()` waits for the matching response.
    pub request_timeout: Duration,
    /// Maximum concurrent `request()` calls awaiting a response.
    pub max_pending_requests: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        ConnectionConfig {
            keepalive_interval: DEFAULT_KEEPALIVE_INTERVAL,
            max_frame_size: MAX_MESSAGE_SIZE,
            request_timeout: Duration::from_secs(30),
            max_pending_requests: 1000,
        }
    }
}

impl ConnectionConfig {
    /// Loads the configuration from `CHATSOCK_*` environment variables,
    /// falling back to defaults for unset or unparsable values.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ConnectionConfig::default();
        let default_keepalive_ms = defaults.keepalive_interval.as_millis() as u64;
        let keepalive_ms = match parse_or(&lookup, ENV_KEEPALIVE_MS, default_keepalive_ms) {
            0 => {
                warn!(variable = ENV_KEEPALIVE_MS, "Keepalive interval must be non-zero; using default");
                default_keepalive_ms
            }
            ms => ms,
        };
        ConnectionConfig {
            keepalive_interval: Duration::from_millis(keepalive_ms),
            max_frame_size: parse_or(&lookup, ENV_MAX_FRAME_SIZE, defaults.max_frame_size),
            request_timeout: Duration::from_millis(parse_or(
                &lookup,
                ENV_REQUEST_TIMEOUT_MS,
                defaults.request_timeout.as_millis() as u64,
            )),
            max_pending_requests: parse_or(&lookup, ENV_MAX_PENDING, defaults.max_pending_requests),
        }
    }

    /// Builds the wire schema described by this configuration.
    pub fn wire_schema(&self) -> WireSchema {
        WireSchema {
            max_frame_size: self.max_frame_size,
            max_headers: MAX_HEADERS,
        }
    }
}

fn parse_or<T, F>(lookup: &F, name: &str, default: T) -> T
where
    T: FromStr + Copy,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => default,
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!(variable = name, value = %raw, "Ignoring unparsable configuration value");
                default
            }
        },
    }
}
