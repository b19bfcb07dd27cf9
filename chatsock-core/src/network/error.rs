// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Network Error Types
//!
//! Error types for transport, codec and correlation operations.

use std::time::Duration;

use thiserror::Error;

/// Network and transport error types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Transport not connected")]
    NotConnected,

    #[error("Message send failed: {0}")]
    SendFailed(String),

    #[error("Invalid message format: {0}")]
    InvalidMessage(String),

    #[error("Message failed validation: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Request {id} timed out after {timeout:?}")]
    RequestTimeout { id: u64, timeout: Duration },

    #[error("Too many pending requests (max {0})")]
    CapacityExceeded(usize),
}

impl From<prost::DecodeError> for NetworkError {
    fn from(err: prost::DecodeError) -> Self {
        NetworkError::InvalidMessage(err.to_string())
    }
}

impl From<serde_json::Error> for NetworkError {
    fn from(err: serde_json::Error) -> Self {
        NetworkError::Serialization(err.to_string())
    }
}
