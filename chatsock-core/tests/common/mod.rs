// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Common Test Utilities
//!
//! Shared helpers, fixtures, and utilities used across test modules.
//! This module provides reusable test infrastructure to reduce duplication.

#![allow(dead_code)]

pub mod strategies;

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chatsock_core::network::*;
use prost::Message;

/// Credentials used by every connection test.
pub fn test_credentials() -> Credentials {
    Credentials::new("chat.example.com", "alice", "pw")
}

/// Base64 text of an encoded envelope from `source`, as a decryption codec
/// would return it.
pub fn encoded_envelope(source: &str, timestamp: u64) -> String {
    let envelope = SignalEnvelope {
        r#type: Some(SignalEnvelopeType::Ciphertext as i32),
        source: Some(source.to_string()),
        timestamp: Some(timestamp),
        content: Some(vec![1, 2, 3]),
        ..Default::default()
    };
    BASE64.encode(envelope.encode_to_vec())
}

/// An inbound chat delivery carrying `blob`.
pub fn chat_delivery(id: u64, blob: &[u8]) -> Frame {
    Frame::Request(Request::new(id, CHAT_INGRESS_VERB, CHAT_INGRESS_PATH).with_body(blob.to_vec()))
}

/// True for the periodic liveness request.
pub fn is_keepalive(frame: &Frame) -> bool {
    frame
        .as_request()
        .is_some_and(|r| r.verb == KEEPALIVE_VERB && r.path == KEEPALIVE_PATH)
}

/// Waits for the next frame that is not a keepalive request.
pub async fn next_non_keepalive(peer: &mut MockPeer) -> Option<Frame> {
    loop {
        let frame = peer.next_frame().await?;
        if !is_keepalive(&frame) {
            return Some(frame);
        }
    }
}

/// Receives from a stream, failing the test after a (virtual) second.
pub async fn recv<T>(rx: &mut tokio::sync::mpsc::UnboundedReceiver<T>) -> T {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("timed out waiting for stream item")
        .expect("stream ended")
}

/// Lets spawned tasks drain their queues.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
