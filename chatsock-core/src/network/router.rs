// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Payload Router
//!
//! Decides how the body of an inbound frame is interpreted. Rules, first
//! match wins:
//!
//! 1. absent, empty or whitespace-only body: no body
//! 2. `PUT /api/v1/message` request: encrypted chat payload
//! 3. anything else: UTF-8 text

use super::message::Frame;

/// Interpretation of an inbound body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutedBody {
    /// No usable body.
    NoBody,
    /// Text body, attached to the delivered message as-is.
    Plain(String),
    /// Opaque blob for the external decryption codec.
    EncryptedChat(Vec<u8>),
}

/// Routes the body of `frame`.
pub fn route(frame: &Frame) -> RoutedBody {
    let Some(body) = frame.body() else {
        return RoutedBody::NoBody;
    };

    let text = String::from_utf8_lossy(body);
    if text.trim().is_empty() {
        return RoutedBody::NoBody;
    }

    match frame.as_request() {
        Some(request) if request.is_chat_delivery() => RoutedBody::EncryptedChat(body.to_vec()),
        _ => RoutedBody::Plain(text.into_owned()),
    }
}
