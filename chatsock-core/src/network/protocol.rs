// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Protocol Layer
//!
//! Frame validation and the binary envelope codec.
//!
//! The codec is payload-agnostic: bodies are carried as raw bytes and any
//! text interpretation happens in the router.

use std::sync::Arc;

use prost::Message;

use super::error::NetworkError;
use super::message::{
    Frame, MessageType, Request, Response, WebSocketMessage, WebSocketRequestMessage,
    WebSocketResponseMessage,
};

/// Maximum frame size (1 MB).
pub const MAX_MESSAGE_SIZE: usize = 1_048_576;

/// Maximum number of header lines per frame.
pub const MAX_HEADERS: usize = 64;

/// Structural limits every frame must satisfy.
///
/// Built once per connection factory and shared by every codec instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireSchema {
    /// Largest encoded frame accepted in either direction.
    pub max_frame_size: usize,
    /// Largest number of header lines per request or response.
    pub max_headers: usize,
}

impl Default for WireSchema {
    fn default() -> Self {
        WireSchema {
            max_frame_size: MAX_MESSAGE_SIZE,
            max_headers: MAX_HEADERS,
        }
    }
}

impl WireSchema {
    /// Checks a frame against the schema before it is encoded.
    pub fn validate(&self, frame: &Frame) -> Result<(), NetworkError> {
        match frame {
            Frame::Request(request) => self.validate_request(request),
            Frame::Response(response) => self.validate_response(response),
        }
    }

    fn validate_request(&self, request: &Request) -> Result<(), NetworkError> {
        if request.verb.is_empty() {
            return Err(NetworkError::Validation("request verb is empty".into()));
        }
        if !request.verb.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(NetworkError::Validation(format!(
                "request verb is not a token: {:?}",
                request.verb
            )));
        }
        if !request.path.starts_with('/') {
            return Err(NetworkError::Validation(format!(
                "request path must start with '/': {:?}",
                request.path
            )));
        }
        if request.path.chars().any(char::is_whitespace) {
            return Err(NetworkError::Validation("request path contains whitespace".into()));
        }
        self.validate_headers(&request.headers)
    }

    fn validate_response(&self, response: &Response) -> Result<(), NetworkError> {
        if !(100..=599).contains(&response.status) {
            return Err(NetworkError::Validation(format!(
                "response status out of range: {}",
                response.status
            )));
        }
        self.validate_headers(&response.headers)
    }

    fn validate_headers(&self, headers: &[String]) -> Result<(), NetworkError> {
        if headers.len() > self.max_headers {
            return Err(NetworkError::Validation(format!(
                "too many headers: {} (max {})",
                headers.len(),
                self.max_headers
            )));
        }
        if headers.iter().any(|h| h.contains(['\r', '\n'])) {
            return Err(NetworkError::Validation("header contains a line break".into()));
        }
        Ok(())
    }
}

/// Encodes frames to and decodes frames from the binary wire format.
#[derive(Debug, Clone, Default)]
pub struct EnvelopeCodec {
    schema: Arc<WireSchema>,
}

impl EnvelopeCodec {
    /// Creates a codec bound to a shared schema.
    pub fn new(schema: Arc<WireSchema>) -> Self {
        EnvelopeCodec { schema }
    }

    pub fn schema(&self) -> &WireSchema {
        &self.schema
    }

    /// Validates and serializes a frame.
    ///
    /// Returns [`NetworkError::Validation`] without producing bytes when the
    /// frame breaks the schema; callers skip the send in that case.
    pub fn encode(&self, frame: &Frame) -> Result<Vec<u8>, NetworkError> {
        self.schema.validate(frame)?;

        let encoded = to_wire(frame).encode_to_vec();
        if encoded.len() > self.schema.max_frame_size {
            return Err(NetworkError::Validation(format!(
                "Message too large: {} bytes (max {})",
                encoded.len(),
                self.schema.max_frame_size
            )));
        }

        Ok(encoded)
    }

    /// Parses a frame received from the socket.
    pub fn decode(&self, data: &[u8]) -> Result<Frame, NetworkError> {
        if data.is_empty() {
            return Err(NetworkError::InvalidMessage("Empty frame".into()));
        }
        if data.len() > self.schema.max_frame_size {
            return Err(NetworkError::InvalidMessage(format!(
                "Message too large: {} bytes (max {})",
                data.len(),
                self.schema.max_frame_size
            )));
        }

        let message = WebSocketMessage::decode(data)?;
        from_wire(message)
    }
}

fn to_wire(frame: &Frame) -> WebSocketMessage {
    match frame {
        Frame::Request(r) => WebSocketMessage {
            r#type: Some(MessageType::Request as i32),
            request: Some(WebSocketRequestMessage {
                verb: Some(r.verb.clone()),
                path: Some(r.path.clone()),
                body: r.body.clone(),
                id: Some(r.id),
                headers: r.headers.clone(),
            }),
            response: None,
        },
        Frame::Response(r) => WebSocketMessage {
            r#type: Some(MessageType::Response as i32),
            request: None,
            response: Some(WebSocketResponseMessage {
                id: Some(r.id),
                status: Some(r.status),
                message: Some(r.message.clone()),
                body: r.body.clone(),
                headers: r.headers.clone(),
            }),
        },
    }
}

fn from_wire(message: WebSocketMessage) -> Result<Frame, NetworkError> {
    let kind = message
        .r#type
        .and_then(|t| MessageType::try_from(t).ok())
        .unwrap_or(MessageType::Unknown);

    match (kind, message.request, message.response) {
        (MessageType::Request, Some(request), None) => {
            let verb = request
                .verb
                .ok_or_else(|| NetworkError::InvalidMessage("Request without verb".into()))?;
            let path = request
                .path
                .ok_or_else(|| NetworkError::InvalidMessage("Request without path".into()))?;
            Ok(Frame::Request(Request {
                id: request.id.unwrap_or_default(),
                verb,
                path,
                body: request.body,
                headers: request.headers,
            }))
        }
        (MessageType::Response, None, Some(response)) => {
            let status = response
                .status
                .ok_or_else(|| NetworkError::InvalidMessage("Response without status".into()))?;
            Ok(Frame::Response(Response {
                id: response.id.unwrap_or_default(),
                status,
                message: response.message.unwrap_or_default(),
                body: response.body,
                headers: response.headers,
            }))
        }
        (MessageType::Unknown, _, _) => {
            Err(NetworkError::InvalidMessage("Unknown message type".into()))
        }
        (kind, _, _) => Err(NetworkError::InvalidMessage(format!(
            "{:?} message must carry exactly one matching payload",
            kind
        ))),
    }
}
