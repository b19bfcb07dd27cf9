// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Network Message Types
//!
//! Wire schema of the WebSocket sub-protocol, the tagged [`Frame`] the rest of
//! the transport works with, and the [`InboundMessage`] handed to subscribers.
//!
//! The protobuf field tags follow the sub-protocol used by Signal-compatible
//! chat servers, so frames are interoperable without a build step.

use serde::{Deserialize, Serialize};

use super::decoder::ChatDecodeError;

/// Request verb used by keepalive requests.
pub const KEEPALIVE_VERB: &str = "GET";

/// Request path used by keepalive requests.
pub const KEEPALIVE_PATH: &str = "/v1/keepalive";

/// Verb of inbound chat deliveries.
pub const CHAT_INGRESS_VERB: &str = "PUT";

/// Path of inbound chat deliveries.
pub const CHAT_INGRESS_PATH: &str = "/api/v1/message";

/// Header attached to outbound signal messages.
pub const JSON_CONTENT_TYPE_HEADER: &str = "content-type:application/json;";

// ============================================================
// Wire schema
// ============================================================

/// Discriminant of a [`WebSocketMessage`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum MessageType {
    Unknown = 0,
    Request = 1,
    Response = 2,
}

/// Outer wire message carrying exactly one of `request` / `response`.
#[derive(Clone, PartialEq, prost::Message)]
pub struct WebSocketMessage {
    #[prost(enumeration = "MessageType", optional, tag = "1")]
    pub r#type: Option<i32>,
    #[prost(message, optional, tag = "2")]
    pub request: Option<WebSocketRequestMessage>,
    #[prost(message, optional, tag = "3")]
    pub response: Option<WebSocketResponseMessage>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct WebSocketRequestMessage {
    #[prost(string, optional, tag = "1")]
    pub verb: Option<String>,
    #[prost(string, optional, tag = "2")]
    pub path: Option<String>,
    #[prost(bytes = "vec", optional, tag = "3")]
    pub body: Option<Vec<u8>>,
    #[prost(uint64, optional, tag = "4")]
    pub id: Option<u64>,
    #[prost(string, repeated, tag = "5")]
    pub headers: Vec<String>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct WebSocketResponseMessage {
    #[prost(uint64, optional, tag = "1")]
    pub id: Option<u64>,
    #[prost(uint32, optional, tag = "2")]
    pub status: Option<u32>,
    #[prost(string, optional, tag = "3")]
    pub message: Option<String>,
    #[prost(bytes = "vec", optional, tag = "4")]
    pub body: Option<Vec<u8>>,
    #[prost(string, repeated, tag = "5")]
    pub headers: Vec<String>,
}

/// Kind of a decrypted chat envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum SignalEnvelopeType {
    Unknown = 0,
    Ciphertext = 1,
    KeyExchange = 2,
    PrekeyBundle = 3,
    Receipt = 5,
    UnidentifiedSender = 6,
}

/// Decrypted chat payload produced by the external codec.
///
/// The transport never interprets these fields; it only decodes them so the
/// subscriber receives a structured value.
#[derive(Clone, PartialEq, prost::Message)]
pub struct SignalEnvelope {
    #[prost(enumeration = "SignalEnvelopeType", optional, tag = "1")]
    pub r#type: Option<i32>,
    #[prost(string, optional, tag = "2")]
    pub source: Option<String>,
    #[prost(string, optional, tag = "3")]
    pub relay: Option<String>,
    #[prost(uint64, optional, tag = "5")]
    pub timestamp: Option<u64>,
    #[prost(bytes = "vec", optional, tag = "6")]
    pub legacy_message: Option<Vec<u8>>,
    #[prost(uint32, optional, tag = "7")]
    pub source_device: Option<u32>,
    #[prost(bytes = "vec", optional, tag = "8")]
    pub content: Option<Vec<u8>>,
    #[prost(string, optional, tag = "9")]
    pub server_guid: Option<String>,
    #[prost(uint64, optional, tag = "10")]
    pub server_timestamp: Option<u64>,
}

// ============================================================
// Frames
// ============================================================

/// A request travelling in either direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub id: u64,
    pub verb: String,
    pub path: String,
    pub body: Option<Vec<u8>>,
    pub headers: Vec<String>,
}

impl Request {
    /// Creates a request without body or headers.
    pub fn new(id: u64, verb: impl Into<String>, path: impl Into<String>) -> Self {
        Request {
            id,
            verb: verb.into(),
            path: path.into(),
            body: None,
            headers: Vec::new(),
        }
    }

    /// Sets the body.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Appends a header line.
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.headers.push(header.into());
        self
    }

    /// True for inbound chat deliveries whose body is an encrypted blob.
    pub fn is_chat_delivery(&self) -> bool {
        self.verb == CHAT_INGRESS_VERB && self.path == CHAT_INGRESS_PATH
    }
}

/// A response travelling in either direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub id: u64,
    pub status: u32,
    pub message: String,
    pub body: Option<Vec<u8>>,
    pub headers: Vec<String>,
}

impl Response {
    /// Creates a response without body or headers.
    pub fn new(id: u64, status: u32, message: impl Into<String>) -> Self {
        Response {
            id,
            status,
            message: message.into(),
            body: None,
            headers: Vec::new(),
        }
    }

    /// Sets the body.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// A decoded wire message, tagged as request or response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Request(Request),
    Response(Response),
}

impl Frame {
    /// Correlation id of the frame.
    pub fn id(&self) -> u64 {
        match self {
            Frame::Request(r) => r.id,
            Frame::Response(r) => r.id,
        }
    }

    /// Raw body bytes, if any.
    pub fn body(&self) -> Option<&[u8]> {
        match self {
            Frame::Request(r) => r.body.as_deref(),
            Frame::Response(r) => r.body.as_deref(),
        }
    }

    /// Drops the body, leaving an absent one.
    pub fn clear_body(&mut self) {
        match self {
            Frame::Request(r) => r.body = None,
            Frame::Response(r) => r.body = None,
        }
    }

    pub fn is_request(&self) -> bool {
        matches!(self, Frame::Request(_))
    }

    pub fn as_request(&self) -> Option<&Request> {
        match self {
            Frame::Request(r) => Some(r),
            Frame::Response(_) => None,
        }
    }

    pub fn as_response(&self) -> Option<&Response> {
        match self {
            Frame::Response(r) => Some(r),
            Frame::Request(_) => None,
        }
    }
}

impl From<Request> for Frame {
    fn from(request: Request) -> Self {
        Frame::Request(request)
    }
}

impl From<Response> for Frame {
    fn from(response: Response) -> Self {
        Frame::Response(response)
    }
}

// ============================================================
// Delivered messages
// ============================================================

/// A fully routed inbound frame, as delivered to the message stream.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    /// The frame as it arrived on the wire, except that a blank body is
    /// normalized to an absent one.
    pub frame: Frame,
    /// UTF-8 body for plain frames. `None` when the body is absent, blank,
    /// or an encrypted chat payload.
    pub body: Option<String>,
    /// Outcome of the external decode for chat deliveries; `None` for every
    /// other frame.
    pub signal_message: Option<Result<SignalEnvelope, ChatDecodeError>>,
}

impl InboundMessage {
    pub fn id(&self) -> u64 {
        self.frame.id()
    }

    /// The decoded chat envelope, when decoding succeeded.
    pub fn signal_envelope(&self) -> Option<&SignalEnvelope> {
        self.signal_message.as_ref().and_then(|r| r.as_ref().ok())
    }
}

// ============================================================
// Outbound chat body
// ============================================================

/// JSON body of an outbound chat send (`PUT /v1/messages/<destination>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalMessageBody {
    pub messages: Vec<OutgoingSignalMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub online: Option<bool>,
}

impl SignalMessageBody {
    /// Destination of the first message, which addresses the whole send.
    pub fn destination(&self) -> Option<&str> {
        self.messages
            .first()
            .map(|m| m.destination.as_str())
            .filter(|d| !d.is_empty())
    }
}

/// One per-device ciphertext inside a [`SignalMessageBody`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingSignalMessage {
    #[serde(rename = "type")]
    pub kind: u32,
    pub destination: String,
    #[serde(default)]
    pub destination_device_id: u32,
    #[serde(default)]
    pub destination_registration_id: u32,
    pub content: String,
    #[serde(default)]
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub silent: Option<bool>,
}
