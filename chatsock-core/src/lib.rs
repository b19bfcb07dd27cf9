// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Chatsock Core Library
//!
//! Encrypted chat transport over the binary WebSocket sub-protocol.
//! End-to-end encryption is delegated to an external [`ChatDecoder`].

pub mod network;

pub use network::{
    ChatDecodeError, ChatDecoder, ConnectionConfig, ConnectionEvent, ConnectionManager,
    ConnectionState, Credentials, EnvelopeCodec, Frame, InboundMessage, MockTransport,
    NetworkError, Request, Response, SignalEnvelope, SignalMessageBody, Transport,
    UnavailableDecoder, WebSocketTransport,
};
