// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Network + Transport Layer
//!
//! Client side of the binary WebSocket sub-protocol used to exchange
//! encrypted chat messages with the chat server.
//!
//! # Architecture
//!
//! The network layer consists of:
//! - **Transport trait**: Platform-agnostic interface for opening sockets
//! - **Message types**: Protobuf wire schema and the decoded frame model
//! - **Protocol layer**: Validated encoding and decoding of frames
//! - **Correlator**: Request ids, auto-acks and optional reply matching
//! - **Router**: Plain versus encrypted chat body interpretation
//! - **Keepalive**: Periodic liveness request while a connection is open
//! - **Connection manager**: Lifecycle, ordered dispatch and sending
//!
//! # Example
//!
//! ```ignore
//! use chatsock_core::network::{ConnectionManager, Credentials, MockTransport, UnavailableDecoder};
//!
//! // Create a connection with mock transport (for testing)
//! let transport = MockTransport::new();
//! let credentials = Credentials::new("chat.example.com", "alice", "pw");
//! let conn = ConnectionManager::new(credentials, transport.clone(), UnavailableDecoder);
//!
//! // Subscribe, then open the socket
//! let mut messages = conn.on_message();
//! conn.listen();
//!
//! // Receive decoded messages in wire order
//! while let Some(message) = messages.recv().await {
//!     println!("{} {:?}", message.id(), message.body);
//! }
//! ```

pub mod config;

#[cfg(feature = "testing")]
pub mod connection;
#[cfg(not(feature = "testing"))]
mod connection;

#[cfg(feature = "testing")]
pub mod correlator;
#[cfg(not(feature = "testing"))]
mod correlator;

pub mod decoder;

#[cfg(feature = "testing")]
pub mod error;
#[cfg(not(feature = "testing"))]
mod error;

#[cfg(feature = "testing")]
pub mod keepalive;
#[cfg(not(feature = "testing"))]
mod keepalive;

pub mod message;

#[cfg(feature = "testing")]
pub mod mock;
#[cfg(not(feature = "testing"))]
mod mock;

#[cfg(feature = "testing")]
pub mod protocol;
#[cfg(not(feature = "testing"))]
mod protocol;

#[cfg(feature = "testing")]
pub mod router;
#[cfg(not(feature = "testing"))]
mod router;

#[cfg(feature = "testing")]
pub mod transport;
#[cfg(not(feature = "testing"))]
mod transport;

#[cfg(feature = "testing")]
pub mod websocket;
#[cfg(not(feature = "testing"))]
mod websocket;

// Error types
pub use error::NetworkError;

// Message types
pub use message::{
    Frame, InboundMessage, OutgoingSignalMessage, Request, Response, SignalEnvelope,
    SignalEnvelopeType, SignalMessageBody, CHAT_INGRESS_PATH, CHAT_INGRESS_VERB,
    JSON_CONTENT_TYPE_HEADER, KEEPALIVE_PATH, KEEPALIVE_VERB,
};

// Protocol utilities
pub use protocol::{EnvelopeCodec, WireSchema, MAX_HEADERS, MAX_MESSAGE_SIZE};

// Correlation
pub use correlator::{build_ack, Inbound, PendingRequests, RequestCorrelator, ACK_MESSAGE, ACK_STATUS};

// Body routing
pub use router::{route, RoutedBody};

// Chat payload decoding
pub use decoder::{decode_signal_payload, ChatDecodeError, ChatDecoder, UnavailableDecoder};

// Liveness
pub use keepalive::{KeepaliveScheduler, DEFAULT_KEEPALIVE_INTERVAL};

// Configuration
pub use config::ConnectionConfig;

// Transport abstraction
pub use transport::{
    ConnectionState, Credentials, Socket, SocketCommand, SocketDriver, SocketEvent, SocketWriter,
    Transport, TransportResult, NORMAL_CLOSE_CODE, NORMAL_CLOSE_REASON,
};

// Mock transport for testing
pub use mock::{MockPeer, MockTransport};

// WebSocket transport for production
pub use websocket::WebSocketTransport;

// Connection management
pub use connection::{ConnectionEvent, ConnectionManager};
