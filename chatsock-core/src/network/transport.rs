// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Transport Trait
//!
//! Platform-agnostic abstraction for the underlying socket.
//!
//! A [`Transport`] turns a URL into a [`Socket`]: a command channel towards
//! the wire and an ordered stream of [`SocketEvent`]s coming back. Opening is
//! synchronous and only constructs the socket; the handshake completes later
//! and is reported as [`SocketEvent::Open`].

use std::fmt;

use tokio::sync::mpsc;

use super::error::NetworkError;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, NetworkError>;

/// Close code sent on a normal shutdown.
pub const NORMAL_CLOSE_CODE: u16 = 1000;

/// Close reason sent on a normal shutdown.
pub const NORMAL_CLOSE_REASON: &str = "OK";

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Created, `listen()` never called.
    Idle,
    /// Socket constructed and not yet closed.
    Open,
    /// Stopped, failed or closed by the peer. `listen()` reopens.
    Closed,
}

/// Login credentials for the chat server.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub host: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(host: &str, username: &str, password: &str) -> Self {
        Credentials {
            host: host.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    /// Builds `ws://<host>/v1/websocket/?login=<username>&password=<password>`.
    ///
    /// Any scheme and trailing slashes on the host are dropped.
    pub fn connection_url(&self) -> TransportResult<String> {
        let host = strip_host(&self.host);
        if host.is_empty() {
            return Err(NetworkError::ConnectionFailed("No host configured".into()));
        }

        Ok(format!(
            "ws://{}/v1/websocket/?login={}&password={}",
            host,
            encode_query_value(&self.username),
            encode_query_value(&self.password)
        ))
    }
}

fn strip_host(host: &str) -> &str {
    let host = host.trim();
    let without_scheme = ["https://", "http://", "wss://", "ws://"]
        .iter()
        .find_map(|scheme| {
            host.get(..scheme.len())
                .filter(|prefix| prefix.eq_ignore_ascii_case(scheme))
                .map(|_| &host[scheme.len()..])
        })
        .unwrap_or(host);
    without_scheme.trim_end_matches('/')
}

fn encode_query_value(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Event reported by a socket, in wire order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent {
    /// Handshake completed.
    Open,
    /// Binary frame received.
    Frame(Vec<u8>),
    /// Peer closed the socket or the stream ended.
    Closed { reason: Option<String> },
    /// Socket failed. No further events follow.
    Error(String),
}

/// Instruction to the task that drives a socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketCommand {
    /// Write one binary frame.
    Send(Vec<u8>),
    /// Close the socket.
    Close { code: u16, reason: String },
}

/// Client end of an opened socket.
#[derive(Debug)]
pub struct Socket {
    writer: SocketWriter,
    events: mpsc::UnboundedReceiver<SocketEvent>,
}

/// Transport end of an opened socket.
#[derive(Debug)]
pub struct SocketDriver {
    pub commands: mpsc::UnboundedReceiver<SocketCommand>,
    pub events: mpsc::UnboundedSender<SocketEvent>,
}

impl Socket {
    /// Creates a connected client/driver pair.
    pub fn pair() -> (Socket, SocketDriver) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        (
            Socket {
                writer: SocketWriter { commands: command_tx },
                events: event_rx,
            },
            SocketDriver {
                commands: command_rx,
                events: event_tx,
            },
        )
    }

    /// Separates the write side from the event stream.
    pub fn split(self) -> (SocketWriter, mpsc::UnboundedReceiver<SocketEvent>) {
        (self.writer, self.events)
    }
}

/// Write side of a socket.
#[derive(Debug, Clone)]
pub struct SocketWriter {
    commands: mpsc::UnboundedSender<SocketCommand>,
}

impl SocketWriter {
    /// Queues a binary frame.
    pub fn send(&self, frame: Vec<u8>) -> TransportResult<()> {
        self.commands
            .send(SocketCommand::Send(frame))
            .map_err(|_| NetworkError::SendFailed("socket is gone".into()))
    }

    /// Asks the driver to close the socket.
    pub fn close(&self, code: u16, reason: &str) -> TransportResult<()> {
        self.commands
            .send(SocketCommand::Close {
                code,
                reason: reason.to_string(),
            })
            .map_err(|_| NetworkError::ConnectionClosed)
    }

    /// True once the driver has gone away.
    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }
}

/// Transport trait for opening sockets.
///
/// This trait abstracts the underlying socket implementation allowing for
/// platform-specific implementations and easy testing with mocks.
pub trait Transport: Send + Sync + 'static {
    /// Constructs a socket for `url`.
    ///
    /// Returns an error if the socket cannot be constructed. Handshake
    /// failures after construction are reported as [`SocketEvent::Error`].
    fn open(&self, url: &str) -> TransportResult<Socket>;
}
