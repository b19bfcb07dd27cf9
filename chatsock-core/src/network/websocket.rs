// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! WebSocket Transport
//!
//! Real transport implementation using tokio-tungstenite. Each opened socket
//! is driven by its own task which performs the handshake, forwards binary
//! frames as [`SocketEvent`]s and executes [`SocketCommand`]s.

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request as HandshakeRequest;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, trace, warn};

use super::error::NetworkError;
use super::transport::{Socket, SocketCommand, SocketDriver, SocketEvent, Transport, TransportResult};

/// WebSocket transport for the chat server.
///
/// Supports `ws://` URLs. Must be used from within a tokio runtime.
///
/// # Example
///
/// ```ignore
/// use chatsock_core::network::{Transport, WebSocketTransport};
///
/// let transport = WebSocketTransport::new();
/// let socket = transport.open("ws://chat.example.com/v1/websocket/?login=a&password=b")?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct WebSocketTransport;

impl WebSocketTransport {
    pub fn new() -> Self {
        WebSocketTransport
    }
}

impl Transport for WebSocketTransport {
    fn open(&self, url: &str) -> TransportResult<Socket> {
        let request = url
            .into_client_request()
            .map_err(|e| NetworkError::ConnectionFailed(format!("Invalid URL: {}", e)))?;

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| NetworkError::ConnectionFailed(format!("No async runtime: {}", e)))?;

        let (socket, driver) = Socket::pair();
        runtime.spawn(drive(request, driver));
        Ok(socket)
    }
}

/// Runs one socket until it closes, fails or the client end goes away.
async fn drive(request: HandshakeRequest, driver: SocketDriver) {
    let SocketDriver {
        mut commands,
        events,
    } = driver;

    let uri = request.uri().clone();
    let stream = match connect_async(request).await {
        Ok((stream, _response)) => stream,
        Err(e) => {
            warn!(host = ?uri.host(), error = %e, "WebSocket handshake failed");
            let _ = events.send(SocketEvent::Error(e.to_string()));
            return;
        }
    };
    debug!(host = ?uri.host(), "WebSocket connected");
    if events.send(SocketEvent::Open).is_err() {
        return;
    }

    let (mut sink, mut stream) = stream.split();

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(SocketCommand::Send(bytes)) => {
                    if let Err(e) = sink.send(Message::Binary(bytes)).await {
                        let _ = events.send(SocketEvent::Error(e.to_string()));
                        return;
                    }
                }
                Some(SocketCommand::Close { code, reason }) => {
                    let frame = CloseFrame {
                        code: CloseCode::from(code),
                        reason: reason.into(),
                    };
                    if let Err(e) = sink.send(Message::Close(Some(frame))).await {
                        debug!(error = %e, "Close frame not sent");
                    }
                    return;
                }
                // Client dropped the socket.
                None => {
                    let _ = sink.close().await;
                    return;
                }
            },
            message = stream.next() => match message {
                Some(Ok(Message::Binary(bytes))) => {
                    trace!(len = bytes.len(), "Frame received");
                    if events.send(SocketEvent::Frame(bytes)).is_err() {
                        return;
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    let reason = frame.map(|f| f.reason.into_owned()).filter(|r| !r.is_empty());
                    let _ = events.send(SocketEvent::Closed { reason });
                    return;
                }
                Some(Ok(Message::Text(text))) => {
                    debug!(len = text.len(), "Ignoring text frame");
                }
                // Ping/pong are answered by tungstenite.
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    let _ = events.send(SocketEvent::Error(e.to_string()));
                    return;
                }
                None => {
                    let _ = events.send(SocketEvent::Closed { reason: None });
                    return;
                }
            },
        }
    }
}
