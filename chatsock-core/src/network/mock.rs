// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Mock Transport
//!
//! Mock implementation of the Transport trait for testing.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use super::error::NetworkError;
use super::message::Frame;
use super::protocol::EnvelopeCodec;
use super::transport::{Socket, SocketCommand, SocketDriver, SocketEvent, Transport, TransportResult};

#[derive(Debug, Default)]
struct MockState {
    /// Error returned by the next `open()`.
    inject_error: Option<NetworkError>,
    /// URLs passed to `open()`, in order.
    opened_urls: Vec<String>,
    /// Server ends of opened sockets not yet taken by the test.
    peers: VecDeque<MockPeer>,
}

/// Mock transport for testing.
///
/// Every successful `open()` yields a [`MockPeer`], the server end of the
/// socket, which the test uses to drive events and inspect what was sent.
/// Clones share state, so keep one clone and hand the other to the
/// connection.
///
/// # Example
///
/// ```ignore
/// use chatsock_core::network::{ConnectionManager, Credentials, MockTransport};
///
/// let transport = MockTransport::new();
/// let conn = ConnectionManager::new(credentials, transport.clone(), decoder);
/// conn.listen();
///
/// let mut peer = transport.take_peer().unwrap();
/// peer.open();
/// peer.deliver_frame(&frame)?;
/// let ack = peer.next_frame().await;
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Creates a new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Injects an error to be returned on the next `open()`.
    pub fn inject_error(&self, error: NetworkError) {
        self.state.lock().inject_error = Some(error);
    }

    /// Returns every URL passed to `open()`.
    pub fn opened_urls(&self) -> Vec<String> {
        self.state.lock().opened_urls.clone()
    }

    /// Number of sockets opened so far.
    pub fn open_count(&self) -> usize {
        self.state.lock().opened_urls.len()
    }

    /// Takes the oldest untaken peer.
    pub fn take_peer(&self) -> Option<MockPeer> {
        self.state.lock().peers.pop_front()
    }
}

impl Transport for MockTransport {
    fn open(&self, url: &str) -> TransportResult<Socket> {
        let mut state = self.state.lock();
        if let Some(err) = state.inject_error.take() {
            return Err(err);
        }

        state.opened_urls.push(url.to_string());
        let (socket, driver) = Socket::pair();
        state.peers.push_back(MockPeer::new(url, driver));
        Ok(socket)
    }
}

/// Server end of a mock socket.
#[derive(Debug)]
pub struct MockPeer {
    url: String,
    driver: SocketDriver,
    codec: EnvelopeCodec,
    close: Option<(u16, String)>,
}

impl MockPeer {
    fn new(url: &str, driver: SocketDriver) -> Self {
        MockPeer {
            url: url.to_string(),
            driver,
            codec: EnvelopeCodec::default(),
            close: None,
        }
    }

    /// URL this socket was opened with.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Reports the handshake as complete. Returns false if the client end
    /// is gone.
    pub fn open(&self) -> bool {
        self.emit(SocketEvent::Open)
    }

    /// Delivers raw bytes as one binary frame.
    pub fn deliver(&self, bytes: Vec<u8>) -> bool {
        self.emit(SocketEvent::Frame(bytes))
    }

    /// Encodes and delivers a frame.
    pub fn deliver_frame(&self, frame: &Frame) -> TransportResult<bool> {
        let bytes = self.codec.encode(frame)?;
        Ok(self.deliver(bytes))
    }

    /// Closes the socket from the server side.
    pub fn close(&self, reason: Option<&str>) -> bool {
        self.emit(SocketEvent::Closed {
            reason: reason.map(str::to_string),
        })
    }

    /// Fails the socket.
    pub fn fail(&self, error: &str) -> bool {
        self.emit(SocketEvent::Error(error.to_string()))
    }

    /// True once the client end has dropped its event stream.
    pub fn is_detached(&self) -> bool {
        self.driver.events.is_closed()
    }

    /// Waits for the next frame the client writes.
    ///
    /// Returns `None` once the client closes the socket or drops it.
    pub async fn next_frame(&mut self) -> Option<Frame> {
        if self.close.is_some() {
            return None;
        }
        while let Some(command) = self.driver.commands.recv().await {
            if let Some(frame) = self.record(command) {
                return Some(frame);
            }
            if self.close.is_some() {
                return None;
            }
        }
        None
    }

    /// Drains the frames written so far without waiting.
    pub fn sent_frames(&mut self) -> Vec<Frame> {
        let mut frames = Vec::new();
        while let Ok(command) = self.driver.commands.try_recv() {
            frames.extend(self.record(command));
        }
        frames
    }

    /// Close code and reason the client sent, if it closed the socket.
    ///
    /// Frames written before the close are discarded.
    pub fn closed_with(&mut self) -> Option<(u16, String)> {
        self.sent_frames();
        self.close.clone()
    }

    fn record(&mut self, command: SocketCommand) -> Option<Frame> {
        match command {
            SocketCommand::Send(bytes) => self.codec.decode(&bytes).ok(),
            SocketCommand::Close { code, reason } => {
                self.close = Some((code, reason));
                None
            }
        }
    }

    fn emit(&self, event: SocketEvent) -> bool {
        self.driver.events.send(event).is_ok()
    }
}
