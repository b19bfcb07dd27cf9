// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Connection Manager
//!
//! Owns the socket, the lifecycle state and the keepalive timer of one
//! connection, and runs the inbound pipeline:
//!
//! ```text
//! socket ─▶ EnvelopeCodec ─▶ RequestCorrelator ─▶ PayloadRouter ─▶ [ChatDecoder] ─▶ on_message()
//!                                 │
//!                                 └──▶ 200 OK ack ─▶ socket
//! ```
//!
//! Frames are processed one at a time in arrival order. A chat payload
//! waiting on the external decoder holds back every later frame.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::config::ConnectionConfig;
use super::correlator::{Inbound, PendingRequests, RequestCorrelator};
use super::decoder::{decode_chat_body, ChatDecoder};
use super::error::NetworkError;
use super::keepalive::KeepaliveScheduler;
use super::message::{
    Frame, InboundMessage, Request, Response, SignalMessageBody, JSON_CONTENT_TYPE_HEADER,
};
use super::protocol::EnvelopeCodec;
use super::router::{route, RoutedBody};
use super::transport::{
    ConnectionState, Credentials, SocketEvent, SocketWriter, Transport, TransportResult,
    NORMAL_CLOSE_CODE, NORMAL_CLOSE_REASON,
};

/// Lifecycle notification delivered through [`ConnectionManager::on_open`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// The socket reported open; keepalive is running.
    Opened,
    /// The socket closed or failed.
    Closed { reason: Option<String> },
}

/// State behind the connection lock.
struct Link {
    state: ConnectionState,
    /// Bumped on every `listen()` and `stop()`; tasks of older sockets
    /// compare against it and back off.
    generation: u64,
    writer: Option<SocketWriter>,
    keepalive: KeepaliveScheduler,
    dispatcher: Option<JoinHandle<()>>,
}

impl Link {
    /// Invalidates the current socket generation: cancels keepalive, aborts
    /// the dispatcher and closes the writer with 1000 "OK". Returns whether
    /// the link was open.
    fn retire(&mut self) -> bool {
        self.generation += 1;
        self.keepalive.stop();
        if let Some(dispatcher) = self.dispatcher.take() {
            dispatcher.abort();
        }
        if let Some(writer) = self.writer.take() {
            // Driver may already be gone.
            let _ = writer.close(NORMAL_CLOSE_CODE, NORMAL_CLOSE_REASON);
        }
        let was_open = self.state == ConnectionState::Open;
        self.state = ConnectionState::Closed;
        was_open
    }
}

#[derive(Default)]
struct Subscribers {
    messages: Option<mpsc::UnboundedSender<InboundMessage>>,
    events: Option<mpsc::UnboundedSender<ConnectionEvent>>,
}

struct Shared {
    link: Mutex<Link>,
    subscribers: Mutex<Subscribers>,
}

impl Shared {
    /// Writes to the socket of `generation` if it is still the current one.
    fn send_on(&self, generation: u64, bytes: Vec<u8>) -> bool {
        let link = self.link.lock();
        if link.generation != generation {
            debug!(generation, "Dropping send for a replaced socket");
            return false;
        }
        Self::write(&link, bytes)
    }

    /// Writes to the current socket, if any.
    fn send_current(&self, bytes: Vec<u8>) -> bool {
        let link = self.link.lock();
        Self::write(&link, bytes)
    }

    fn write(link: &Link, bytes: Vec<u8>) -> bool {
        match &link.writer {
            Some(writer) => match writer.send(bytes) {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "Send failed");
                    false
                }
            },
            None => {
                debug!("Send skipped: connection not open");
                false
            }
        }
    }

    fn deliver(&self, message: InboundMessage) {
        let mut subscribers = self.subscribers.lock();
        match &subscribers.messages {
            Some(tx) => {
                if tx.send(message).is_err() {
                    debug!("Message subscriber went away");
                    subscribers.messages = None;
                }
            }
            None => debug!(id = message.id(), "No message subscriber; dropping message"),
        }
    }

    fn notify(&self, event: ConnectionEvent) {
        let mut subscribers = self.subscribers.lock();
        if let Some(tx) = &subscribers.events {
            if tx.send(event).is_err() {
                subscribers.events = None;
            }
        }
    }
}

/// Connection manager for one chat session.
///
/// Create it with [`Credentials`], subscribe with [`on_message`] and
/// [`on_open`], then call [`listen`]. Every method is safe to call from any
/// state; transport failures are logged rather than returned.
///
/// # Example
///
/// ```ignore
/// use chatsock_core::network::{ConnectionManager, Credentials, WebSocketTransport};
///
/// let credentials = Credentials::new("chat.example.com", "alice", "pw");
/// let conn = ConnectionManager::new(credentials, WebSocketTransport::new(), decoder);
/// let mut messages = conn.on_message();
/// conn.listen();
///
/// while let Some(message) = messages.recv().await {
///     println!("{:?}", message.body);
/// }
/// ```
///
/// [`on_message`]: ConnectionManager::on_message
/// [`on_open`]: ConnectionManager::on_open
/// [`listen`]: ConnectionManager::listen
pub struct ConnectionManager<T: Transport> {
    transport: T,
    credentials: Credentials,
    config: ConnectionConfig,
    codec: EnvelopeCodec,
    correlator: Arc<RequestCorrelator>,
    pending: Arc<PendingRequests>,
    decoder: Arc<dyn ChatDecoder>,
    shared: Arc<Shared>,
}

impl<T: Transport> ConnectionManager<T> {
    /// Creates an idle connection with the default configuration.
    pub fn new(credentials: Credentials, transport: T, decoder: impl ChatDecoder) -> Self {
        Self::with_config(credentials, transport, decoder, ConnectionConfig::default())
    }

    /// Creates an idle connection.
    pub fn with_config(
        credentials: Credentials,
        transport: T,
        decoder: impl ChatDecoder,
        config: ConnectionConfig,
    ) -> Self {
        let codec = EnvelopeCodec::new(Arc::new(config.wire_schema()));
        Self::with_codec(credentials, transport, Arc::new(decoder), config, codec)
    }

    /// Creates an idle connection sharing an existing codec and decoder.
    ///
    /// Use this to build many sessions from one schema.
    pub fn with_codec(
        credentials: Credentials,
        transport: T,
        decoder: Arc<dyn ChatDecoder>,
        config: ConnectionConfig,
        codec: EnvelopeCodec,
    ) -> Self {
        let link = Link {
            state: ConnectionState::Idle,
            generation: 0,
            writer: None,
            keepalive: KeepaliveScheduler::new(config.keepalive_interval),
            dispatcher: None,
        };

        ConnectionManager {
            transport,
            credentials,
            pending: Arc::new(PendingRequests::new(config.max_pending_requests)),
            config,
            codec,
            correlator: Arc::new(RequestCorrelator::new()),
            decoder,
            shared: Arc::new(Shared {
                link: Mutex::new(link),
                subscribers: Mutex::new(Subscribers::default()),
            }),
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn codec(&self) -> &EnvelopeCodec {
        &self.codec
    }

    /// Returns the current connection state.
    pub fn state(&self) -> ConnectionState {
        self.shared.link.lock().state
    }

    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Returns a fresh request id from this connection's sequence.
    pub fn next_request_id(&self) -> u64 {
        self.correlator.next_request_id()
    }

    /// Subscribes to lifecycle events.
    ///
    /// Replaces the previous subscription, whose stream then ends.
    pub fn on_open(&self) -> mpsc::UnboundedReceiver<ConnectionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.shared.subscribers.lock().events = Some(tx);
        rx
    }

    /// Subscribes to inbound messages, delivered in wire order.
    ///
    /// Replaces the previous subscription, whose stream then ends.
    pub fn on_message(&self) -> mpsc::UnboundedReceiver<InboundMessage> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.shared.subscribers.lock().messages = Some(tx);
        rx
    }

    /// Opens the socket, closing any socket this connection already has.
    ///
    /// The state becomes `Open` once the socket is constructed. If
    /// construction fails the state is `Closed` and the error is logged.
    /// Must be called from within a tokio runtime.
    pub fn listen(&self) {
        self.stop();

        let url = match self.credentials.connection_url() {
            Ok(url) => url,
            Err(e) => {
                error!(error = %e, "Cannot build connection URL");
                return;
            }
        };

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                error!(error = %e, "Cannot listen outside an async runtime");
                return;
            }
        };

        let socket = match self.transport.open(&url) {
            Ok(socket) => socket,
            Err(e) => {
                error!(host = %self.credentials.host, error = %e, "Socket construction failed");
                return;
            }
        };
        let (writer, events) = socket.split();

        let mut link = self.shared.link.lock();
        // A concurrent listen() may have installed its socket in the meantime.
        if link.retire() {
            debug!(generation = link.generation, "Replacing a socket opened concurrently");
            self.pending.clear_with_error(NetworkError::ConnectionClosed);
        }
        link.writer = Some(writer);
        link.state = ConnectionState::Open;

        let dispatcher = Dispatcher {
            generation: link.generation,
            shared: Arc::downgrade(&self.shared),
            codec: self.codec.clone(),
            correlator: self.correlator.clone(),
            pending: self.pending.clone(),
            decoder: self.decoder.clone(),
        };
        link.dispatcher = Some(runtime.spawn(dispatcher.run(events)));

        info!(host = %self.credentials.host, generation = link.generation, "Listening");
    }

    /// Closes the socket, cancels keepalive and clears the socket handle.
    ///
    /// Idempotent. When it returns, no further write reaches the old socket.
    pub fn stop(&self) {
        let was_open = self.shared.link.lock().retire();

        self.pending.clear_with_error(NetworkError::ConnectionClosed);

        if was_open {
            info!(host = %self.credentials.host, "Connection stopped");
            self.shared.notify(ConnectionEvent::Closed { reason: None });
        }
    }

    /// Best-effort write of an encoded frame. Never fails; a closed
    /// connection or a broken socket is logged.
    pub fn send(&self, bytes: Vec<u8>) {
        self.shared.send_current(bytes);
    }

    /// Encodes and writes a frame.
    ///
    /// Returns the validation error if the frame cannot be encoded; transport
    /// failures are handled as in [`send`](Self::send).
    pub fn send_frame(&self, frame: &Frame) -> TransportResult<()> {
        let bytes = self.codec.encode(frame).inspect_err(|e| {
            warn!(id = frame.id(), error = %e, "Frame failed validation; not sent");
        })?;
        self.send(bytes);
        Ok(())
    }

    /// Sends a chat message as `PUT /v1/messages/<destination>`.
    ///
    /// The destination is taken from the first entry of `body.messages`.
    /// Returns the request id used.
    pub fn send_signal_message(&self, body: &SignalMessageBody) -> TransportResult<u64> {
        let destination = body.destination().ok_or_else(|| {
            NetworkError::Validation("signal message body has no destination".into())
        })?;
        let json = serde_json::to_vec(body)?;

        let request = self
            .correlator
            .build_request("PUT", &format!("/v1/messages/{}", destination))
            .with_body(json)
            .with_header(JSON_CONTENT_TYPE_HEADER);
        let id = request.id;

        self.send_frame(&Frame::Request(request))?;
        debug!(id, destination, "Signal message sent");
        Ok(id)
    }

    /// Sends a request and waits for the response with the same id.
    ///
    /// Fails with `NotConnected` when the connection is not open,
    /// `CapacityExceeded` when too many requests are outstanding,
    /// `RequestTimeout` after `request_timeout`, and `ConnectionClosed`
    /// if the connection goes away first. The response is also delivered
    /// to the message stream.
    pub async fn request(
        &self,
        verb: &str,
        path: &str,
        body: Option<Vec<u8>>,
        headers: Vec<String>,
    ) -> TransportResult<Response> {
        if !self.is_open() {
            return Err(NetworkError::NotConnected);
        }
        if !self.pending.has_capacity() {
            return Err(NetworkError::CapacityExceeded(self.config.max_pending_requests));
        }

        let mut request: Request = self.correlator.build_request(verb, path);
        request.body = body;
        request.headers = headers;
        let id = request.id;
        let bytes = self.codec.encode(&Frame::Request(request))?;

        let rx = self
            .pending
            .add(id)
            .ok_or(NetworkError::CapacityExceeded(self.config.max_pending_requests))?;

        if !self.shared.send_current(bytes) {
            self.pending.remove(id);
            return Err(NetworkError::NotConnected);
        }

        let timeout = self.config.request_timeout;
        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(NetworkError::ConnectionClosed),
            Err(_) => {
                self.pending.remove(id);
                Err(NetworkError::RequestTimeout { id, timeout })
            }
        }
    }
}

impl<T: Transport> Drop for ConnectionManager<T> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Inbound pipeline of one socket generation.
struct Dispatcher {
    generation: u64,
    shared: Weak<Shared>,
    codec: EnvelopeCodec,
    correlator: Arc<RequestCorrelator>,
    pending: Arc<PendingRequests>,
    decoder: Arc<dyn ChatDecoder>,
}

impl Dispatcher {
    async fn run(self, mut events: mpsc::UnboundedReceiver<SocketEvent>) {
        let reason = loop {
            match events.recv().await {
                Some(SocketEvent::Open) => self.on_open(),
                Some(SocketEvent::Frame(bytes)) => self.on_frame(bytes).await,
                Some(SocketEvent::Closed { reason }) => break reason,
                Some(SocketEvent::Error(e)) => {
                    warn!(error = %e, "Socket error");
                    break Some(e);
                }
                None => break None,
            }
        };
        self.on_closed(reason);
    }

    fn on_open(&self) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };

        {
            let mut link = shared.link.lock();
            if link.generation != self.generation {
                return;
            }

            let weak = self.shared.clone();
            let generation = self.generation;
            link.keepalive.start(self.correlator.clone(), self.codec.clone(), move |bytes| {
                if let Some(shared) = weak.upgrade() {
                    shared.send_on(generation, bytes);
                }
            });
        }

        info!(generation = self.generation, "Connection open");
        shared.notify(ConnectionEvent::Opened);
    }

    async fn on_frame(&self, bytes: Vec<u8>) {
        let mut frame = match self.codec.decode(&bytes) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(len = bytes.len(), error = %e, "Dropping malformed frame");
                return;
            }
        };

        match self.correlator.classify(&frame) {
            Inbound::Request { request, ack } => {
                debug!(id = request.id, verb = %request.verb, path = %request.path, "Inbound request");
                self.send_frame(&Frame::Response(ack));
            }
            Inbound::Response(response) => {
                debug!(id = response.id, status = response.status, "Inbound response");
                self.pending.resolve(response);
            }
        }

        let (body, signal_message) = match route(&frame) {
            RoutedBody::NoBody => {
                frame.clear_body();
                (None, None)
            }
            RoutedBody::Plain(text) => (Some(text), None),
            RoutedBody::EncryptedChat(blob) => {
                let outcome = decode_chat_body(self.decoder.as_ref(), blob).await;
                if let Err(e) = &outcome {
                    warn!(id = frame.id(), error = %e, "Chat payload not decoded; delivering envelope without it");
                }
                (None, Some(outcome))
            }
        };

        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        if shared.link.lock().generation != self.generation {
            return;
        }
        shared.deliver(InboundMessage {
            frame,
            body,
            signal_message,
        });
    }

    fn send_frame(&self, frame: &Frame) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        match self.codec.encode(frame) {
            Ok(bytes) => {
                shared.send_on(self.generation, bytes);
            }
            Err(e) => warn!(id = frame.id(), error = %e, "Frame failed validation; not sent"),
        }
    }

    fn on_closed(&self, reason: Option<String>) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };

        {
            let mut link = shared.link.lock();
            if link.generation != self.generation {
                return;
            }
            link.keepalive.stop();
            link.writer = None;
            // This task is finishing; dropping the handle detaches it.
            link.dispatcher = None;
            link.state = ConnectionState::Closed;
        }

        self.pending.clear_with_error(NetworkError::ConnectionClosed);
        info!(generation = self.generation, reason = ?reason, "Connection closed");
        shared.notify(ConnectionEvent::Closed { reason });
    }
}
