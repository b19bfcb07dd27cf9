// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Request/Response Correlation
//!
//! Assigns outbound request ids, classifies inbound frames and builds the
//! protocol-level acknowledgement every inbound request receives.
//!
//! [`PendingRequests`] adds optional reply matching for callers that need to
//! await the response to one of their own requests. Fire-and-forget sends
//! never register there.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::Mutex;
use tokio::sync::oneshot;

use super::error::NetworkError;
use super::message::{Frame, Request, Response};
use super::transport::TransportResult;

/// Status sent in every automatic acknowledgement.
pub const ACK_STATUS: u32 = 200;

/// Message sent in every automatic acknowledgement.
pub const ACK_MESSAGE: &str = "OK";

/// An inbound frame after classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound<'a> {
    /// Peer-initiated request, together with the acknowledgement to send.
    Request { request: &'a Request, ack: Response },
    /// Response to a request sent by this client.
    Response(&'a Response),
}

/// Hands out request ids and classifies inbound frames.
///
/// Ids are monotonically increasing for the lifetime of the correlator, which
/// outlives individual sockets so ids never repeat across reconnects.
#[derive(Debug)]
pub struct RequestCorrelator {
    next_id: AtomicU64,
}

impl Default for RequestCorrelator {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestCorrelator {
    /// Creates a correlator whose first id is 1.
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Creates a correlator whose first id is `first`.
    pub fn starting_at(first: u64) -> Self {
        RequestCorrelator {
            next_id: AtomicU64::new(first),
        }
    }

    /// Returns the next request id.
    pub fn next_request_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Builds an outbound request with a fresh id.
    pub fn build_request(&self, verb: &str, path: &str) -> Request {
        Request::new(self.next_request_id(), verb, path)
    }

    /// Classifies an inbound frame. Requests are always paired with their ack.
    pub fn classify<'a>(&self, frame: &'a Frame) -> Inbound<'a> {
        match frame {
            Frame::Request(request) => Inbound::Request {
                request,
                ack: build_ack(request.id),
            },
            Frame::Response(response) => Inbound::Response(response),
        }
    }
}

/// Builds the `200 OK` acknowledgement for an inbound request.
pub fn build_ack(request_id: u64) -> Response {
    Response::new(request_id, ACK_STATUS, ACK_MESSAGE)
}

/// A request awaiting its response.
struct PendingRequest {
    response_tx: oneshot::Sender<TransportResult<Response>>,
    created_at: Instant,
}

/// Outstanding requests keyed by id.
pub struct PendingRequests {
    requests: Mutex<HashMap<u64, PendingRequest>>,
    max_pending: usize,
}

impl PendingRequests {
    /// Creates an empty table holding at most `max_pending` entries.
    pub fn new(max_pending: usize) -> Self {
        PendingRequests {
            requests: Mutex::new(HashMap::new()),
            max_pending,
        }
    }

    /// Registers a request id.
    ///
    /// Returns a receiver resolved when the matching response arrives, or
    /// `None` if the table is full or the id is already registered.
    pub fn add(&self, id: u64) -> Option<oneshot::Receiver<TransportResult<Response>>> {
        let mut requests = self.requests.lock();
        if requests.len() >= self.max_pending || requests.contains_key(&id) {
            return None;
        }

        let (tx, rx) = oneshot::channel();
        requests.insert(
            id,
            PendingRequest {
                response_tx: tx,
                created_at: Instant::now(),
            },
        );
        Some(rx)
    }

    /// Resolves the request matching `response.id`.
    ///
    /// Returns `true` if a waiter was registered for it.
    pub fn resolve(&self, response: &Response) -> bool {
        let pending = self.requests.lock().remove(&response.id);
        match pending {
            Some(pending) => {
                tracing::trace!(
                    id = response.id,
                    waited_ms = pending.created_at.elapsed().as_millis() as u64,
                    "Matched response to pending request"
                );
                // Receiver may have given up already.
                let _ = pending.response_tx.send(Ok(response.clone()));
                true
            }
            None => false,
        }
    }

    /// Drops a pending request without notifying its waiter.
    pub fn remove(&self, id: u64) -> bool {
        self.requests.lock().remove(&id).is_some()
    }

    /// Fails every pending request with `error`.
    pub fn clear_with_error(&self, error: NetworkError) {
        let drained: Vec<_> = self.requests.lock().drain().collect();
        for (_, pending) in drained {
            let _ = pending.response_tx.send(Err(error.clone()));
        }
    }

    pub fn has_capacity(&self) -> bool {
        self.requests.lock().len() < self.max_pending
    }

    pub fn len(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.lock().is_empty()
    }
}
