// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Chat Decoder Boundary
//!
//! The end-to-end decryption engine lives outside this crate. The transport
//! hands it the encrypted body of every chat delivery and expects base64 text
//! back, which is then decoded against the [`SignalEnvelope`] schema.
//!
//! There is no timeout on the decode call: a decoder that never resolves
//! stalls the inbound pipeline of its connection. Implementations that talk
//! to slow engines should bound the call themselves.

use std::future::Future;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use futures_util::future::BoxFuture;
use prost::Message;
use thiserror::Error;

use super::message::SignalEnvelope;

/// Failure to turn an encrypted chat body into a [`SignalEnvelope`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatDecodeError {
    #[error("Decryption codec rejected the payload: {0}")]
    Rejected(String),

    #[error("Decryption codec returned an empty payload")]
    EmptyPayload,

    #[error("Decrypted payload is not valid base64: {0}")]
    InvalidBase64(String),

    #[error("Decrypted payload is not a valid envelope: {0}")]
    InvalidEnvelope(String),
}

/// External decryption codec.
///
/// `decode_received_body` receives the raw encrypted body and resolves to
/// the base64-encoded plaintext envelope.
pub trait ChatDecoder: Send + Sync + 'static {
    fn decode_received_body(&self, body: Vec<u8>) -> BoxFuture<'static, Result<String, ChatDecodeError>>;
}

impl<F, Fut> ChatDecoder for F
where
    F: Fn(Vec<u8>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<String, ChatDecodeError>> + Send + 'static,
{
    fn decode_received_body(&self, body: Vec<u8>) -> BoxFuture<'static, Result<String, ChatDecodeError>> {
        Box::pin(self(body))
    }
}

/// Decoder used when no decryption engine is wired in; every chat payload
/// fails with [`ChatDecodeError::Rejected`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableDecoder;

impl ChatDecoder for UnavailableDecoder {
    fn decode_received_body(&self, _body: Vec<u8>) -> BoxFuture<'static, Result<String, ChatDecodeError>> {
        Box::pin(async { Err(ChatDecodeError::Rejected("no decryption codec configured".into())) })
    }
}

/// Decodes the base64 text returned by a [`ChatDecoder`] into an envelope.
pub fn decode_signal_payload(encoded: &str) -> Result<SignalEnvelope, ChatDecodeError> {
    let bytes = BASE64
        .decode(encoded.trim())
        .map_err(|e| ChatDecodeError::InvalidBase64(e.to_string()))?;

    if bytes.is_empty() {
        return Err(ChatDecodeError::EmptyPayload);
    }

    SignalEnvelope::decode(bytes.as_slice()).map_err(|e| ChatDecodeError::InvalidEnvelope(e.to_string()))
}

/// Runs the full chat decode: external codec, then envelope decoding.
pub(crate) async fn decode_chat_body(
    decoder: &dyn ChatDecoder,
    body: Vec<u8>,
) -> Result<SignalEnvelope, ChatDecodeError> {
    let encoded = decoder.decode_received_body(body).await?;
    decode_signal_payload(&encoded)
}
