// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Fuzz and Round-Trip Tests for the Envelope Codec
//!
//! Uses proptest to generate random inputs and verify:
//! 1. Every frame that passes validation survives encode/decode unchanged
//! 2. Random bytes never cause panics when decoding
//! 3. Frames breaking the schema are rejected before any bytes are produced

mod common;

use chatsock_core::network::*;
use common::strategies::*;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Valid frames round-trip exactly.
    #[test]
    fn prop_frame_round_trip(frame in frame_strategy()) {
        let codec = EnvelopeCodec::default();
        let bytes = codec.encode(&frame).unwrap();
        prop_assert_eq!(codec.decode(&bytes).unwrap(), frame);
    }

    /// Random bytes either decode or fail; they never panic.
    #[test]
    fn fuzz_decode_no_panic(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let codec = EnvelopeCodec::default();
        let _ = codec.decode(&data);
    }

    /// Anything the codec accepts can be re-encoded.
    #[test]
    fn fuzz_decoded_frames_reencode(data in prop::collection::vec(any::<u8>(), 1..256)) {
        let codec = EnvelopeCodec::default();
        if let Ok(frame) = codec.decode(&data) {
            if codec.schema().validate(&frame).is_ok() {
                let again = codec.encode(&frame).unwrap();
                prop_assert_eq!(codec.decode(&again).unwrap(), frame);
            }
        }
    }

    /// Auto-ack mirrors the request id for any request.
    #[test]
    fn prop_ack_mirrors_request_id(request in request_strategy()) {
        let correlator = RequestCorrelator::new();
        let frame = Frame::Request(request.clone());
        match correlator.classify(&frame) {
            Inbound::Request { ack, .. } => {
                prop_assert_eq!(ack, Response::new(request.id, 200, "OK"));
            }
            Inbound::Response(_) => prop_assert!(false, "request classified as response"),
        }
    }

    /// Statuses outside 100..=599 are never encoded.
    #[test]
    fn prop_out_of_range_status_rejected(status in prop_oneof![0u32..100, 600u32..10_000]) {
        let codec = EnvelopeCodec::default();
        let frame = Frame::Response(Response::new(1, status, "x"));
        prop_assert!(matches!(codec.encode(&frame), Err(NetworkError::Validation(_))));
    }
}

#[test]
fn test_oversized_frame_rejected_both_ways() {
    let codec = EnvelopeCodec::new(std::sync::Arc::new(WireSchema {
        max_frame_size: 64,
        ..Default::default()
    }));
    let frame = Frame::Request(Request::new(1, "PUT", "/v1/messages/x").with_body(vec![0u8; 128]));

    assert!(matches!(codec.encode(&frame), Err(NetworkError::Validation(_))));

    let bytes = EnvelopeCodec::default().encode(&frame).unwrap();
    assert!(matches!(codec.decode(&bytes), Err(NetworkError::InvalidMessage(_))));
}

#[test]
fn test_empty_frame_rejected() {
    assert!(matches!(
        EnvelopeCodec::default().decode(&[]),
        Err(NetworkError::InvalidMessage(_))
    ));
}
