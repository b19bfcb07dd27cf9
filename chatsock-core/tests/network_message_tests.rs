// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for network::message and network::router

mod common;

use chatsock_core::network::*;
use common::*;

#[test]
fn test_signal_message_body_json_shape() {
    let body = SignalMessageBody {
        messages: vec![OutgoingSignalMessage {
            kind: 3,
            destination: "+15550123".into(),
            destination_device_id: 2,
            destination_registration_id: 77,
            content: "Ym9keQ==".into(),
            timestamp: 5,
            silent: Some(true),
        }],
        timestamp: None,
        online: Some(false),
    };

    let json = serde_json::to_value(&body).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "messages": [{
                "type": 3,
                "destination": "+15550123",
                "destinationDeviceId": 2,
                "destinationRegistrationId": 77,
                "content": "Ym9keQ==",
                "timestamp": 5,
                "silent": true
            }],
            "online": false
        })
    );
    assert_eq!(body.destination(), Some("+15550123"));
}

#[test]
fn test_signal_message_body_parses_minimal_json() {
    let body: SignalMessageBody = serde_json::from_str(
        r#"{"messages":[{"type":1,"destination":"bob","content":"eA=="}]}"#,
    )
    .unwrap();

    assert_eq!(body.destination(), Some("bob"));
    assert_eq!(body.messages[0].destination_device_id, 0);
    assert_eq!(body.timestamp, None);
}

#[test]
fn test_route_chat_and_plain() {
    assert_eq!(
        route(&chat_delivery(1, b"cipher")),
        RoutedBody::EncryptedChat(b"cipher".to_vec())
    );
    assert_eq!(
        route(&Frame::Request(Request::new(2, "PUT", "/api/v1/messages").with_body(b"x".to_vec()))),
        RoutedBody::Plain("x".into())
    );
    assert_eq!(
        route(&Frame::Request(Request::new(3, "POST", CHAT_INGRESS_PATH).with_body(b"x".to_vec()))),
        RoutedBody::Plain("x".into())
    );
}

#[test]
fn test_decode_signal_payload() {
    let envelope = decode_signal_payload(&encoded_envelope("+15550100", 9)).unwrap();
    assert_eq!(envelope.source.as_deref(), Some("+15550100"));
    assert_eq!(envelope.timestamp, Some(9));
    assert_eq!(envelope.r#type, Some(SignalEnvelopeType::Ciphertext as i32));

    assert_eq!(decode_signal_payload(""), Err(ChatDecodeError::EmptyPayload));
}

#[test]
fn test_inbound_message_accessors() {
    let message = InboundMessage {
        frame: Frame::Response(Response::new(11, 200, "OK")),
        body: None,
        signal_message: Some(Err(ChatDecodeError::EmptyPayload)),
    };
    assert_eq!(message.id(), 11);
    assert!(message.signal_envelope().is_none());
}
