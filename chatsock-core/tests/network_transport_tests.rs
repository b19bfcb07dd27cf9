// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for network::transport
//! Extracted from transport.rs

use chatsock_core::network::*;

#[test]
fn test_connection_url_for_plain_host() {
    let credentials = Credentials::new("chat.example.com", "alice", "pw");
    assert_eq!(
        credentials.connection_url().unwrap(),
        "ws://chat.example.com/v1/websocket/?login=alice&password=pw"
    );
}

#[test]
fn test_connection_url_strips_every_scheme() {
    for host in [
        "http://chat.example.com",
        "https://chat.example.com/",
        "ws://chat.example.com",
        "WSS://chat.example.com///",
    ] {
        let credentials = Credentials::new(host, "alice", "pw");
        assert_eq!(
            credentials.connection_url().unwrap(),
            "ws://chat.example.com/v1/websocket/?login=alice&password=pw",
            "host {:?}",
            host
        );
    }
}

#[test]
fn test_connection_url_empty_host() {
    let credentials = Credentials::new("  ", "alice", "pw");
    assert_eq!(
        credentials.connection_url(),
        Err(NetworkError::ConnectionFailed("No host configured".into()))
    );
}

#[test]
fn test_connection_state_transitions_are_distinct() {
    assert_ne!(ConnectionState::Idle, ConnectionState::Open);
    assert_ne!(ConnectionState::Open, ConnectionState::Closed);
}

#[tokio::test]
async fn test_socket_pair_carries_commands_and_events() {
    let (socket, mut driver) = Socket::pair();
    let (writer, mut events) = socket.split();

    writer.send(vec![1, 2]).unwrap();
    writer.close(NORMAL_CLOSE_CODE, NORMAL_CLOSE_REASON).unwrap();
    assert_eq!(driver.commands.recv().await, Some(SocketCommand::Send(vec![1, 2])));
    assert_eq!(
        driver.commands.recv().await,
        Some(SocketCommand::Close {
            code: 1000,
            reason: "OK".into()
        })
    );

    driver.events.send(SocketEvent::Open).unwrap();
    assert_eq!(events.recv().await, Some(SocketEvent::Open));

    drop(driver);
    assert!(events.recv().await.is_none());
    assert!(writer.is_closed());
}
