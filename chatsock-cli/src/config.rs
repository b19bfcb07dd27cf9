// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI Configuration

use std::time::Duration;

use anyhow::{bail, Result};
use chatsock_core::network::{
    ConnectionConfig, ConnectionEvent, ConnectionManager, Credentials, UnavailableDecoder,
    WebSocketTransport,
};
use tokio::sync::mpsc::UnboundedReceiver;

/// How long commands wait for the socket to open.
const OPEN_TIMEOUT: Duration = Duration::from_secs(10);

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Server credentials.
    pub credentials: Credentials,
    /// Connection tuning, from `CHATSOCK_*` variables.
    pub connection: ConnectionConfig,
}

impl CliConfig {
    pub fn new(host: &str, username: &str, password: &str) -> Self {
        CliConfig {
            credentials: Credentials::new(host, username, password),
            connection: ConnectionConfig::from_env(),
        }
    }

    /// Creates a connection to the configured server.
    ///
    /// The CLI has no decryption engine, so chat payloads are delivered
    /// undecoded.
    pub fn connection(&self) -> Result<ConnectionManager<WebSocketTransport>> {
        if self.credentials.host.trim().is_empty() {
            bail!("No host configured. Use --host or set CHATSOCK_HOST.");
        }

        Ok(ConnectionManager::with_config(
            self.credentials.clone(),
            WebSocketTransport::new(),
            UnavailableDecoder,
            self.connection.clone(),
        ))
    }
}

/// Waits until the socket reports open.
pub async fn wait_for_open(events: &mut UnboundedReceiver<ConnectionEvent>) -> Result<()> {
    match tokio::time::timeout(OPEN_TIMEOUT, events.recv()).await {
        Ok(Some(ConnectionEvent::Opened)) => Ok(()),
        Ok(Some(ConnectionEvent::Closed { reason })) => {
            bail!(
                "Connection closed before opening: {}",
                reason.as_deref().unwrap_or("no reason given")
            )
        }
        Ok(None) => bail!("Connection dropped before opening"),
        Err(_) => bail!("Timed out after {:?} waiting for the connection", OPEN_TIMEOUT),
    }
}
