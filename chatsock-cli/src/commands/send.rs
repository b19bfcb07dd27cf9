// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Send Command
//!
//! Sends a chat message and waits for the server's response to it.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chatsock_core::network::{Frame, SignalMessageBody};
use tracing::{debug, info};

use crate::config::{wait_for_open, CliConfig};
use crate::display;

/// Reads a message body from a JSON file.
pub fn load_body(path: &Path) -> Result<SignalMessageBody> {
    let raw = fs::read_to_string(path).with_context(|| format!("Cannot read {:?}", path))?;
    let body: SignalMessageBody =
        serde_json::from_str(&raw).with_context(|| format!("Invalid message body in {:?}", path))?;
    if body.destination().is_none() {
        bail!("Message body in {:?} has no destination", path);
    }
    Ok(body)
}

pub async fn run(config: &CliConfig, body_path: &Path) -> Result<()> {
    let body = load_body(body_path)?;

    let conn = config.connection()?;
    let mut events = conn.on_open();
    let mut messages = conn.on_message();

    info!(host = %config.credentials.host, "Connecting");
    conn.listen();
    wait_for_open(&mut events).await?;

    let id = conn.send_signal_message(&body)?;
    debug!(id, "Waiting for the server's response");
    display::info(&format!(
        "Sent message #{} to {}",
        id,
        body.destination().unwrap_or_default()
    ));

    let timeout = config.connection.request_timeout;
    let reply = tokio::time::timeout(timeout, async {
        while let Some(message) = messages.recv().await {
            if let Frame::Response(response) = &message.frame {
                if response.id == id {
                    return Some(response.clone());
                }
            }
        }
        None
    })
    .await;
    conn.stop();

    match reply {
        Ok(Some(response)) if (200..300).contains(&response.status) => {
            display::success(&format!("Delivered ({} {})", response.status, response.message));
            Ok(())
        }
        Ok(Some(response)) => bail!("Server rejected message: {} {}", response.status, response.message),
        Ok(None) => bail!("Connection closed before the server answered"),
        Err(_) => bail!("No response within {:?}", timeout),
    }
}
