// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Listen Command
//!
//! Prints inbound messages until interrupted or the server closes.

use anyhow::Result;
use chatsock_core::network::ConnectionEvent;
use tracing::info;

use crate::config::{wait_for_open, CliConfig};
use crate::display;

pub async fn run(config: &CliConfig) -> Result<()> {
    let conn = config.connection()?;
    let mut events = conn.on_open();
    let mut messages = conn.on_message();

    info!(host = %config.credentials.host, "Connecting");
    conn.listen();
    wait_for_open(&mut events).await?;
    display::success(&format!("Connected to {}", config.credentials.host));
    display::info("Press Ctrl-C to stop");

    loop {
        tokio::select! {
            Some(message) = messages.recv() => display::message(&message),
            event = events.recv() => {
                if let Some(ConnectionEvent::Closed { reason }) = event {
                    info!(reason = ?reason, "Server closed the session");
                    display::warning(&format!(
                        "Connection closed: {}",
                        reason.as_deref().unwrap_or("no reason given")
                    ));
                }
                break;
            }
            _ = tokio::signal::ctrl_c() => {
                conn.stop();
                info!("Interrupted; session stopped");
                display::info("Stopped");
                break;
            }
        }
    }

    Ok(())
}
