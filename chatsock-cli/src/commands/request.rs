// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Request Command

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::{wait_for_open, CliConfig};
use crate::display;

pub async fn run(
    config: &CliConfig,
    verb: &str,
    path: &str,
    body_path: Option<&Path>,
    headers: Vec<String>,
) -> Result<()> {
    let body = body_path
        .map(|p| fs::read(p).with_context(|| format!("Cannot read {:?}", p)))
        .transpose()?;

    let conn = config.connection()?;
    let mut events = conn.on_open();

    info!(host = %config.credentials.host, "Connecting");
    conn.listen();
    wait_for_open(&mut events).await?;

    debug!(verb, path, "Sending request");
    let result = conn.request(verb, path, body, headers).await;
    conn.stop();
    let response = result?;

    display::success(&format!("#{} {} {}", response.id, response.status, response.message));
    for header in &response.headers {
        println!("  {}", header);
    }
    if let Some(body) = &response.body {
        println!("{}", String::from_utf8_lossy(body));
    }

    Ok(())
}
