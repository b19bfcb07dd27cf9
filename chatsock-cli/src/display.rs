// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Display Helpers

use chatsock_core::network::{Frame, InboundMessage};
use console::style;

pub fn success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

pub fn info(msg: &str) {
    println!("{} {}", style("→").cyan(), msg);
}

pub fn warning(msg: &str) {
    eprintln!("{} {}", style("!").yellow().bold(), msg);
}

/// Prints one inbound message on a single header line plus its body.
pub fn message(message: &InboundMessage) {
    let header = match &message.frame {
        Frame::Request(r) => format!("#{} {} {}", r.id, r.verb, r.path),
        Frame::Response(r) => format!("#{} {} {}", r.id, r.status, r.message),
    };
    println!("{}", style(header).bold());

    if let Some(body) = &message.body {
        println!("  {}", body);
    }

    match &message.signal_message {
        Some(Ok(envelope)) => println!(
            "  chat from {} (device {}) at {}",
            envelope.source.as_deref().unwrap_or("unknown"),
            envelope.source_device.unwrap_or_default(),
            envelope.timestamp.unwrap_or_default()
        ),
        Some(Err(e)) => println!("  {} {}", style("encrypted chat payload:").dim(), e),
        None => {}
    }
}
