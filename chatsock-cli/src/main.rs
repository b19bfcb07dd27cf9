// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Chatsock CLI
//!
//! Command-line interface for Chatsock - chat transport over the binary
//! WebSocket sub-protocol.

mod commands;
mod config;
mod display;

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};

use config::CliConfig;

#[derive(Parser)]
#[command(name = "chatsock")]
#[command(version, about = "Chat transport over the WebSocket sub-protocol")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Chat server host (a scheme prefix is ignored)
    #[arg(long, global = true, env = "CHATSOCK_HOST", default_value = "")]
    host: String,

    /// Account login
    #[arg(long, global = true, env = "CHATSOCK_USERNAME", default_value = "")]
    username: String,

    /// Account password
    #[arg(
        long,
        global = true,
        env = "CHATSOCK_PASSWORD",
        default_value = "",
        hide_env_values = true
    )]
    password: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect and print inbound messages until interrupted
    Listen,

    /// Send a chat message described by a JSON file
    Send {
        /// JSON message body (messages, timestamp, online)
        #[arg(long)]
        body: PathBuf,
    },

    /// Send a request and print the matching response
    Request {
        /// Request verb (GET, PUT, ...)
        verb: String,

        /// Request path
        path: String,

        /// File whose contents become the request body
        #[arg(long)]
        body: Option<PathBuf>,

        /// Header line, may be repeated
        #[arg(long = "header")]
        headers: Vec<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chatsock_cli=info".parse()?)
                .add_directive("chatsock_core=info".parse()?),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let config = CliConfig::new(&cli.host, &cli.username, &cli.password);

    match cli.command {
        Commands::Listen => commands::listen::run(&config).await?,
        Commands::Send { body } => commands::send::run(&config, &body).await?,
        Commands::Request {
            verb,
            path,
            body,
            headers,
        } => {
            commands::request::run(&config, &verb, &path, body.as_deref(), headers).await?;
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "chatsock", &mut io::stdout());
        }
    }

    Ok(())
}
