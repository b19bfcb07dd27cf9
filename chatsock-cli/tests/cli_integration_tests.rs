// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI Integration Tests
//!
//! Exercise argument handling and failure reporting without a chat server.

use std::fs;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Helper to run CLI commands with a clean environment
struct CliTestContext {
    dir: TempDir,
}

impl CliTestContext {
    fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Run a CLI command and return the output
    fn run(&self, args: &[&str]) -> Output {
        self.run_with_log(args, "off")
    }

    /// Run a CLI command with the given `RUST_LOG` filter
    fn run_with_log(&self, args: &[&str], filter: &str) -> Output {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_chatsock"));
        cmd.env_remove("CHATSOCK_HOST")
            .env_remove("CHATSOCK_USERNAME")
            .env_remove("CHATSOCK_PASSWORD")
            .env("RUST_LOG", filter);

        for arg in args {
            cmd.arg(arg);
        }

        cmd.output().expect("Failed to execute command")
    }

    /// Run a command and assert success
    fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        assert!(
            output.status.success(),
            "Command {:?} failed.\nStdout: {}\nStderr: {}",
            args,
            stdout,
            stderr
        );
        stdout
    }

    /// Run a command and assert failure
    fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args);
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        assert!(
            !output.status.success(),
            "Command {:?} should have failed",
            args
        );
        stderr
    }

    /// Write a file into the test directory and return its path
    fn write(&self, name: &str, contents: &str) -> String {
        let path = self.dir.path().join(name);
        fs::write(&path, contents).expect("Failed to write file");
        path.to_string_lossy().to_string()
    }
}

#[test]
fn test_help_lists_commands() {
    let ctx = CliTestContext::new();
    let stdout = ctx.run_success(&["--help"]);

    assert!(stdout.contains("listen"));
    assert!(stdout.contains("send"));
    assert!(stdout.contains("request"));
}

#[test]
fn test_completions() {
    let ctx = CliTestContext::new();
    let stdout = ctx.run_success(&["completions", "bash"]);

    assert!(stdout.contains("chatsock"));
}

#[test]
fn test_listen_without_host_fails() {
    let ctx = CliTestContext::new();
    let stderr = ctx.run_failure(&["listen"]);

    assert!(stderr.contains("No host configured"), "stderr: {}", stderr);
}

#[test]
fn test_send_missing_body_file_fails() {
    let ctx = CliTestContext::new();
    let missing = ctx.dir.path().join("missing.json");
    let stderr = ctx.run_failure(&[
        "--host",
        "chat.example.com",
        "send",
        "--body",
        missing.to_str().unwrap(),
    ]);

    assert!(stderr.contains("Cannot read"), "stderr: {}", stderr);
}

#[test]
fn test_send_body_without_destination_fails() {
    let ctx = CliTestContext::new();
    let body = ctx.write("body.json", r#"{"messages":[]}"#);
    let stderr = ctx.run_failure(&["--host", "chat.example.com", "send", "--body", &body]);

    assert!(stderr.contains("no destination"), "stderr: {}", stderr);
}

#[test]
fn test_send_invalid_json_fails() {
    let ctx = CliTestContext::new();
    let body = ctx.write("body.json", "not json");
    let stderr = ctx.run_failure(&["--host", "chat.example.com", "send", "--body", &body]);

    assert!(stderr.contains("Invalid message body"), "stderr: {}", stderr);
}

#[test]
fn test_listen_logs_connection_attempt() {
    let ctx = CliTestContext::new();
    // Nothing listens on the discard port.
    let output = ctx.run_with_log(&["--host", "127.0.0.1:9", "listen"], "chatsock_cli=info");
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    assert!(!output.status.success());
    assert!(stderr.contains("Connecting"), "stderr: {}", stderr);
    assert!(stderr.contains("127.0.0.1:9"), "stderr: {}", stderr);
}
