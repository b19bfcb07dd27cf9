// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Proptest Strategies
//!
//! Reusable proptest strategies for property-based testing.
//! Import these in property test files to avoid duplication.

use chatsock_core::network::{Frame, Request, Response};
use proptest::prelude::*;

// ============================================================
// Field Strategies
// ============================================================

/// Strategy for request verbs (ASCII letters).
pub fn verb_strategy() -> impl Strategy<Value = String> {
    "(GET|PUT|POST|DELETE|[A-Z]{1,7})"
}

/// Strategy for absolute request paths without whitespace.
pub fn path_strategy() -> impl Strategy<Value = String> {
    "/[a-z0-9/_.-]{0,40}"
}

/// Strategy for single-line header values.
pub fn header_strategy() -> impl Strategy<Value = String> {
    ("[a-z-]{1,16}", "[ -~]{0,32}").prop_map(|(name, value)| format!("{}:{}", name, value))
}

/// Strategy for optional bodies, including empty ones.
pub fn body_strategy() -> impl Strategy<Value = Option<Vec<u8>>> {
    prop::option::of(prop::collection::vec(any::<u8>(), 0..256))
}

// ============================================================
// Frame Strategies
// ============================================================

/// Strategy for requests that satisfy the default wire schema.
pub fn request_strategy() -> impl Strategy<Value = Request> {
    (
        any::<u64>(),
        verb_strategy(),
        path_strategy(),
        body_strategy(),
        prop::collection::vec(header_strategy(), 0..4),
    )
        .prop_map(|(id, verb, path, body, headers)| Request {
            id,
            verb,
            path,
            body,
            headers,
        })
}

/// Strategy for responses that satisfy the default wire schema.
pub fn response_strategy() -> impl Strategy<Value = Response> {
    (
        any::<u64>(),
        100u32..=599,
        "[A-Za-z ]{0,20}",
        body_strategy(),
        prop::collection::vec(header_strategy(), 0..4),
    )
        .prop_map(|(id, status, message, body, headers)| Response {
            id,
            status,
            message,
            body,
            headers,
        })
}

/// Strategy for valid frames of either kind.
pub fn frame_strategy() -> impl Strategy<Value = Frame> {
    prop_oneof![
        request_strategy().prop_map(Frame::Request),
        response_strategy().prop_map(Frame::Response),
    ]
}
