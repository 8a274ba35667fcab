//! Error types for the RecomPI API client.
//!
//! # Design
//! Two families of failure exist: local errors raised before any I/O
//! (`InvalidField`, `Serialization`) and service errors raised once a request
//! has been dispatched (`Transport`, `Http`, `MalformedResponse`, `Service`).
//! `Service` gets a dedicated variant because callers frequently distinguish
//! "the service refused the call" from "the response could not be read." All
//! other non-2xx responses land in `Http` with the raw status code and body
//! for debugging.

use std::fmt;

/// Errors returned by `RecomClient` build/parse methods and the `RecomPi`
/// facade.
#[derive(Debug)]
pub enum RecomError {
    /// A required field was missing, empty, or of the wrong shape. Raised
    /// synchronously, before any network I/O is attempted.
    InvalidField {
        op: &'static str,
        field: String,
        reason: String,
    },

    /// The request payload could not be serialized to JSON.
    Serialization(String),

    /// The HTTP layer failed before a response could be read.
    Transport(String),

    /// The server returned a non-2xx status.
    Http { status: u16, body: String },

    /// The response body was not the expected JSON envelope.
    MalformedResponse(String),

    /// The service answered but reported `success: false`.
    Service { message: String },
}

impl RecomError {
    pub(crate) fn invalid_field(
        op: &'static str,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        RecomError::InvalidField {
            op,
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for RecomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecomError::InvalidField { op, field, reason } => {
                write!(f, "in `{op}`: invalid `{field}`: {reason}")
            }
            RecomError::Serialization(msg) => {
                write!(f, "serialization failed: {msg}")
            }
            RecomError::Transport(msg) => {
                write!(f, "transport failed: {msg}")
            }
            RecomError::Http { status, body } => {
                write!(f, "HTTP {status}: {body}")
            }
            RecomError::MalformedResponse(msg) => {
                write!(f, "malformed response: {msg}")
            }
            RecomError::Service { message } => {
                write!(f, "service reported failure: {message}")
            }
        }
    }
}

impl std::error::Error for RecomError {}
