//! Error types for Courier.
//!
//! One enum per concern. Missing credentials are deliberately not a
//! configuration error: the server starts without them and reports the
//! failure on the call that needed them.

/// Configuration-related errors (startup only).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors raised by the outbound messaging channels.
///
/// Nothing here escapes a tool call: the adapter layer converts every
/// variant into a failure reply carrying the error text.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("{channel} credentials not found in environment")]
    MissingCredentials { channel: String },

    #[error("Invalid {channel} request: {reason}")]
    InvalidRequest { channel: String, reason: String },

    #[error("{channel} API returned {status}: {body}")]
    Api {
        channel: String,
        status: u16,
        body: String,
    },

    #[error("{channel} request failed: {reason}")]
    Network { channel: String, reason: String },

    #[error("Invalid address: {0}")]
    Address(String),

    #[error("SMTP failure: {0}")]
    Smtp(String),
}

/// Errors from the email body generator.
///
/// Kept separate from [`TransportError`] so callers can tell "send failed"
/// apart from "draft failed" — a draft failure means nothing was sent.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("Generator API key not found in environment")]
    MissingCredentials,

    #[error("Completion request failed: {0}")]
    RequestFailed(String),

    #[error("Completion API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Completion response contained no text")]
    EmptyCompletion,
}
