//! Error types for the HTTP server.

use thiserror::Error;

use crate::parser::Error as ParserError;

/// Errors that can occur during HTTP server operation.
#[derive(Debug, Error)]
pub enum Error {
    /// Error parsing an HTTP request.
    #[error("Parse error: {0}")]
    ParseError(#[from] ParserError),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// No route matches the request path.
    #[error("No route for path: {0}")]
    RouteNotFound(String),

    /// A handler gave up for a reason of its own.
    #[error("Handler failed: {0}")]
    HandlerFailure(String),

    /// A handler tried to reply twice on the same connection.
    #[error("A response was already sent on this connection")]
    AlreadyResponded,

    /// The client did not deliver its request head in time.
    #[error("Connection timed out waiting for the request")]
    ConnectionTimeout,

    /// The listening socket failed; the server cannot continue.
    #[error("Listener failed: {0}")]
    ListenerFatal(#[source] std::io::Error),

    /// The server configuration is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
