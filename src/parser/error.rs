//! Error types for the request-head parser.

use thiserror::Error;

/// Errors that can occur while reading a request line and its headers.
#[derive(Debug, Error)]
pub enum Error {
    /// The connection closed before a request line arrived.
    #[error("Empty request")]
    EmptyRequest,

    /// The request line did not split into method, path and protocol version.
    #[error("Malformed request line: {0}")]
    MalformedRequestLine(String),

    /// A header line had no `:` separator.
    #[error("Invalid header line: {0}")]
    InvalidHeaderFormat(String),

    /// The request line contained bytes that are not valid UTF-8.
    #[error("Request line is not valid UTF-8")]
    InvalidEncoding,

    /// The request line plus headers exceeded the configured bound.
    #[error("Request head exceeds {limit} bytes")]
    HeadersTooLarge {
        /// The configured bound in bytes.
        limit: usize,
    },

    /// Reading from the connection failed.
    #[error("I/O error while reading request: {0}")]
    Io(#[from] std::io::Error),
}
