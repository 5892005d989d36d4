//! HTTP request-head parser.
//!
//! Turns the bytes at the front of a connection into a [`RequestHead`]:
//! the request line and the header lines up to the blank line.

mod error;
mod headers;
mod method;
mod request;

// Re-export public items
pub use error::Error;
pub use headers::Headers;
pub use method::Method;
pub use request::{parse_header_line, parse_request_line, read_request_head, RequestHead};
