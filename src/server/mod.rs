//! HTTP server implementation for featherweb.
//!
//! One listening socket, an exact-path router and a reply helper, driven by
//! a loop that serves a single connection at a time.

mod config;
mod error;
mod handler;
mod http_server;
mod listener;
mod request;
mod response;
mod router;
mod status;

// Re-export public items
pub use config::ServerConfig;
pub use error::Error;
pub use handler::{HandlerFn, HandlerFuture, Route, RouteOptions};
pub use http_server::{Flow, HttpServer, Outcome, ShutdownHandle};
pub use listener::Listener;
pub use request::Request;
pub use response::{Reply, ResponseHeaders, ResponseWriter, DEFAULT_CONTENT_TYPE, NOT_FOUND_REPLY};
pub use router::Router;
pub use status::{reason_phrase, StatusCode};
