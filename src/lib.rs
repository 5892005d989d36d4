//! A minimal HTTP server for memory-constrained hosts.
//!
//! featherweb binds a single listening socket, routes requests by exact path
//! and serves exactly one connection at a time. While idle it calls back into
//! the application at a fixed interval, which is where housekeeping such as
//! garbage collection or sensor polling belongs.
//!
//! # Features
//!
//! - Bounded request-head parsing (request line plus headers)
//! - Exact-match routing on the path without its query string
//! - Text, JSON and chunked file replies
//! - Periodic idle callback with a typed context
//! - Per-connection and per-write timeouts
//!
//! # Examples
//!
//! ```no_run
//! use std::time::Duration;
//! use featherweb::{HttpServer, ServerConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), featherweb::ServerError> {
//!     let mut server = HttpServer::bind(ServerConfig::default().with_addr("0.0.0.0", 8080)).await?;
//!
//!     server.route("/hello", |req| Box::pin(async move { req.send("Jello!").await }));
//!
//!     // Keep serving until the idle callback returns false.
//!     server
//!         .run_with_idle(Duration::from_secs(5), 0u32, |idle_polls| {
//!             *idle_polls += 1;
//!             *idle_polls < 100
//!         })
//!         .await
//! }
//! ```
//!
//! Failed, unparsable and unroutable requests all receive the same body-less
//! `404`; the cause is reported through the `log` facade.

// Export the parser module
pub mod parser;

// Export the server module
pub mod server;

// Re-export commonly used items for convenience
pub use parser::{Error as ParserError, Headers, Method, RequestHead};
pub use server::{
    Error as ServerError, Flow, HttpServer, Listener, Outcome, Reply, Request, ResponseHeaders, ServerConfig,
    ShutdownHandle, StatusCode,
};
