//! The request value handed to handlers.

use std::path::Path;

use serde::Serialize;

use crate::parser::{Headers, Method, RequestHead};
use crate::server::error::Error;
use crate::server::handler::RouteOptions;
use crate::server::response::{Reply, ResponseWriter};

/// A parsed request together with the means to answer it.
///
/// Lives only while its handler runs; the connection it writes to stays
/// owned by the server loop.
pub struct Request<'c> {
    head: RequestHead,
    options: &'c RouteOptions,
    writer: ResponseWriter<'c>,
}

impl<'c> Request<'c> {
    /// Bind a parsed head to the route options and connection writer.
    pub fn new(head: RequestHead, options: &'c RouteOptions, writer: ResponseWriter<'c>) -> Self {
        Self {
            head,
            options,
            writer,
        }
    }

    /// The HTTP method.
    pub fn method(&self) -> &Method {
        &self.head.method
    }

    /// The request target as received, including any query string.
    pub fn path(&self) -> &str {
        &self.head.path
    }

    /// The request target without its query string.
    pub fn route_path(&self) -> &str {
        self.head.route_path()
    }

    /// The protocol version token from the request line.
    pub fn protocol_version(&self) -> &str {
        &self.head.version
    }

    /// All request headers.
    pub fn headers(&self) -> &Headers {
        &self.head.headers
    }

    /// Get a header value, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.headers.get(name)
    }

    /// Get a header value as the exact bytes received.
    pub fn header_bytes(&self, name: &str) -> Option<Vec<u8>> {
        self.head.headers.get_bytes(name)
    }

    /// The raw query string, if any.
    pub fn query(&self) -> Option<&str> {
        self.head.query()
    }

    /// Get a query parameter value.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.head.query_param(name)
    }

    /// Get an option registered with the matched route.
    pub fn option(&self, key: &str) -> Option<&serde_json::Value> {
        self.options.get(key)
    }

    /// The parsed request head.
    pub fn head(&self) -> &RequestHead {
        &self.head
    }

    /// Whether a reply has been started on this connection.
    pub fn has_responded(&self) -> bool {
        self.writer.has_started()
    }

    /// Send a `200` reply with the default content type.
    pub async fn send(&mut self, body: impl AsRef<[u8]>) -> Result<(), Error> {
        self.send_reply(&Reply::default(), body).await
    }

    /// Send a reply with an explicit status, content type and headers.
    pub async fn send_reply(&mut self, reply: &Reply, body: impl AsRef<[u8]>) -> Result<(), Error> {
        self.writer
            .send_text(&self.head.version, reply, body.as_ref())
            .await
    }

    /// Stream a file as a `200` reply, `chunk_size` bytes at a time.
    pub async fn send_file(&mut self, path: impl AsRef<Path>, chunk_size: usize) -> Result<u64, Error> {
        self.send_file_reply(&Reply::default(), path, chunk_size).await
    }

    /// Stream a file with an explicit status, content type and headers.
    pub async fn send_file_reply(
        &mut self,
        reply: &Reply,
        path: impl AsRef<Path>,
        chunk_size: usize,
    ) -> Result<u64, Error> {
        self.writer
            .send_file(&self.head.version, reply, path.as_ref(), chunk_size)
            .await
    }

    /// Serialize `value` and send it as `application/json`.
    pub async fn send_json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        let body = serde_json::to_vec(value)?;
        let reply = Reply::default().with_content_type("application/json");
        self.send_reply(&reply, body).await
    }
}
