//! Response rendering onto an open connection.

use std::borrow::Cow;
use std::io;
use std::path::Path;
use std::time::Duration;

use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

use crate::server::error::Error;
use crate::server::status::StatusCode;

/// Content type used when a reply does not name one.
pub const DEFAULT_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// The reply sent for unroutable, unparsable or failed requests.
pub const NOT_FOUND_REPLY: &[u8] = b"HTTP/1.0 404 NA\r\n\r\n";

/// Extra headers written after `Content-Type`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResponseHeaders {
    /// No extra headers.
    #[default]
    None,
    /// A pre-rendered header block, written verbatim.
    Raw(Vec<u8>),
    /// Name/value pairs, written in order.
    Pairs(Vec<(String, String)>),
}

impl ResponseHeaders {
    /// Append the header block and the blank line that ends the head.
    fn render(&self, out: &mut Vec<u8>) {
        match self {
            ResponseHeaders::None => {}
            ResponseHeaders::Raw(block) => {
                out.extend_from_slice(block);
                if !block.is_empty() && !block.ends_with(b"\r\n") {
                    out.extend_from_slice(b"\r\n");
                }
            }
            ResponseHeaders::Pairs(pairs) => {
                for (name, value) in pairs {
                    push_header_line(out, name, value);
                }
            }
        }
        out.extend_from_slice(b"\r\n");
    }
}

impl From<&str> for ResponseHeaders {
    fn from(block: &str) -> Self {
        ResponseHeaders::Raw(block.as_bytes().to_vec())
    }
}

impl From<String> for ResponseHeaders {
    fn from(block: String) -> Self {
        ResponseHeaders::Raw(block.into_bytes())
    }
}

impl From<Vec<u8>> for ResponseHeaders {
    fn from(block: Vec<u8>) -> Self {
        ResponseHeaders::Raw(block)
    }
}

impl<K: Into<String>, V: Into<String>> From<Vec<(K, V)>> for ResponseHeaders {
    fn from(pairs: Vec<(K, V)>) -> Self {
        ResponseHeaders::Pairs(
            pairs
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for ResponseHeaders {
    fn from(pairs: [(K, V); N]) -> Self {
        ResponseHeaders::from(Vec::from(pairs))
    }
}

/// Status, content type and headers of a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// The HTTP status code
    pub status: StatusCode,
    /// The `Content-Type` header value
    pub content_type: String,
    /// Headers written after `Content-Type`
    pub headers: ResponseHeaders,
}

impl Default for Reply {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            headers: ResponseHeaders::None,
        }
    }
}

impl Reply {
    /// A `200` reply with the default content type and no extra headers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the status code.
    pub fn with_status(mut self, status: impl Into<StatusCode>) -> Self {
        self.status = status.into();
        self
    }

    /// Set the content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Replace the extra headers.
    pub fn with_headers(mut self, headers: impl Into<ResponseHeaders>) -> Self {
        self.headers = headers.into();
        self
    }

    /// Append one header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let (name, value) = (name.into(), value.into());
        match &mut self.headers {
            ResponseHeaders::None => self.headers = ResponseHeaders::Pairs(vec![(name, value)]),
            ResponseHeaders::Pairs(pairs) => pairs.push((name, value)),
            ResponseHeaders::Raw(block) => {
                if !block.is_empty() && !block.ends_with(b"\r\n") {
                    block.extend_from_slice(b"\r\n");
                }
                push_header_line(block, &name, &value);
            }
        }
        self
    }

    /// Render the status line, `Content-Type`, headers and blank line.
    pub fn render_head(&self, version: &str) -> Vec<u8> {
        let mut head = format!(
            "{version} {code} {reason}\r\n",
            code = self.status.as_u16(),
            reason = self.status.reason_phrase(),
        )
        .into_bytes();
        push_header_line(&mut head, "Content-Type", &self.content_type);
        self.headers.render(&mut head);
        head
    }
}

/// Append `name: value\r\n`. Line breaks inside either part are dropped so
/// one header can never turn into several.
fn push_header_line(out: &mut Vec<u8>, name: &str, value: &str) {
    out.extend_from_slice(single_line(name).as_bytes());
    out.extend_from_slice(b": ");
    out.extend_from_slice(single_line(value).as_bytes());
    out.extend_from_slice(b"\r\n");
}

fn single_line(text: &str) -> Cow<'_, str> {
    if text.contains(['\r', '\n']) {
        Cow::Owned(text.replace(['\r', '\n'], ""))
    } else {
        Cow::Borrowed(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteState {
    Idle,
    Started,
    Finished,
}

/// Writes the single reply of one connection.
pub struct ResponseWriter<'c> {
    conn: &'c mut (dyn AsyncWrite + Unpin),
    write_timeout: Duration,
    state: WriteState,
}

impl<'c> ResponseWriter<'c> {
    /// Wrap a connection. Each write is abandoned after `write_timeout`.
    pub fn new(conn: &'c mut (dyn AsyncWrite + Unpin), write_timeout: Duration) -> Self {
        Self {
            conn,
            write_timeout,
            state: WriteState::Idle,
        }
    }

    /// Whether any part of a reply may already be on the wire.
    pub fn has_started(&self) -> bool {
        self.state != WriteState::Idle
    }

    /// Send a reply whose body is held in memory.
    ///
    /// The head goes out in one write and the body in another.
    pub async fn send_text(&mut self, version: &str, reply: &Reply, body: &[u8]) -> Result<(), Error> {
        self.ensure_idle()?;
        self.state = WriteState::Started;

        self.write(&reply.render_head(version)).await?;
        if !body.is_empty() {
            self.write(body).await?;
        }
        self.finish().await
    }

    /// Send a reply whose body is streamed from a file, `chunk_size` bytes per write.
    ///
    /// The file is opened before anything is written, so a missing file
    /// leaves the connection untouched. Returns the number of body bytes sent.
    pub async fn send_file(
        &mut self,
        version: &str,
        reply: &Reply,
        path: &Path,
        chunk_size: usize,
    ) -> Result<u64, Error> {
        if chunk_size == 0 {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "chunk size must be >= 1").into());
        }
        self.ensure_idle()?;

        let mut file = File::open(path).await?;
        self.state = WriteState::Started;
        self.write(&reply.render_head(version)).await?;

        let mut chunk = vec![0u8; chunk_size];
        let mut sent = 0u64;
        loop {
            let n = fill_chunk(&mut file, &mut chunk).await?;
            if n == 0 {
                break;
            }
            self.write(&chunk[..n]).await?;
            sent += n as u64;
        }

        self.finish().await?;
        Ok(sent)
    }

    fn ensure_idle(&self) -> Result<(), Error> {
        match self.state {
            WriteState::Idle => Ok(()),
            _ => Err(Error::AlreadyResponded),
        }
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<(), Error> {
        match timeout(self.write_timeout, self.conn.write_all(bytes)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(io::Error::new(io::ErrorKind::TimedOut, "write to client timed out").into()),
        }
    }

    async fn finish(&mut self) -> Result<(), Error> {
        match timeout(self.write_timeout, self.conn.flush()).await {
            Ok(result) => result?,
            Err(_) => return Err(io::Error::new(io::ErrorKind::TimedOut, "flush to client timed out").into()),
        }
        self.state = WriteState::Finished;
        Ok(())
    }
}

/// Read until `chunk` is full or the reader is exhausted.
async fn fill_chunk<R>(reader: &mut R, chunk: &mut [u8]) -> io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    let mut filled = 0;
    while filled < chunk.len() {
        let n = reader.read(&mut chunk[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
