//! Request line and header parsing.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::parser::error::Error;
use crate::parser::headers::Headers;
use crate::parser::method::Method;

/// The parsed head of an HTTP request: request line plus headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The request target exactly as received, query string included
    pub path: String,
    /// The protocol version token, e.g. `HTTP/1.1`
    pub version: String,
    /// The request headers
    pub headers: Headers,
}

impl RequestHead {
    /// The path without any `?query` suffix. This is what routes match against.
    pub fn route_path(&self) -> &str {
        match self.path.split_once('?') {
            Some((path, _)) => path,
            None => &self.path,
        }
    }

    /// The raw query string following `?`, if any.
    pub fn query(&self) -> Option<&str> {
        self.path.split_once('?').map(|(_, query)| query)
    }

    /// Look up a query parameter. Values are returned as sent, without percent-decoding.
    ///
    /// A key without `=` yields an empty value.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query()?
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }
}

/// Split a request line into method, path and protocol version.
///
/// The line must contain exactly three whitespace-separated tokens.
pub fn parse_request_line(line: &str) -> Result<(Method, String, String), Error> {
    let mut parts = line.split_whitespace();
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(method), Some(path), Some(version), None) => Ok((
            Method::from_token(method),
            path.to_string(),
            version.to_string(),
        )),
        _ => Err(Error::MalformedRequestLine(
            line.trim_end_matches(['\r', '\n']).to_string(),
        )),
    }
}

/// Split a header line at its first colon.
///
/// The name is returned untouched; the value has surrounding whitespace removed.
pub fn parse_header_line(line: &str) -> Result<(&str, &str), Error> {
    let line = line.trim_end_matches(['\r', '\n']);
    line.split_once(':')
        .map(|(name, value)| (name, value.trim()))
        .ok_or_else(|| Error::InvalidHeaderFormat(line.to_string()))
}

/// Read a request head from a buffered connection.
///
/// Reads the request line, then header lines until a blank line or end of
/// stream. A client that closes the connection without sending the blank
/// line still produces a complete head. At most `max_bytes` bytes are
/// consumed in total; a longer head fails with [`Error::HeadersTooLarge`]
/// without buffering the excess.
pub async fn read_request_head<R>(reader: &mut R, max_bytes: usize) -> Result<RequestHead, Error>
where
    R: AsyncBufRead + Unpin,
{
    let mut remaining = max_bytes;
    let mut line = Vec::with_capacity(128);

    if read_bounded_line(reader, &mut line, &mut remaining, max_bytes).await? == 0 {
        return Err(Error::EmptyRequest);
    }
    let (method, path, version) = parse_request_line(as_text(&line)?)?;

    let mut headers = Headers::new();
    loop {
        line.clear();
        if read_bounded_line(reader, &mut line, &mut remaining, max_bytes).await? == 0 {
            break;
        }
        if line == b"\r\n" || line == b"\n" {
            break;
        }
        let text = latin1(&line);
        let (name, value) = parse_header_line(&text)?;
        headers.insert(name, value);
    }

    Ok(RequestHead {
        method,
        path,
        version,
        headers,
    })
}

/// Read one `\n`-terminated line, charging its length against `remaining`.
async fn read_bounded_line<R>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    remaining: &mut usize,
    limit: usize,
) -> Result<usize, Error>
where
    R: AsyncBufRead + Unpin,
{
    // One byte past the budget is enough to tell "fits" from "too long".
    let cap = (*remaining as u64).saturating_add(1);
    let n = (&mut *reader).take(cap).read_until(b'\n', buf).await?;
    if n > *remaining {
        return Err(Error::HeadersTooLarge { limit });
    }
    *remaining -= n;
    Ok(n)
}

fn as_text(line: &[u8]) -> Result<&str, Error> {
    std::str::from_utf8(line).map_err(|_| Error::InvalidEncoding)
}

// Header bytes map one-to-one onto U+0000..U+00FF, so any value is accepted
// and `Headers::get_bytes` can restore it exactly.
fn latin1(line: &[u8]) -> String {
    line.iter().copied().map(char::from).collect()
}
