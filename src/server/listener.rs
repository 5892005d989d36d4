//! The source of incoming connections.

use std::future::Future;
use std::io;
use std::net::SocketAddr;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};

/// Something the server loop can accept connections from.
///
/// Implemented for [`TcpListener`]; [`HttpServer::bind`](crate::HttpServer::bind)
/// uses that. Other sources can be served through
/// [`HttpServer::from_listener`](crate::HttpServer::from_listener).
pub trait Listener {
    /// The connection type produced by `accept`.
    type Stream: AsyncRead + AsyncWrite + Unpin;

    /// Wait for the next connection.
    fn accept(&self) -> impl Future<Output = io::Result<(Self::Stream, SocketAddr)>>;

    /// The address the listener is bound to.
    fn local_addr(&self) -> io::Result<SocketAddr>;
}

impl Listener for TcpListener {
    type Stream = TcpStream;

    async fn accept(&self) -> io::Result<(TcpStream, SocketAddr)> {
        TcpListener::accept(self).await
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        TcpListener::local_addr(self)
    }
}

/// Whether an `accept` error concerns only the connection being accepted
/// (or a passing shortage of descriptors or memory), leaving the listening
/// socket usable.
pub(crate) fn is_transient_accept_error(e: &io::Error) -> bool {
    use io::ErrorKind::*;

    matches!(
        e.kind(),
        ConnectionAborted | ConnectionReset | ConnectionRefused | Interrupted | WouldBlock | TimedOut
            | OutOfMemory
    ) || is_descriptor_shortage(e)
}

#[cfg(unix)]
fn is_descriptor_shortage(e: &io::Error) -> bool {
    // ENFILE and EMFILE share these values on Linux and the BSDs.
    const ENFILE: i32 = 23;
    const EMFILE: i32 = 24;
    matches!(e.raw_os_error(), Some(ENFILE | EMFILE))
}

#[cfg(not(unix))]
fn is_descriptor_shortage(_e: &io::Error) -> bool {
    false
}
