//! HTTP server implementation.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{lookup_host, TcpListener, TcpSocket};
use tokio::signal;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::parser::{read_request_head, Error as ParserError};
use crate::server::config::ServerConfig;
use crate::server::error::Error;
use crate::server::handler::{HandlerFuture, Route, RouteOptions};
use crate::server::listener::{is_transient_accept_error, Listener};
use crate::server::request::Request;
use crate::server::response::{ResponseWriter, NOT_FOUND_REPLY};
use crate::server::router::Router;

/// What the idle callback asks the loop to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep polling.
    Continue,
    /// Leave the loop and close the listener.
    Stop,
}

impl From<bool> for Flow {
    fn from(keep_running: bool) -> Self {
        if keep_running {
            Flow::Continue
        } else {
            Flow::Stop
        }
    }
}

impl From<()> for Flow {
    fn from(_: ()) -> Self {
        Flow::Continue
    }
}

/// How one connection ended.
#[derive(Debug)]
pub enum Outcome {
    /// The handler returned normally.
    Handled {
        /// Whether the handler wrote a reply.
        responded: bool,
    },
    /// No route matched the request path.
    NotFound(String),
    /// The request head could not be parsed.
    ParseError(ParserError),
    /// The handler returned an error.
    HandlerFailure {
        /// What went wrong.
        error: Error,
        /// Whether part of a reply had already been written.
        responded: bool,
    },
    /// The client did not send its request head in time.
    Timeout,
}

impl Outcome {
    /// Whether the client should receive the fixed 404 reply.
    ///
    /// A failure after the handler began writing gets no reply appended.
    pub fn replies_not_found(&self) -> bool {
        match self {
            Outcome::NotFound(_) | Outcome::ParseError(_) => true,
            Outcome::HandlerFailure { responded, .. } => !responded,
            Outcome::Handled { .. } | Outcome::Timeout => false,
        }
    }

    /// The failure behind this outcome, if any.
    pub fn into_error(self) -> Option<Error> {
        match self {
            Outcome::Handled { .. } => None,
            Outcome::NotFound(path) => Some(Error::RouteNotFound(path)),
            Outcome::ParseError(e) => Some(Error::ParseError(e)),
            Outcome::HandlerFailure { error, .. } => Some(error),
            Outcome::Timeout => Some(Error::ConnectionTimeout),
        }
    }
}

/// Requests an orderly stop of a running server.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    /// Ask the server to stop. A connection being served is finished first.
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }

    /// Whether a stop has been requested.
    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }

    /// Stop the server when Ctrl+C is received.
    pub fn stop_on_ctrl_c(&self) -> JoinHandle<()> {
        let handle = self.clone();
        tokio::spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received Ctrl+C, initiating graceful shutdown");
                    handle.stop();
                }
                Err(e) => {
                    error!("Error setting up Ctrl+C handler: {e}");
                }
            }
        })
    }
}

/// Pause after a failed accept before polling again.
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// An HTTP server that serves one connection at a time.
pub struct HttpServer<L = TcpListener> {
    config: ServerConfig,
    listener: L,
    router: Router,
    shutdown_tx: Arc<watch::Sender<bool>>,
}

impl HttpServer<TcpListener> {
    /// Bind and listen according to `config`. Connections are not accepted until [`HttpServer::run`].
    pub async fn bind(config: ServerConfig) -> Result<Self, Error> {
        config.validate()?;

        let addr = lookup_host((config.host.as_str(), config.port))
            .await?
            .next()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::AddrNotAvailable,
                    format!("{} did not resolve to an address", config.host),
                )
            })?;

        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;
        let listener = socket.listen(config.backlog)?;
        info!("Server listening on http://{addr}", addr = listener.local_addr()?);

        Self::from_listener(config, listener)
    }
}

impl<L: Listener> HttpServer<L> {
    /// Serve connections from an already listening source.
    pub fn from_listener(config: ServerConfig, listener: L) -> Result<Self, Error> {
        config.validate()?;

        let (shutdown_tx, _) = watch::channel(false);
        Ok(Self {
            config,
            listener,
            router: Router::new(),
            shutdown_tx: Arc::new(shutdown_tx),
        })
    }

    /// Add a route to the server.
    ///
    /// ```no_run
    /// # async fn demo(server: &mut featherweb::HttpServer) {
    /// server.route("/hello", |req| Box::pin(async move { req.send("Jello!").await }));
    /// # }
    /// ```
    pub fn route<F>(&mut self, pattern: impl Into<String>, handler: F) -> &mut Self
    where
        F: for<'a, 'c> Fn(&'a mut Request<'c>) -> HandlerFuture<'a> + 'static,
    {
        self.route_with_options(pattern, RouteOptions::new(), handler)
    }

    /// Add a route whose handler can read `options` through [`Request::option`].
    pub fn route_with_options<F>(
        &mut self,
        pattern: impl Into<String>,
        options: RouteOptions,
        handler: F,
    ) -> &mut Self
    where
        F: for<'a, 'c> Fn(&'a mut Request<'c>) -> HandlerFuture<'a> + 'static,
    {
        self.router.register(Route {
            pattern: pattern.into(),
            handler: Box::new(handler),
            options,
        });
        self
    }

    /// The server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The registered routes.
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// The address the listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        Ok(self.listener.local_addr()?)
    }

    /// A handle that can stop the server from elsewhere.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: Arc::clone(&self.shutdown_tx),
        }
    }

    /// Serve until stopped, waiting at most `poll_timeout` per accept.
    pub async fn run(self, poll_timeout: Duration) -> Result<(), Error> {
        self.serve_forever(poll_timeout, None::<fn() -> Flow>).await
    }

    /// Serve until stopped, calling `callback` with `context` each time
    /// `poll_timeout` passes without a connection.
    ///
    /// The callback may return `bool` (`false` stops) or `()`.
    pub async fn run_with_idle<C, F, R>(
        self,
        poll_timeout: Duration,
        mut context: C,
        mut callback: F,
    ) -> Result<(), Error>
    where
        F: FnMut(&mut C) -> R,
        R: Into<Flow>,
    {
        let on_idle = move || -> Flow { callback(&mut context).into() };
        self.serve_forever(poll_timeout, Some(on_idle)).await
    }

    fn display_server_info(&self) {
        info!("Registered endpoints:");
        for route in self.router.routes() {
            info!("  {}", route.pattern);
        }
    }

    async fn serve_forever<F>(self, poll_timeout: Duration, mut on_idle: Option<F>) -> Result<(), Error>
    where
        F: FnMut() -> Flow,
    {
        self.display_server_info();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        let result = loop {
            if *shutdown_rx.borrow_and_update() {
                info!("Shutting down server...");
                break Ok(());
            }

            let accepted = tokio::select! {
                biased;

                // Wakes the poll wait; the flag is re-checked at the top.
                _ = shutdown_rx.changed() => continue,

                accepted = timeout(poll_timeout, self.listener.accept()) => accepted,
            };

            match accepted {
                Err(_) => {
                    if let Some(on_idle) = on_idle.as_mut() {
                        if on_idle() == Flow::Stop {
                            info!("Idle callback requested shutdown");
                            break Ok(());
                        }
                    }
                }
                Ok(Err(e)) if is_transient_accept_error(&e) => {
                    warn!("Error accepting connection, retrying: {e}");
                    tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                }
                Ok(Err(e)) => {
                    error!("Listener failed, shutting down: {e}");
                    break Err(Error::ListenerFatal(e));
                }
                Ok(Ok((mut stream, peer))) => {
                    self.serve_connection(&mut stream, peer).await;
                }
            }
        };

        drop(self);
        info!("Listener closed");
        result
    }

    /// Serve one connection end to end and close it.
    pub async fn serve_connection<S>(&self, stream: &mut S, peer: SocketAddr) -> Outcome
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        debug!("Accepted connection from {peer}");
        let outcome = self.handle_connection(stream).await;

        match &outcome {
            Outcome::Handled { responded: true } => debug!("{peer}: handled"),
            Outcome::Handled { responded: false } => {
                warn!("{peer}: handler returned without sending a response")
            }
            Outcome::NotFound(path) => info!("{peer}: no route for {path}"),
            Outcome::ParseError(e) => warn!("{peer}: bad request: {e}"),
            Outcome::HandlerFailure { error, responded } => {
                error!("{peer}: handler failed (response started: {responded}): {error}")
            }
            Outcome::Timeout => info!("{peer}: timed out waiting for request, closing"),
        }

        if outcome.replies_not_found() {
            match timeout(self.config.write_timeout, stream.write_all(NOT_FOUND_REPLY)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => debug!("{peer}: could not send 404: {e}"),
                Err(_) => debug!("{peer}: timed out sending 404"),
            }
        }
        match timeout(self.config.write_timeout, stream.shutdown()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!("{peer}: error closing connection: {e}"),
            Err(_) => debug!("{peer}: timed out closing connection"),
        }

        outcome
    }

    /// Parse, route and dispatch one request. Writes nothing on failure.
    pub async fn handle_connection<S>(&self, stream: &mut S) -> Outcome
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut reader = BufReader::new(stream);

        let head = match timeout(
            self.config.connection_timeout,
            read_request_head(&mut reader, self.config.max_header_bytes),
        )
        .await
        {
            Err(_) => return Outcome::Timeout,
            Ok(Err(e)) => return Outcome::ParseError(e),
            Ok(Ok(head)) => head,
        };

        let Some(route) = self.router.find(&head.path) else {
            return Outcome::NotFound(head.path);
        };
        debug!("{} {} -> {}", head.method, head.path, route.pattern);

        let writer = ResponseWriter::new(&mut reader, self.config.write_timeout);
        let mut request = Request::new(head, &route.options, writer);
        let result = (route.handler)(&mut request).await;
        let responded = request.has_responded();

        match result {
            Ok(()) => Outcome::Handled { responded },
            Err(error) => Outcome::HandlerFailure { error, responded },
        }
    }
}
