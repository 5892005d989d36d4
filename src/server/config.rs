//! Server configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::server::error::Error;

/// HTTP server configuration.
///
/// Durations deserialize from `{ "secs": .., "nanos": .. }`, serde's
/// standard representation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// The host name or address to bind to.
    pub host: String,
    /// The port to bind to. `0` picks a free port.
    pub port: u16,
    /// The listen backlog.
    pub backlog: u32,
    /// How long a client may take to deliver its request line and headers.
    pub connection_timeout: Duration,
    /// Upper bound on each write to a client.
    pub write_timeout: Duration,
    /// Upper bound on the request line plus headers, in bytes.
    pub max_header_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 80,
            backlog: 5,
            connection_timeout: Duration::from_secs(5),
            write_timeout: Duration::from_secs(5),
            max_header_bytes: 8192,
        }
    }
}

impl ServerConfig {
    /// Set the bind address.
    pub fn with_addr(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    /// Set the listen backlog.
    pub fn with_backlog(mut self, backlog: u32) -> Self {
        self.backlog = backlog;
        self
    }

    /// Set the per-connection request timeout.
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Set the per-write timeout.
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Set the request head size bound.
    pub fn with_max_header_bytes(mut self, max: usize) -> Self {
        self.max_header_bytes = max;
        self
    }

    /// Reject settings the server cannot run with.
    pub fn validate(&self) -> Result<(), Error> {
        if self.backlog == 0 {
            return Err(Error::InvalidConfig("backlog must be >= 1".to_string()));
        }
        if self.connection_timeout.is_zero() {
            return Err(Error::InvalidConfig("connection timeout must be > 0".to_string()));
        }
        if self.write_timeout.is_zero() {
            return Err(Error::InvalidConfig("write timeout must be > 0".to_string()));
        }
        if self.max_header_bytes == 0 {
            return Err(Error::InvalidConfig("max header bytes must be >= 1".to_string()));
        }
        Ok(())
    }
}
