//! Request handlers and routes.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::server::error::Error;
use crate::server::request::Request;

/// Type alias for a boxed future returned by a handler, borrowing the request.
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<(), Error>> + 'a>>;

/// Type alias for a handler function that replies through the request it is given.
pub type HandlerFn = Box<dyn for<'a, 'c> Fn(&'a mut Request<'c>) -> HandlerFuture<'a>>;

/// Free-form per-route settings, readable by the handler.
pub type RouteOptions = HashMap<String, serde_json::Value>;

/// Represents a route in the HTTP server.
pub struct Route {
    /// The literal path to match.
    pub pattern: String,
    /// The handler function.
    pub handler: HandlerFn,
    /// Settings handed to the handler.
    pub options: RouteOptions,
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
