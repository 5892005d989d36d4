//! Exact-match routing.

use log::debug;

use crate::server::error::Error;
use crate::server::handler::Route;

/// Routes in registration order.
#[derive(Debug, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Create an empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route. Duplicate patterns are kept; only the first is reachable.
    pub fn register(&mut self, route: Route) {
        debug!("Registered route {}", route.pattern);
        self.routes.push(route);
    }

    /// Find the first route whose pattern equals `path` minus any `?query`.
    pub fn find(&self, path: &str) -> Option<&Route> {
        let path = path.split_once('?').map_or(path, |(path, _)| path);
        self.routes.iter().find(|route| route.pattern == path)
    }

    /// Like [`Router::find`], but a miss is an [`Error::RouteNotFound`].
    pub fn lookup(&self, path: &str) -> Result<&Route, Error> {
        self.find(path)
            .ok_or_else(|| Error::RouteNotFound(path.to_string()))
    }

    /// Iterate over the routes in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    /// Number of registered routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether no routes are registered.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
