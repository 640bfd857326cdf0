//! Ordered route table.
//!
//! Routes are tried in registration order and the first one whose method set
//! and pattern both accept the request wins. `/user/<id>` registered before
//! `/user/new` therefore shadows it. That ordering is part of the contract.

use std::fmt;

use tracing::debug;

use crate::error::Error;
use crate::handler::{BoxedHandler, Handler};
use crate::method::{Method, MethodSet};
use crate::pattern::{Params, RoutePattern};

/// A (pattern, methods, handler) triple. Immutable once registered.
pub struct Route {
    pattern: RoutePattern,
    methods: MethodSet,
    handler: BoxedHandler,
}

impl Route {
    pub fn pattern(&self) -> &RoutePattern { &self.pattern }
    pub fn methods(&self) -> MethodSet { self.methods }
    pub(crate) fn handler(&self) -> &BoxedHandler { &self.handler }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern.as_str())
            .field("methods", &self.methods)
            .finish_non_exhaustive()
    }
}

/// Routes in match-priority order. Append-only.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Compiles `path` and appends a route for it.
    ///
    /// Fails if the path is malformed or `methods` is empty; the table is
    /// left unchanged in that case.
    pub fn register(
        &mut self,
        path: &str,
        methods: impl Into<MethodSet>,
        handler: impl Handler,
    ) -> Result<(), Error> {
        let methods = methods.into();
        if methods.is_empty() {
            return Err(Error::NoMethods { path: path.to_owned() });
        }
        let pattern = RoutePattern::compile(path)?;
        debug!(route = %pattern, %methods, "registered route");
        self.routes.push(Route { pattern, methods, handler: handler.into_boxed_handler() });
        Ok(())
    }

    /// Returns the first route accepting `method` on `path`, with its captures.
    ///
    /// A route whose pattern matches but whose methods do not is skipped, not
    /// treated as a final answer.
    pub fn lookup(&self, method: Method, path: &str) -> Option<(&Route, Params)> {
        self.routes
            .iter()
            .filter(|route| route.methods.contains(method))
            .find_map(|route| route.pattern.matches(path).map(|params| (route, params)))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
