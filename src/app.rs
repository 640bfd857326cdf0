//! The application: a route table plus error handlers, and the dispatcher
//! that turns one [`Request`] into one [`Response`].

use std::collections::HashMap;
use std::sync::Arc;

use http::StatusCode;
use tracing::{debug, error};

use crate::error::Error;
use crate::handler::{call_error_handler, ErrorHandler, Handler};
use crate::method::{Method, MethodSet};
use crate::request::Request;
use crate::response::Response;
use crate::router::RouteTable;

/// Routes and error handlers, built once at startup.
///
/// Registration chains by value and stops at the first malformed route:
///
/// ```rust
/// use tessera::{App, Method, Params, Request};
///
/// # fn main() -> Result<(), tessera::Error> {
/// let app = App::new()
///     .get("/", |_: &Request, _: &Params| "home")?
///     .route("/user/<name>", [Method::Get, Method::Post], |_: &Request, p: &Params| {
///         format!("user {}", p.get("name").unwrap_or_default())
///     })?
///     .error_handler(404, || "<h1>Nothing here</h1>".to_owned());
///
/// let resp = app.handle(&Request::get("/user/ana?tab=posts"));
/// assert_eq!(resp.body(), "user ana");
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct App {
    routes: RouteTable,
    error_handlers: HashMap<u16, ErrorHandler>,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a `GET` route.
    pub fn get(self, path: &str, handler: impl Handler) -> Result<Self, Error> {
        self.route(path, Method::Get, handler)
    }

    /// Registers a route for a single method.
    pub fn on(self, method: Method, path: &str, handler: impl Handler) -> Result<Self, Error> {
        self.route(path, method, handler)
    }

    /// Registers a route for a set of methods.
    pub fn route(
        mut self,
        path: &str,
        methods: impl Into<MethodSet>,
        handler: impl Handler,
    ) -> Result<Self, Error> {
        self.routes.register(path, methods, handler)?;
        Ok(self)
    }

    /// Registers the page body produced for `status`. Only `404` is invoked
    /// automatically.
    pub fn error_handler<F>(mut self, status: u16, handler: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.error_handlers.insert(status, Arc::new(handler));
        self
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Dispatches one request. Never fails: a missing route becomes a `404`,
    /// a failing handler a `500`.
    pub fn handle(&self, req: &Request) -> Response {
        let path = req.path();

        let Some((route, params)) = self.routes.lookup(req.method(), path) else {
            debug!(method = %req.method(), path, "no route matched");
            return self.not_found(path);
        };

        debug!(method = %req.method(), path, route = %route.pattern(), "route matched");
        match route.handler().call(req, &params) {
            Ok(resp) => resp,
            Err(err) => {
                error!(method = %req.method(), path, "handler failed: {err}");
                Response::with_status(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("<h1>500 Internal Server Error</h1><p>{err}</p>"),
                )
            }
        }
    }

    fn not_found(&self, path: &str) -> Response {
        let custom = self.error_handlers.get(&404).and_then(|handler| {
            call_error_handler(handler)
                .inspect_err(|err| error!(path, "404 handler failed: {err}"))
                .ok()
        });
        let body = custom.unwrap_or_else(|| {
            format!("<h1>404 Not Found</h1><p>The requested URL {path} was not found.</p>")
        });
        Response::with_status(StatusCode::NOT_FOUND, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Params;

    #[test]
    fn text_result_is_wrapped_as_html_200() {
        let app = App::new().get("/", |_: &Request, _: &Params| "home").unwrap();
        let resp = app.handle(&Request::get("/"));
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.body(), "home");
        assert_eq!(resp.header("content-type"), Some("text/html; charset=utf-8"));
    }

    #[test]
    fn structured_response_passes_through() {
        let app = App::new()
            .on(Method::Post, "/items", |_: &Request, _: &Params| {
                Response::builder().status(StatusCode::CREATED).header("location", "/items/1").json("{}")
            })
            .unwrap();
        let resp = app.handle(&Request::new(Method::Post, "/items", Vec::new(), "{}"));
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(resp.header("location"), Some("/items/1"));
        assert_eq!(resp.header("content-type"), Some("application/json"));
    }

    #[test]
    fn query_string_is_ignored_for_matching() {
        let app = App::new()
            .get("/search", |req: &Request, _: &Params| {
                format!("q={}", req.arg("q").unwrap_or("-"))
            })
            .unwrap();
        assert_eq!(app.handle(&Request::get("/search?q=rust")).body(), "q=rust");
    }

    #[test]
    fn default_not_found_mentions_path() {
        let app = App::new();
        let resp = app.handle(&Request::get("/missing/page?x=1"));
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(resp.body().contains("/missing/page"));
        assert!(!resp.body().contains("x=1"));
    }

    #[test]
    fn custom_not_found_body() {
        let app = App::new().error_handler(404, || "custom".to_owned());
        let resp = app.handle(&Request::get("/nope"));
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(resp.body(), "custom");
    }

    #[test]
    fn panicking_404_handler_falls_back_to_default_body() {
        let app = App::new().error_handler(404, || panic!("bad 404 page"));
        let resp = app.handle(&Request::get("/nope"));
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(resp.body().contains("/nope"));
    }

    #[test]
    fn other_error_handlers_are_not_invoked_automatically() {
        let app = App::new()
            .get("/fail", |_: &Request, _: &Params| -> Result<String, String> {
                Err("kaput".into())
            })
            .unwrap()
            .error_handler(500, || "custom 500".to_owned());
        let resp = app.handle(&Request::get("/fail"));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(resp.body().contains("kaput"));
        assert!(!resp.body().contains("custom 500"));
    }

    #[test]
    fn wrong_method_is_not_found() {
        let app = App::new().get("/x", |_: &Request, _: &Params| "x").unwrap();
        let resp = app.handle(&Request::new(Method::Delete, "/x", Vec::new(), ""));
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn bad_route_aborts_registration() {
        let result = App::new()
            .get("/ok", |_: &Request, _: &Params| "ok")
            .and_then(|app| app.get("/bad/<", |_: &Request, _: &Params| "bad"));
        assert!(matches!(result, Err(Error::Pattern(_))));
    }
}
