//! Incoming HTTP request type.

use crate::method::Method;

/// An incoming HTTP request, as handed over by the transport.
///
/// Query parameters are parsed once at construction and are read-only.
#[derive(Clone, Debug)]
pub struct Request {
    method: Method,
    target: String,
    headers: Vec<(String, String)>,
    body: String,
    query: Vec<(String, String)>,
}

impl Request {
    /// Builds a request from its parts. `target` is the raw path with an
    /// optional `?query` suffix.
    pub fn new(
        method: Method,
        target: impl Into<String>,
        headers: Vec<(String, String)>,
        body: impl Into<String>,
    ) -> Self {
        let target = target.into();
        let query = match target.split_once('?') {
            Some((_, qs)) => url::form_urlencoded::parse(qs.as_bytes()).into_owned().collect(),
            None => Vec::new(),
        };
        Self { method, target, headers, body: body.into(), query }
    }

    /// Shorthand for a bodiless request without headers.
    pub fn get(target: impl Into<String>) -> Self {
        Self::new(Method::Get, target, Vec::new(), String::new())
    }

    pub fn method(&self) -> Method { self.method }
    pub fn target(&self) -> &str { &self.target }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &str { &self.body }

    /// The path component of the target, with any query string removed.
    pub fn path(&self) -> &str {
        self.target.split_once('?').map_or(self.target.as_str(), |(path, _)| path)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// First value of a query parameter, percent-decoded.
    ///
    /// For `/search?q=rust&q=web`, `req.arg("q")` returns `Some("rust")`.
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.query.iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Every value of a query parameter, in order of appearance.
    pub fn args<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.query.iter()
            .filter(move |(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}
