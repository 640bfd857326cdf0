//! Outgoing HTTP response type and the [`IntoResponse`] conversion trait.
//!
//! Build a [`Response`] in your handler and return it, or return plain text
//! and let the dispatcher wrap it as a `200 OK` HTML page.

use bytes::Bytes;
use http::StatusCode;
use http_body_util::Full;

const HTML: &str = "text/html; charset=utf-8";
const JSON: &str = "application/json";
const TEXT: &str = "text/plain; charset=utf-8";

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response: text body, status code, headers.
///
/// # Shortcuts (200 OK)
///
/// ```rust
/// use tessera::Response;
///
/// Response::html("<h1>hi</h1>");
/// Response::text("hello");
/// Response::json(r#"{"id":1}"#);
/// ```
///
/// # Builder (custom status or headers)
///
/// ```rust
/// use tessera::{Response, StatusCode};
///
/// Response::builder()
///     .status(StatusCode::CREATED)
///     .header("location", "/users/42")
///     .json(r#"{"id":42}"#);
/// ```
#[derive(Clone, Debug)]
pub struct Response {
    body: String,
    headers: Vec<(String, String)>,
    status: StatusCode,
}

impl Response {
    /// `200 OK` with the default `text/html; charset=utf-8` content type.
    pub fn html(body: impl Into<String>) -> Self {
        Self::builder().html(body)
    }

    /// `200 OK`, `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::builder().text(body)
    }

    /// `200 OK`, `application/json`. The body is sent as given.
    pub fn json(body: impl Into<String>) -> Self {
        Self::builder().json(body)
    }

    /// An HTML response with a non-200 status.
    pub fn with_status(status: StatusCode, body: impl Into<String>) -> Self {
        Self::builder().status(status).html(body)
    }

    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: Vec::new(), status: StatusCode::OK }
    }

    pub fn status(&self) -> StatusCode { self.status }
    pub fn body(&self) -> &str { &self.body }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Converts into the `http` type hyper serializes. Headers that are not
    /// valid HTTP are dropped with a warning.
    pub(crate) fn into_http(self) -> http::Response<Full<Bytes>> {
        let mut builder = http::Response::builder().status(self.status);
        for (name, value) in &self.headers {
            match (
                http::HeaderName::from_bytes(name.as_bytes()),
                http::HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => builder = builder.header(name, value),
                _ => tracing::warn!(header = %name, "dropping invalid response header"),
            }
        }
        let body = Full::new(Bytes::from(self.body));
        builder.body(body).unwrap_or_else(|e| {
            tracing::error!("failed to build response: {e}");
            let mut resp = http::Response::new(Full::new(Bytes::new()));
            *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            resp
        })
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to `200 OK`.
/// Terminated by a typed body method.
pub struct ResponseBuilder {
    headers: Vec<(String, String)>,
    status: StatusCode,
}

impl ResponseBuilder {
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code;
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn html(self, body: impl Into<String>) -> Response {
        self.finish(HTML, body.into())
    }

    pub fn text(self, body: impl Into<String>) -> Response {
        self.finish(TEXT, body.into())
    }

    pub fn json(self, body: impl Into<String>) -> Response {
        self.finish(JSON, body.into())
    }

    /// Terminate with an explicit content type.
    pub fn body(self, content_type: &str, body: impl Into<String>) -> Response {
        self.finish(content_type, body.into())
    }

    /// Terminate with no body and no content type (e.g. `204 No Content`).
    pub fn no_body(self) -> Response {
        Response { body: String::new(), headers: self.headers, status: self.status }
    }

    fn finish(self, content_type: &str, body: String) -> Response {
        let mut headers = vec![("content-type".to_owned(), content_type.to_owned())];
        headers.extend(self.headers);
        Response { body, headers, status: self.status }
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into an HTTP [`Response`].
///
/// Text becomes a `200 OK` HTML response; a bare [`StatusCode`] becomes a
/// bodiless response with that status.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response { Response::html(self) }
}

impl IntoResponse for String {
    fn into_response(self) -> Response { Response::html(self) }
}

/// Return a status directly from a handler: `return StatusCode::NO_CONTENT`
impl IntoResponse for StatusCode {
    fn into_response(self) -> Response { Response::builder().status(self).no_body() }
}
