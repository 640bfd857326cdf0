//! # tessera
//!
//! A minimal request router and text-template engine for serving dynamic
//! text over HTTP.
//!
//! ## The pieces
//!
//! - **Routing**: route paths with `<name>` placeholders, tried in
//!   registration order. The first route whose method set and pattern both
//!   accept the request wins.
//! - **Templates**: `{{ var }}`, `{% if var %}…{% endif %}` and
//!   `{% for x in list %}…{% endfor %}`, rendered in three fixed passes.
//! - **Dispatch**: text from a handler becomes a `200` HTML page, an `Err` or
//!   a panic becomes a `500`, and an unmatched path becomes a `404`.
//! - **Transport**: hyper over tokio, with graceful shutdown.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use tessera::{App, Context, Params, Request, Server, Templates};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), tessera::Error> {
//!     let templates = Templates::from_dir("templates");
//!
//!     let app = App::new()
//!         .get("/", |_: &Request, _: &Params| "<h1>home</h1>")?
//!         .get("/user/<username>", move |_: &Request, p: &Params| {
//!             let ctx = Context::new().with("username", p.get("username").unwrap_or_default());
//!             templates.render("user.html", &ctx)
//!         })?
//!         .error_handler(404, || "<h1>Page Not Found</h1>".to_owned());
//!
//!     Server::bind("127.0.0.1:5000").serve(app).await
//! }
//! ```

mod app;
mod config;
mod error;
mod handler;
mod loader;
mod method;
mod pattern;
mod request;
mod response;
mod router;
mod server;

pub mod template;

pub use app::App;
pub use config::Config;
pub use error::{Error, PatternError};
pub use handler::{Handler, HandlerError, HandlerOutput};
pub use http::StatusCode;
pub use loader::{DirSource, MemorySource, TemplateError, TemplateSource, Templates};
pub use method::{Method, MethodSet, UnknownMethod};
pub use pattern::{Params, RoutePattern, Segment};
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::{Route, RouteTable};
pub use server::Server;
pub use template::{render, Context, Scalar, Value};
