//! HTTP transport and graceful shutdown.
//!
//! The server owns the socket side: it accepts connections, lets hyper parse
//! HTTP/1.1 or HTTP/2, collects each body into text, and hands a [`Request`]
//! to [`App::handle`]. Handlers are synchronous, so each dispatch runs on the
//! blocking pool and never stalls the accept loop.
//!
//! On **SIGTERM** or Ctrl-C the server:
//! 1. Immediately stops `listener.accept()`, so no new connections are made.
//! 2. Lets every in-flight connection task run to completion.
//! 3. Returns from [`Server::serve`].

use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::app::App;
use crate::config::Config;
use crate::error::Error;
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;

/// The HTTP server.
pub struct Server {
    addr: String,
    debug: bool,
}

impl Server {
    /// Configures the server to bind to `addr` (`host:port`, names are
    /// resolved) when [`serve`](Server::serve) is called.
    ///
    /// ```rust,no_run
    /// use tessera::Server;
    /// let server = Server::bind("0.0.0.0:3000");
    /// ```
    pub fn bind(addr: impl Into<String>) -> Self {
        Self { addr: addr.into(), debug: false }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::bind(config.addr()).debug(config.debug)
    }

    /// Log one `info` line per request.
    pub fn debug(mut self, on: bool) -> Self {
        self.debug = on;
        self
    }

    /// Binds, then serves `app` until SIGTERM or Ctrl-C and every in-flight
    /// request has completed.
    pub async fn serve(self, app: App) -> Result<(), Error> {
        let listener = TcpListener::bind(&self.addr).await?;
        self.serve_with_shutdown(listener, app, shutdown_signal()).await
    }

    /// Serves `app` on an already-bound `listener` until `signal` resolves,
    /// then drains in-flight connections.
    pub async fn serve_with_shutdown(
        self,
        listener: TcpListener,
        app: App,
        signal: impl Future<Output = ()>,
    ) -> Result<(), Error> {
        // Routes are frozen from here on; every connection shares them.
        let app = Arc::new(app);
        let log_requests = self.debug;

        let addr = listener.local_addr()?;
        info!(%addr, routes = app.routes().len(), log_requests, "tessera listening");

        let mut tasks = tokio::task::JoinSet::new();
        tokio::pin!(signal);

        loop {
            tokio::select! {
                // Check shutdown first so a signal stops accepting at once,
                // even with connections queued.
                biased;

                () = &mut signal => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let app = Arc::clone(&app);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // Called once per request on the connection.
                        let svc = service_fn(move |req| dispatch(Arc::clone(&app), req, log_requests));

                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the set stays small.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("tessera stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Converts one hyper request into a [`Request`], routes it, and converts the
/// answer back. Every failure becomes a response, so hyper never sees an error.
async fn dispatch(
    app: Arc<App>,
    req: hyper::Request<Incoming>,
    log_requests: bool,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let Ok(method) = req.method().as_str().parse::<Method>() else {
        warn!(method = %req.method(), "unsupported method");
        let resp = Response::with_status(StatusCode::METHOD_NOT_ALLOWED, "<h1>405 Method Not Allowed</h1>");
        return Ok(resp.into_http());
    };

    let target = req
        .uri()
        .path_and_query()
        .map_or_else(|| req.uri().path().to_owned(), |pq| pq.as_str().to_owned());
    let headers = req
        .headers()
        .iter()
        .map(|(k, v)| (k.as_str().to_owned(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
        .collect();

    let body = match req.into_body().collect().await {
        Ok(collected) => String::from_utf8_lossy(&collected.to_bytes()).into_owned(),
        Err(e) => {
            warn!("failed to read request body: {e}");
            let resp = Response::with_status(StatusCode::BAD_REQUEST, "<h1>400 Bad Request</h1>");
            return Ok(resp.into_http());
        }
    };

    let request = Request::new(method, target, headers, body);
    let path = request.path().to_owned();

    let response = tokio::task::spawn_blocking(move || app.handle(&request))
        .await
        .unwrap_or_else(|e| {
            error!(%method, path = %path, "dispatch task failed: {e}");
            Response::with_status(StatusCode::INTERNAL_SERVER_ERROR, "<h1>500 Internal Server Error</h1>")
        });

    if log_requests {
        info!(%method, path = %path, status = response.status().as_u16(), "request");
    }

    Ok(response.into_http())
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first SIGTERM or SIGINT (Ctrl-C). On Windows only Ctrl-C
/// is available. If a handler cannot be installed, that signal is ignored.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
