//! Handler trait and type erasure.
//!
//! # How handlers are stored
//!
//! The route table holds handlers of *different* closure types in one `Vec`,
//! so each is hidden behind a trait object:
//!
//! ```text
//! fn user(req: &Request, p: &Params) -> String { … }   ← user writes this
//!        ↓ app.get("/user/<name>", user)
//! user.into_boxed_handler()                            ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(user))                            ← heap-allocated wrapper
//!        ↓  stored as BoxedHandler = Arc<dyn ErasedHandler>
//! handler.call(&req, &params) at request time          ← one vtable dispatch
//!        ↓
//! user(&req, &params).into_outcome()                   ← Result<Response, HandlerError>
//! ```
//!
//! Handlers are synchronous. Failing is either returning `Err` or
//! panicking; both surface as a [`HandlerError`] and never reach the transport.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use http::StatusCode;

use crate::pattern::Params;
use crate::request::Request;
use crate::response::{IntoResponse, Response};

// ── HandlerError ──────────────────────────────────────────────────────────────

/// A failure raised by application handler code.
#[derive(Clone, Debug, thiserror::Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "handler panicked".to_owned());
        Self { message }
    }
}

// ── HandlerOutput ─────────────────────────────────────────────────────────────

/// What a handler may return: anything [`IntoResponse`], or a `Result` of it
/// whose error is displayable.
pub trait HandlerOutput {
    fn into_outcome(self) -> Result<Response, HandlerError>;
}

impl HandlerOutput for Response {
    fn into_outcome(self) -> Result<Response, HandlerError> { Ok(self) }
}

impl HandlerOutput for String {
    fn into_outcome(self) -> Result<Response, HandlerError> { Ok(self.into_response()) }
}

impl HandlerOutput for &'static str {
    fn into_outcome(self) -> Result<Response, HandlerError> { Ok(self.into_response()) }
}

impl HandlerOutput for StatusCode {
    fn into_outcome(self) -> Result<Response, HandlerError> { Ok(self.into_response()) }
}

impl<T, E> HandlerOutput for Result<T, E>
where
    T: IntoResponse,
    E: fmt::Display,
{
    fn into_outcome(self) -> Result<Response, HandlerError> {
        self.map(IntoResponse::into_response)
            .map_err(|e| HandlerError::new(e.to_string()))
    }
}

// ── Erased handler ────────────────────────────────────────────────────────────

/// Internal dispatch interface.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: &Request, params: &Params) -> Result<Response, HandlerError>;
}

/// A type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// Implemented for every valid route handler.
///
/// You never implement this yourself. It is satisfied by any function or
/// closure with the signature:
///
/// ```text
/// fn name(req: &Request, params: &Params) -> impl HandlerOutput
/// ```
///
/// The trait is **sealed**: only the blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, R> private::Sealed for F
where
    F: Fn(&Request, &Params) -> R + Send + Sync + 'static,
    R: HandlerOutput,
{
}

impl<F, R> Handler for F
where
    F: Fn(&Request, &Params) -> R + Send + Sync + 'static,
    R: HandlerOutput,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

/// Newtype holding a concrete handler `F`, bridging to the trait object.
struct FnHandler<F>(F);

impl<F, R> ErasedHandler for FnHandler<F>
where
    F: Fn(&Request, &Params) -> R + Send + Sync,
    R: HandlerOutput,
{
    fn call(&self, req: &Request, params: &Params) -> Result<Response, HandlerError> {
        panic::catch_unwind(AssertUnwindSafe(|| (self.0)(req, params).into_outcome()))
            .unwrap_or_else(|payload| Err(HandlerError::from_panic(payload)))
    }
}

// ── Error handlers ────────────────────────────────────────────────────────────

/// A status-code error handler: no arguments, returns the page body.
pub(crate) type ErrorHandler = Arc<dyn Fn() -> String + Send + Sync + 'static>;

/// Runs an error handler, recovering a panic as a [`HandlerError`].
pub(crate) fn call_error_handler(handler: &ErrorHandler) -> Result<String, HandlerError> {
    panic::catch_unwind(AssertUnwindSafe(|| (**handler)())).map_err(HandlerError::from_panic)
}
