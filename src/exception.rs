//! # Exception Mapping
//!
//! Failures that happen after an operation was selected: argument binding errors, handler
//! errors and panics, and handlers that were never registered or have gone away.
//!
//! Mappers are consulted in registration order and the first one returning `Some` decides
//! the response. When none answers, [`default_response`] applies: binding value errors
//! caused by the request become `400`, a missing handler `501`, everything else `500`.
//! Default failure responses carry no payload.
//!
//! ```rust
//! use restwire::exception::{DispatchFailure, ExceptionMapper};
//! use restwire::server::Response;
//! use http::StatusCode;
//!
//! struct Teapot;
//!
//! impl ExceptionMapper for Teapot {
//!     fn to_response(&self, failure: &DispatchFailure) -> Option<Response> {
//!         matches!(failure, DispatchFailure::Handler(_))
//!             .then(|| Response::status_only(StatusCode::IM_A_TEAPOT))
//!     }
//! }
//! ```

use crate::binder::BindError;
use crate::handler::HandlerRef;
use crate::server::Response;
use http::StatusCode;
use std::fmt;

/// Why a selected operation did not produce a result.
#[derive(Debug)]
pub enum DispatchFailure {
    /// Arguments could not be bound.
    Binding(BindError),
    /// The handler returned an error.
    Handler(anyhow::Error),
    /// The handler panicked; carries the panic message.
    HandlerPanicked(String),
    /// No handler is registered under the operation's name.
    HandlerMissing(HandlerRef),
    /// The handler's coroutine is gone or could not be reached.
    HandlerUnavailable(HandlerRef),
}

impl DispatchFailure {
    /// `true` when the request, not the server, is at fault.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, DispatchFailure::Binding(e) if e.is_client_error())
    }
}

impl fmt::Display for DispatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchFailure::Binding(e) => write!(f, "argument binding failed: {e}"),
            DispatchFailure::Handler(e) => write!(f, "handler failed: {e:#}"),
            DispatchFailure::HandlerPanicked(msg) => write!(f, "handler panicked: {msg}"),
            DispatchFailure::HandlerMissing(h) => write!(f, "no handler registered for {h}"),
            DispatchFailure::HandlerUnavailable(h) => write!(f, "handler {h} is not responding"),
        }
    }
}

impl std::error::Error for DispatchFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DispatchFailure::Binding(e) => Some(e),
            DispatchFailure::Handler(e) => Some(&**e),
            _ => None,
        }
    }
}

impl From<BindError> for DispatchFailure {
    fn from(e: BindError) -> Self {
        DispatchFailure::Binding(e)
    }
}

/// Turns a [`DispatchFailure`] into a response.
pub trait ExceptionMapper: Send + Sync {
    /// `None` passes the failure on to the next mapper.
    fn to_response(&self, failure: &DispatchFailure) -> Option<Response>;
}

impl<F> ExceptionMapper for F
where
    F: Fn(&DispatchFailure) -> Option<Response> + Send + Sync,
{
    fn to_response(&self, failure: &DispatchFailure) -> Option<Response> {
        self(failure)
    }
}

/// Status used when no mapper answers.
#[must_use]
pub fn default_status(failure: &DispatchFailure) -> StatusCode {
    match failure {
        f if f.is_client_error() => StatusCode::BAD_REQUEST,
        DispatchFailure::HandlerMissing(_) => StatusCode::NOT_IMPLEMENTED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[must_use]
pub fn default_response(failure: &DispatchFailure) -> Response {
    Response::status_only(default_status(failure))
}

/// First answer of `mappers`, or the default response.
#[must_use]
pub fn map_failure(mappers: &[Box<dyn ExceptionMapper>], failure: &DispatchFailure) -> Response {
    mappers
        .iter()
        .find_map(|mapper| mapper.to_response(failure))
        .unwrap_or_else(|| default_response(failure))
}
