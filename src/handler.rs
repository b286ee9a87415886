//! # Handler Seam
//!
//! The callable side of an operation. A descriptor names its handler by [`HandlerRef`];
//! the dispatcher resolves that name against handlers registered with
//! [`Dispatcher::register_handler`](crate::dispatcher::Dispatcher::register_handler) and
//! invokes it with a [`HandlerCall`] carrying the bound positional arguments.
//!
//! Any `Fn(HandlerCall) -> anyhow::Result<serde_json::Value> + Send + Sync + 'static` is a handler.
//! The returned value is turned into a response by [`crate::responder`]; an `Err` is routed
//! through the exception mappers.

use crate::binder::Argument;
use crate::ids::RequestId;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Name of the callable behind an operation. Cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerRef(Arc<str>);

impl HandlerRef {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for HandlerRef {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for HandlerRef {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

/// One invocation of a handler.
#[derive(Debug, Clone)]
pub struct HandlerCall {
    request_id: RequestId,
    handler: HandlerRef,
    arguments: Vec<Argument>,
}

impl HandlerCall {
    #[must_use]
    pub fn new(request_id: RequestId, handler: HandlerRef, arguments: Vec<Argument>) -> Self {
        Self {
            request_id,
            handler,
            arguments,
        }
    }

    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    #[must_use]
    pub fn handler(&self) -> &HandlerRef {
        &self.handler
    }

    /// Positional argument `index`; out of range reads as [`Argument::Absent`].
    #[must_use]
    pub fn arg(&self, index: usize) -> &Argument {
        self.arguments.get(index).unwrap_or(&Argument::Absent)
    }

    #[must_use]
    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    #[must_use]
    pub fn into_arguments(self) -> Vec<Argument> {
        self.arguments
    }
}

/// Something the dispatcher can invoke for an operation.
pub trait Handler: Send + Sync + 'static {
    fn handle(&self, call: HandlerCall) -> anyhow::Result<Value>;
}

impl<F> Handler for F
where
    F: Fn(HandlerCall) -> anyhow::Result<Value> + Send + Sync + 'static,
{
    fn handle(&self, call: HandlerCall) -> anyhow::Result<Value> {
        self(call)
    }
}
