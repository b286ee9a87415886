//! # restwire
//!
//! **restwire** is a declarative REST dispatch layer: operations declare their path template,
//! HTTP methods, consumed/produced media types and typed parameters once, at startup, and the
//! dispatcher finds the single best operation for every request, binds its arguments, runs its
//! handler on a `may` coroutine and serializes the result with the negotiated content type.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - **[`operation`]** - Operation and parameter descriptors, builders and manifest loading
//! - **[`router`]** - `:name` path templates and the ordered operation registry
//! - **[`media`]** - Accept/Content-Type parsing with quality values and wildcards
//! - **[`dispatcher`]** - Matching, 404/405/415/406 fallback and handler coroutines
//! - **[`binder`]** - Extraction and conversion of handler arguments from a request
//! - **[`responder`]** - Handler result to response (204 for falsy results, JSON encoding)
//! - **[`exception`]** - Mapping of binding and handler failures to responses
//! - **[`server`]** - Neutral request/response values exchanged with transport adapters
//! - **[`handler`]** - The handler trait and invocation type
//! - **[`runtime_config`]** / **[`logging`]** - Environment-driven configuration
//!
//! ### Request Flow
//!
//! ```text
//! Request ──> Dispatcher::resolve ──> OperationRegistry (path, registration order)
//!                  │                      └─> method ─> Content-Type ─> Accept
//!                  ├─ no full match ──> 404 / 405 / 415 / 406
//!                  └─ selected ──> binder::build_arguments ──> handler coroutine
//!                                        └─> responder::build_response (200 / 204)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use restwire::dispatcher::Dispatcher;
//! use restwire::handler::HandlerCall;
//! use restwire::operation::{DeclaredType, EndpointBuilder, OperationBuilder, ParameterDescriptor};
//! use restwire::runtime_config::RuntimeConfig;
//! use restwire::server::Request;
//! use http::Method;
//! use serde_json::json;
//!
//! let pets = EndpointBuilder::new().path("/pets").produces("application/json");
//!
//! let mut dispatcher = Dispatcher::new(RuntimeConfig::default());
//! dispatcher
//!     .register_endpoints([
//!         OperationBuilder::new("list_pets")
//!             .method(Method::GET)
//!             .param(ParameterDescriptor::query("limit", DeclaredType::Number))
//!             .build_under(&pets),
//!     ])
//!     .unwrap();
//!
//! unsafe {
//!     dispatcher.register_handler("list_pets", |call: HandlerCall| -> anyhow::Result<_> {
//!         let limit = call.arg(0).as_i64().unwrap_or(10);
//!         Ok(json!({ "limit": limit, "items": [] }))
//!     });
//! }
//!
//! let response = dispatcher.handle_request(
//!     Request::builder(Method::GET, "/pets?limit=2")
//!         .header("Accept", "application/json")
//!         .build(),
//! );
//! assert_eq!(response.status(), 200);
//! assert_eq!(response.header("content-type"), Some("application/json"));
//! ```
//!
//! ## Manifests
//!
//! Operations can also be declared in YAML, TOML or JSON and loaded with
//! [`operation::load_manifest`]; the `restwire` binary lists, checks and probes such files.

pub mod binder;
pub mod cli;
pub mod dispatcher;
pub mod exception;
pub mod handler;
pub mod ids;
pub mod logging;
pub mod media;
pub mod operation;
pub mod responder;
pub mod router;
pub mod runtime_config;
pub mod server;

pub use dispatcher::Dispatcher;
pub use handler::{Handler, HandlerCall, HandlerRef};
pub use operation::{load_manifest, OperationDescriptor, ParameterDescriptor};
pub use server::{Request, Response};
