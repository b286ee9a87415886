//! # Dispatcher Module
//!
//! Orchestrates one request end to end: registry lookup, method and media-type matching,
//! argument binding, handler invocation and response building.
//!
//! ## Matching
//!
//! Path-eligible operations are examined in registration order. For each one the method is
//! checked, then the request Content-Type against the consumed set, then the Accept header
//! against the produced set. The first operation passing all four stages is invoked and the
//! walk stops, so the earliest registration wins a tie.
//!
//! When nothing matches fully, a [`MatchingResult`] remembers the furthest stage any
//! operation reached and the response is exactly one of:
//!
//! | Furthest stage reached    | Status |
//! |---------------------------|--------|
//! | no path match             | 404    |
//! | path, but no method       | 405    |
//! | method, but content type  | 415    |
//! | content type, but accept  | 406    |
//!
//! ## Handlers
//!
//! Each handler gets an accept coroutine that receives invocations over a channel and runs
//! every invocation in a fresh `may` coroutine, so a hung call blocks only its own request.
//! The dispatching side parks on a reply channel; that is the only point where
//! [`Dispatcher::handle_request`] can suspend. Handler panics are caught in the coroutine.
//! Stack size is configurable via `RESTWIRE_STACK_SIZE`.
//!
//! ## Example
//!
//! ```rust
//! use restwire::dispatcher::Dispatcher;
//! use restwire::handler::HandlerCall;
//! use restwire::operation::{DeclaredType, OperationBuilder, ParameterDescriptor};
//! use restwire::runtime_config::RuntimeConfig;
//! use restwire::server::Request;
//! use http::Method;
//! use serde_json::json;
//!
//! let mut dispatcher = Dispatcher::new(RuntimeConfig::default());
//! dispatcher
//!     .register(
//!         OperationBuilder::new("get_pet")
//!             .path("/pets/:id")
//!             .method(Method::GET)
//!             .produces("application/json")
//!             .param(ParameterDescriptor::path("id", DeclaredType::Number))
//!             .build(),
//!     )
//!     .unwrap();
//! unsafe {
//!     dispatcher.register_handler("get_pet", |call: HandlerCall| -> anyhow::Result<_> {
//!         Ok(json!({ "id": call.arg(0).as_i64() }))
//!     });
//! }
//!
//! let response = dispatcher.handle_request(Request::builder(Method::GET, "/pets/7").build());
//! assert_eq!(response.status(), 200);
//! assert_eq!(response.payload(), Some(r#"{"id":7}"#));
//! ```

mod core;
mod matching;

pub use self::core::{Dispatcher, Resolution, Selection};
pub use self::matching::MatchingResult;
