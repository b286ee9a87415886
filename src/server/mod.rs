//! # Server Message Module
//!
//! Neutral request/response value objects exchanged with transport adapters.
//!
//! A transport adapter (hyper, may_minihttp, a test harness, ...) converts its native
//! request into a [`Request`] through [`RequestBuilder`], hands it to
//! [`Dispatcher::handle_request`](crate::dispatcher::Dispatcher::handle_request) and writes
//! the returned [`Response`] back to the wire. Neither type knows about sockets.
//!
//! ```rust
//! use restwire::server::Request;
//! use http::Method;
//!
//! let req = Request::builder(Method::GET, "/pets;color=red/42?verbose=true")
//!     .header("Accept", "application/json")
//!     .build();
//! assert_eq!(req.path(), "/pets/42");
//! assert_eq!(req.matrix_param("color"), Some("red"));
//! assert_eq!(req.query_param("verbose"), Some("true"));
//! ```

pub mod request;
pub mod response;

pub use request::{
    parse_cookies, parse_query_params, split_matrix_params, HeaderVec, ParamVec, Request,
    RequestBuilder, MAX_INLINE_HEADERS, MAX_INLINE_PARAMS,
};
pub use response::{Response, ResponseBuilder};
