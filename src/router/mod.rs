//! # Router Module
//!
//! Path template compilation and the ordered operation registry.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Compiling `:name` path templates into anchored regex matchers
//! - Storing compiled operations in registration order
//! - Visiting every operation whose template matches a request path
//!
//! ## Architecture
//!
//! The router uses a two-phase approach:
//!
//! 1. **Compilation**: at registration, a template such as `/pets/:id` becomes
//!    `^/pets/([^/]+)$` plus the capture names `["id"]`. Literal segments are regex-escaped.
//!
//! 2. **Matching**: for each request, [`OperationRegistry::find_eligible_by_path`] tests the
//!    path against every compiled matcher in registration order and hands each structural
//!    match, with its captured segments, to a visitor that decides whether to stop.
//!
//! Method and media-type checks are not done here; see [`crate::dispatcher`].
//!
//! ## Example
//!
//! ```rust
//! use restwire::operation::OperationBuilder;
//! use restwire::router::{OperationRegistry, PathMatchOptions};
//! use std::ops::ControlFlow;
//! use http::Method;
//!
//! let mut registry = OperationRegistry::new(PathMatchOptions::default());
//! registry
//!     .register(OperationBuilder::new("get_pet").path("/pets/:id").method(Method::GET).build())
//!     .unwrap();
//!
//! let handler = registry.find_eligible_by_path("/pets/42", |op, captures| {
//!     assert_eq!(captures[0].1, "42");
//!     ControlFlow::Break(op.descriptor().handler.clone())
//! });
//! assert_eq!(handler.unwrap().as_str(), "get_pet");
//! ```

mod core;
mod registry;

pub use self::core::{PathMatchOptions, PathMatcher, PathTemplateError};
pub use self::registry::{OperationRegistry, RegisteredOperation, RegistryError};
