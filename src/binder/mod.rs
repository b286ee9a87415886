//! # Parameter Binder
//!
//! Turns an operation's [`ParameterDescriptor`](crate::operation::ParameterDescriptor)s into
//! positional handler [`Argument`]s.
//!
//! Primitive parameters (`String`, `Number`, `Boolean`) read one raw string from their
//! source and convert it:
//!
//! | Kind     | Source                                                         |
//! |----------|----------------------------------------------------------------|
//! | `Cookie` | named cookie                                                   |
//! | `Header` | named header, case-insensitive                                 |
//! | `Query`  | named query parameter, first occurrence                        |
//! | `Matrix` | named `;key=value` matrix parameter                            |
//! | `Path`   | named template capture, URL-decoded                            |
//! | `Form`   | named field of a form-encoded body; only for that content type |
//! | `Body`   | the whole payload                                              |
//!
//! `Number` is a base-10 `i64` and fails with [`BindError::InvalidNumber`] otherwise;
//! `Boolean` is `true` exactly when the raw value equals `"true"` ignoring case. A missing
//! or empty raw value binds as [`Argument::Absent`].
//!
//! Complex types are only legal for `Body` (parsed as JSON) and `Context` (the in-flight
//! request); anything else is a configuration error.

mod core;
mod error;

pub use self::core::{build_arguments, extract_form_value, Argument};
pub use self::error::BindError;
