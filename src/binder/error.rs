use crate::operation::ParameterKind;
use std::fmt;

/// Failure to build a handler argument.
///
/// Most variants describe a misconfigured operation and are surfaced as server errors.
/// [`BindError::InvalidNumber`] and [`BindError::MalformedBody`] are caused by the request
/// itself; see [`BindError::is_client_error`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// A complex declared type on a parameter that is neither `Body` nor `Context`.
    ComplexNonPayload {
        kind: ParameterKind,
        declared_type: String,
    },
    /// A `Context` parameter asked for a context type this binder does not provide.
    UnknownContext {
        context_type: String,
    },
    /// A `Context` parameter without a context type reference.
    MissingContextType,
    /// A named kind (`Header`, `Query`, ...) without a key.
    MissingName {
        kind: ParameterKind,
    },
    /// A `Number` parameter whose raw value is not a base-10 integer.
    InvalidNumber {
        kind: ParameterKind,
        name: String,
        value: String,
    },
    /// A complex `Body` parameter whose payload is not valid JSON.
    MalformedBody {
        reason: String,
    },
}

impl BindError {
    /// `true` when the request, not the operation, is at fault.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            BindError::InvalidNumber { .. } | BindError::MalformedBody { .. }
        )
    }
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindError::ComplexNonPayload {
                kind,
                declared_type,
            } => write!(
                f,
                "complex non-payload parameters not implemented: {kind} parameter declared as {declared_type}"
            ),
            BindError::UnknownContext { context_type } => {
                write!(f, "unknown context class {context_type}")
            }
            BindError::MissingContextType => {
                write!(f, "Context parameter has no context type reference")
            }
            BindError::MissingName { kind } => write!(f, "{kind} parameter has no name"),
            BindError::InvalidNumber { kind, name, value } => write!(
                f,
                "{kind} parameter '{name}' is not a base-10 integer: '{value}'"
            ),
            BindError::MalformedBody { reason } => {
                write!(f, "request payload is not valid JSON: {reason}")
            }
        }
    }
}

impl std::error::Error for BindError {}
