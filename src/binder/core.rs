use super::error::BindError;
use crate::media::{essence, FORM_MEDIA_TYPE};
use crate::operation::{
    ContextTypeRef, DeclaredType, OperationDescriptor, ParameterDescriptor, ParameterKind,
    ParameterName,
};
use crate::server::{ParamVec, Request};
use serde_json::Value;
use std::borrow::Cow;
use std::sync::Arc;
use tracing::debug;

/// A bound handler argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// Nothing to bind: missing source, empty raw value or no payload.
    Absent,
    String(String),
    Number(i64),
    Boolean(bool),
    /// A complex payload parsed from JSON.
    Json(Value),
    /// The in-flight request, for `Context` parameters.
    Request(Arc<Request>),
}

impl Argument {
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Argument::Absent)
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Argument::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Argument::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Argument::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Argument::Json(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_request(&self) -> Option<&Request> {
        match self {
            Argument::Request(r) => Some(r),
            _ => None,
        }
    }
}

/// Bind every parameter of `descriptor`, in order, against `request`.
///
/// `path_params` are the raw captures of the matched template; when a name is captured
/// more than once the last segment wins. An operation without parameters yields an empty
/// list.
pub fn build_arguments(
    descriptor: &OperationDescriptor,
    request: &Arc<Request>,
    path_params: &ParamVec,
) -> Result<Vec<Argument>, BindError> {
    let arguments = descriptor
        .parameters
        .iter()
        .map(|parameter| bind_parameter(parameter, request, path_params))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        request_id = %request.request_id(),
        handler = %descriptor.handler,
        arguments = arguments.len(),
        absent = arguments.iter().filter(|a| a.is_absent()).count(),
        "Arguments bound"
    );

    Ok(arguments)
}

fn bind_parameter(
    parameter: &ParameterDescriptor,
    request: &Arc<Request>,
    path_params: &ParamVec,
) -> Result<Argument, BindError> {
    parameter.validate()?;

    match (parameter.kind, &parameter.name) {
        (ParameterKind::Context, Some(ParameterName::ContextTypeRef(context_type))) => {
            bind_context(context_type, request)
        }
        (ParameterKind::Body, _) if !parameter.declared_type.is_primitive() => {
            bind_json_body(request)
        }
        _ => {
            let raw = extract_raw(parameter, request, path_params);
            convert(parameter, raw)
        }
    }
}

fn bind_context(context_type: &ContextTypeRef, request: &Arc<Request>) -> Result<Argument, BindError> {
    if context_type.as_str() == ContextTypeRef::REQUEST {
        Ok(Argument::Request(Arc::clone(request)))
    } else {
        Err(BindError::UnknownContext {
            context_type: context_type.to_string(),
        })
    }
}

fn bind_json_body(request: &Request) -> Result<Argument, BindError> {
    match request.payload() {
        Some(payload) if !payload.is_empty() => serde_json::from_str(payload)
            .map(Argument::Json)
            .map_err(|e| BindError::MalformedBody {
                reason: e.to_string(),
            }),
        _ => Ok(Argument::Absent),
    }
}

/// Raw string for a primitive parameter; an empty value counts as absent.
fn extract_raw<'a>(
    parameter: &ParameterDescriptor,
    request: &'a Request,
    path_params: &'a ParamVec,
) -> Option<Cow<'a, str>> {
    let key = parameter.key();
    let raw: Option<Cow<'a, str>> = match parameter.kind {
        ParameterKind::Body => request.payload().map(Cow::Borrowed),
        ParameterKind::Cookie => key.and_then(|k| request.cookie(k)).map(Cow::Borrowed),
        ParameterKind::Header => key.and_then(|k| request.header(k)).map(Cow::Borrowed),
        ParameterKind::Query => key.and_then(|k| request.query_param(k)).map(Cow::Borrowed),
        ParameterKind::Matrix => key.and_then(|k| request.matrix_param(k)).map(Cow::Borrowed),
        ParameterKind::Path => key.and_then(|k| path_param(path_params, k)).map(decode_segment),
        ParameterKind::Form => key.and_then(|k| form_param(request, k)).map(Cow::Borrowed),
        ParameterKind::Context => None,
    };
    raw.filter(|value| !value.is_empty())
}

#[inline]
fn path_param<'a>(path_params: &'a ParamVec, name: &str) -> Option<&'a str> {
    path_params
        .iter()
        .rfind(|(k, _)| k.as_ref() == name)
        .map(|(_, v)| v.as_str())
}

fn decode_segment(raw: &str) -> Cow<'_, str> {
    urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw))
}

fn form_param<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
    let content_type = request.header("content-type")?;
    if essence(content_type) != FORM_MEDIA_TYPE {
        return None;
    }
    extract_form_value(request.payload()?, name)
}

/// Value of `name` in a form-encoded body, left URL-encoded.
///
/// Only a key at the very start of the body or right after `&` matches, so `name` never
/// matches inside `username`. The value runs to the next `&` or the end of the body.
#[must_use]
pub fn extract_form_value<'a>(body: &'a str, name: &str) -> Option<&'a str> {
    body.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == name).then_some(value)
    })
}

fn convert(parameter: &ParameterDescriptor, raw: Option<Cow<'_, str>>) -> Result<Argument, BindError> {
    let Some(raw) = raw else {
        return Ok(Argument::Absent);
    };
    match &parameter.declared_type {
        DeclaredType::String => Ok(Argument::String(raw.into_owned())),
        DeclaredType::Number => raw.trim().parse::<i64>().map(Argument::Number).map_err(|_| {
            BindError::InvalidNumber {
                kind: parameter.kind,
                name: parameter.key().unwrap_or("").to_string(),
                value: raw.to_string(),
            }
        }),
        DeclaredType::Boolean => Ok(Argument::Boolean(raw.eq_ignore_ascii_case("true"))),
        DeclaredType::Complex(tag) => Err(BindError::ComplexNonPayload {
            kind: parameter.kind,
            declared_type: tag.clone(),
        }),
    }
}
