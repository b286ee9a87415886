//! # Response Builder
//!
//! Turns a handler result into a [`Response`].
//!
//! - A falsy result (`null`, `false`, `0`, `""`) becomes `204 No Content` with no
//!   Content-Type header and no payload.
//! - Anything else becomes `200 OK` with `Content-Type` set to the negotiated media type.
//!   When that type is JSON (`/json` or a `+json` suffix) the value is serialized as JSON;
//!   otherwise a string result is sent as-is and other values as their JSON text.

use crate::media::essence;
use crate::server::Response;
use http::header::CONTENT_TYPE;
use http::StatusCode;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static JSON_MEDIA_TYPE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"[+/]json$").ok());

/// `true` for `application/json`, `application/problem+json` and the like.
#[must_use]
pub fn is_json_media_type(media_type: &str) -> bool {
    JSON_MEDIA_TYPE
        .as_ref()
        .is_some_and(|re| re.is_match(&essence(media_type)))
}

/// `null`, `false`, zero and the empty string.
#[must_use]
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Serialize `result` for `media_type`.
#[must_use]
pub fn serialize(result: &Value, media_type: &str) -> String {
    match result {
        Value::String(s) if !is_json_media_type(media_type) => s.clone(),
        other => other.to_string(),
    }
}

/// Build the success response for a handler result.
#[must_use]
pub fn build_response(result: &Value, media_type: &str) -> Response {
    if is_falsy(result) {
        return Response::status_only(StatusCode::NO_CONTENT);
    }
    Response::builder(StatusCode::OK)
        .header(CONTENT_TYPE.as_str(), media_type)
        .payload(serialize(result, media_type))
        .build()
}
