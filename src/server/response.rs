use super::request::HeaderVec;
use http::StatusCode;
use std::sync::Arc;

/// Neutral response value handed back to the transport adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    headers: HeaderVec,
    payload: Option<String>,
}

impl Response {
    #[must_use]
    pub fn builder(status: StatusCode) -> ResponseBuilder {
        ResponseBuilder {
            status: status.as_u16(),
            headers: HeaderVec::new(),
            payload: None,
        }
    }

    /// A bare status response: no headers, no payload.
    #[must_use]
    pub fn status_only(status: StatusCode) -> Self {
        Self::builder(status).build()
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderVec {
        &self.headers
    }

    /// Get a header by name (case-insensitive)
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }

    /// The same response with `name` added or replaced.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value.into()));
        self
    }
}

#[derive(Debug, Clone)]
pub struct ResponseBuilder {
    status: u16,
    headers: HeaderVec,
    payload: Option<String>,
}

impl ResponseBuilder {
    /// Add or replace a header.
    #[must_use]
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value.into()));
        self
    }

    #[must_use]
    pub fn payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    #[must_use]
    pub fn build(self) -> Response {
        Response {
            status: self.status,
            headers: self.headers,
            payload: self.payload,
        }
    }
}
