use crate::ids::{RequestId, REQUEST_ID_HEADER};
use http::Method;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::debug;

/// Maximum number of path/query/matrix parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Maximum inline headers/cookies before heap allocation.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Name/value pairs for path captures, query and matrix parameters.
///
/// Names are `Arc<str>` so that capture names coming from a compiled template are shared
/// rather than copied per request.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Ordered header (and cookie) storage; duplicates are preserved in arrival order.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Neutral request value produced by a transport adapter.
///
/// Immutable once built. All lookups are "first occurrence wins"; header names are
/// compared ASCII case-insensitively.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    request_id: RequestId,
    method: Method,
    path: String,
    headers: HeaderVec,
    cookies: HeaderVec,
    query_params: ParamVec,
    matrix_params: ParamVec,
    payload: Option<String>,
}

impl Request {
    /// Start building a request for `method` and a raw request target.
    ///
    /// The target may carry a query string and `;key=value` matrix parameters; both are
    /// split off the routed path when the request is built.
    #[must_use]
    pub fn builder(method: Method, target: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(method, target)
    }

    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Routed path: query string and matrix parameters removed.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderVec {
        &self.headers
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[inline]
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&str> {
        find_param(&self.cookies, name)
    }

    #[inline]
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        find_param(&self.query_params, name)
    }

    #[inline]
    #[must_use]
    pub fn matrix_param(&self, name: &str) -> Option<&str> {
        find_param(&self.matrix_params, name)
    }

    #[must_use]
    pub fn query_params(&self) -> &ParamVec {
        &self.query_params
    }

    #[must_use]
    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }

    #[must_use]
    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }
}

fn find_param<'a>(params: &'a [(Arc<str>, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k.as_ref() == name)
        .map(|(_, v)| v.as_str())
}

/// Builder for [`Request`], used by transport adapters and tests.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: Method,
    target: String,
    headers: HeaderVec,
    cookies: HeaderVec,
    query_params: ParamVec,
    payload: Option<String>,
}

impl RequestBuilder {
    fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            headers: HeaderVec::new(),
            cookies: HeaderVec::new(),
            query_params: ParamVec::new(),
            payload: None,
        }
    }

    #[must_use]
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((Arc::from(name), value.into()));
        self
    }

    #[must_use]
    pub fn cookie(mut self, name: &str, value: impl Into<String>) -> Self {
        self.cookies.push((Arc::from(name), value.into()));
        self
    }

    /// Add a query parameter in addition to any found in the target.
    #[must_use]
    pub fn query(mut self, name: &str, value: impl Into<String>) -> Self {
        self.query_params.push((Arc::from(name), value.into()));
        self
    }

    #[must_use]
    pub fn payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    #[must_use]
    pub fn build(self) -> Request {
        let (path_and_matrix, query) = match self.target.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (self.target.as_str(), None),
        };
        let (path, matrix_params) = split_matrix_params(path_and_matrix);

        let mut query_params = query.map(parse_query_params).unwrap_or_default();
        query_params.extend(self.query_params);

        let mut cookies = self.cookies;
        for (name, value) in &self.headers {
            if name.eq_ignore_ascii_case("cookie") {
                cookies.extend(parse_cookies(value));
            }
        }

        let request_id = RequestId::from_header_or_new(
            self.headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(REQUEST_ID_HEADER))
                .map(|(_, v)| v.as_str()),
        );

        debug!(
            request_id = %request_id,
            method = %self.method,
            path = %path,
            header_count = self.headers.len(),
            cookie_count = cookies.len(),
            query_count = query_params.len(),
            matrix_count = matrix_params.len(),
            has_payload = self.payload.is_some(),
            "Request built"
        );

        Request {
            request_id,
            method: self.method,
            path,
            headers: self.headers,
            cookies,
            query_params,
            matrix_params,
            payload: self.payload,
        }
    }
}

/// Parse a `Cookie` header value (`a=b; c=d`).
#[must_use]
pub fn parse_cookies(header_value: &str) -> HeaderVec {
    header_value
        .split(';')
        .filter_map(|pair| {
            let mut parts = pair.trim().splitn(2, '=');
            let name = parts.next()?.trim();
            if name.is_empty() {
                return None;
            }
            let value = parts.next().unwrap_or("").trim();
            Some((Arc::from(name), value.to_string()))
        })
        .collect()
}

/// Parse a raw query string (without the leading `?`), URL-decoding names and values.
#[must_use]
pub fn parse_query_params(query: &str) -> ParamVec {
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (Arc::from(k.as_ref()), v.into_owned()))
        .collect()
}

/// Split `;key=value` matrix parameters off every path segment.
///
/// `/cars;color=red/sedan;doors=4` routes as `/cars/sedan` with matrix parameters
/// `color=red` and `doors=4`. A bare `;flag` yields an empty value.
#[must_use]
pub fn split_matrix_params(path: &str) -> (String, ParamVec) {
    if !path.contains(';') {
        return (path.to_string(), ParamVec::new());
    }

    let mut matrix = ParamVec::new();
    let segments: Vec<&str> = path
        .split('/')
        .map(|segment| {
            let mut parts = segment.split(';');
            let bare = parts.next().unwrap_or("");
            for pair in parts.filter(|p| !p.is_empty()) {
                let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
                matrix.push((Arc::from(name), value.to_string()));
            }
            bare
        })
        .collect();

    (segments.join("/"), matrix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cookies() {
        let cookies = parse_cookies("a=b; c=d");
        assert_eq!(find_param(&cookies, "a"), Some("b"));
        assert_eq!(find_param(&cookies, "c"), Some("d"));
    }

    #[test]
    fn test_query_first_occurrence_wins() {
        let req = Request::builder(Method::GET, "/p?x=1&y=2&x=3").build();
        assert_eq!(req.path(), "/p");
        assert_eq!(req.query_param("x"), Some("1"));
        assert_eq!(req.query_param("y"), Some("2"));
    }

    #[test]
    fn test_matrix_params_are_split_from_path() {
        let req = Request::builder(Method::GET, "/cars;color=red/sedan;doors=4?x=1").build();
        assert_eq!(req.path(), "/cars/sedan");
        assert_eq!(req.matrix_param("color"), Some("red"));
        assert_eq!(req.matrix_param("doors"), Some("4"));
        assert_eq!(req.query_param("x"), Some("1"));
    }

    #[test]
    fn test_header_lookup_is_case_insensitive_first_wins() {
        let req = Request::builder(Method::GET, "/")
            .header("Accept", "text/plain")
            .header("accept", "application/json")
            .build();
        assert_eq!(req.header("ACCEPT"), Some("text/plain"));
    }

    #[test]
    fn test_cookie_header_and_explicit_cookies() {
        let req = Request::builder(Method::GET, "/")
            .cookie("session", "explicit")
            .header("Cookie", "session=from-header; theme=dark")
            .build();
        assert_eq!(req.cookie("session"), Some("explicit"));
        assert_eq!(req.cookie("theme"), Some("dark"));
    }

    #[test]
    fn test_payload_presence() {
        let empty = Request::builder(Method::POST, "/").build();
        assert!(!empty.has_payload());
        let full = Request::builder(Method::POST, "/").payload("a=1").build();
        assert_eq!(full.payload(), Some("a=1"));
    }
}
