//! Incoming HTTP request type.

use std::collections::HashMap;

use http::{HeaderMap, Method, Uri};

/// An incoming request, as seen by a handler.
///
/// Every gateway route is a bodiless `GET`, so the body is never read.
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    params: HashMap<String, String>,
    query: Vec<(String, String)>,
}

impl Request {
    pub(crate) fn new(parts: http::request::Parts, params: HashMap<String, String>) -> Self {
        Self::from_parts(parts.method, parts.uri, parts.headers, params)
    }

    /// Builds a request directly, bypassing the server. Handy for calling a
    /// [`Handler`](crate::Handler) in tests.
    pub fn from_parts(
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        params: HashMap<String, String>,
    ) -> Self {
        let query = uri
            .query()
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();
        Self { method, uri, headers, params, query }
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn path(&self) -> &str { self.uri.path() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }

    /// Header lookup. Names are case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter (`/{name}` segments).
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// First value of a query-string parameter, percent-decoded.
    ///
    /// `/covid_regije?days=3` → `req.query("days") == Some("3")`.
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}
