//! # Request Surface
//!
//! Everything the binder reads from a request, without knowing which HTTP
//! stack produced it. The HTTP adapter implements [`RequestSurface`] over its
//! own request type; [`StaticRequest`] is an owned implementation for tests
//! and offline validation.

use std::collections::BTreeMap;

use oasv_auth::CredentialSurface;

/// Accessors for the request parts that carry parameters and the body.
pub trait RequestSurface: CredentialSurface {
    /// Every query value for `name`, in order. Empty when not sent.
    fn query_values(&self, name: &str) -> Vec<String>;

    /// A path parameter from the router's match.
    fn path_param(&self, name: &str) -> Option<String>;

    /// The `Content-Type` header as sent, parameters included.
    fn content_type(&self) -> Option<String> {
        self.header("content-type")
    }

    /// The raw request body.
    fn body(&self) -> &[u8];
}

/// Owned, in-memory request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticRequest {
    query: Vec<(String, String)>,
    path: BTreeMap<String, String>,
    headers: BTreeMap<String, String>,
    cookies: BTreeMap<String, String>,
    body: Vec<u8>,
}

impl StaticRequest {
    /// Empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and append a query string such as `a=1&b=2&b=3`.
    #[must_use]
    pub fn with_query_string(mut self, query: &str) -> Self {
        self.query.extend(
            url::form_urlencoded::parse(query.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned())),
        );
        self
    }

    /// Append one query value.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Set a path parameter.
    #[must_use]
    pub fn with_path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path.insert(name.into(), value.into());
        self
    }

    /// Set a header; names are stored lowercased.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Set a cookie.
    #[must_use]
    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    /// Set the body and its content type.
    #[must_use]
    pub fn with_body(mut self, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        self.headers
            .insert("content-type".to_string(), content_type.to_string());
        self.body = body.into();
        self
    }

    /// Set a JSON body.
    #[must_use]
    pub fn with_json(self, body: &serde_json::Value) -> Self {
        self.with_body("application/json", body.to_string())
    }
}

impl CredentialSurface for StaticRequest {
    fn header(&self, name: &str) -> Option<String> {
        self.headers.get(&name.to_ascii_lowercase()).cloned()
    }

    fn query(&self, name: &str) -> Option<String> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }

    fn cookie(&self, name: &str) -> Option<String> {
        self.cookies.get(name).cloned()
    }
}

impl RequestSurface for StaticRequest {
    fn query_values(&self, name: &str) -> Vec<String> {
        self.query
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
            .collect()
    }

    fn path_param(&self, name: &str) -> Option<String> {
        self.path.get(name).cloned()
    }

    fn body(&self) -> &[u8] {
        &self.body
    }
}
