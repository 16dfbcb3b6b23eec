//! Read-only access to the places a credential can live.

use std::collections::BTreeMap;

/// The credential-bearing parts of a request.
///
/// Implemented by the HTTP adapter over its request type, and by
/// [`StaticCredentials`] for tests and offline checks.
pub trait CredentialSurface {
    /// One header value; `name` is matched case-insensitively.
    fn header(&self, name: &str) -> Option<String>;

    /// The first query value for `name`.
    fn query(&self, name: &str) -> Option<String>;

    /// A cookie value, looked up by exact name.
    fn cookie(&self, name: &str) -> Option<String>;
}

/// In-memory [`CredentialSurface`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticCredentials {
    headers: BTreeMap<String, String>,
    query: BTreeMap<String, String>,
    cookies: BTreeMap<String, String>,
}

impl StaticCredentials {
    /// Empty surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header; the name is stored lowercased.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Add a query parameter.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Add a cookie.
    #[must_use]
    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }
}

impl CredentialSurface for StaticCredentials {
    fn header(&self, name: &str) -> Option<String> {
        self.headers.get(&name.to_ascii_lowercase()).cloned()
    }

    fn query(&self, name: &str) -> Option<String> {
        self.query.get(name).cloned()
    }

    fn cookie(&self, name: &str) -> Option<String> {
        self.cookies.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_are_case_insensitive() {
        let s = StaticCredentials::new().with_header("X-API-Key", "k");
        assert_eq!(s.header("x-api-key").as_deref(), Some("k"));
        assert_eq!(s.header("X-API-KEY").as_deref(), Some("k"));
    }

    #[test]
    fn cookies_are_exact() {
        let s = StaticCredentials::new().with_cookie("C-API-KEY", "k");
        assert_eq!(s.cookie("C-API-KEY").as_deref(), Some("k"));
        assert_eq!(s.cookie("c-api-key"), None);
    }
}
