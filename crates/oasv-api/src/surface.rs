//! # HTTP Request Surface
//!
//! [`RequestSurface`] over an axum request split into `Parts` and the
//! buffered body. The query string and cookies are parsed once, up front.

use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum_extra::extract::cookie::CookieJar;
use oasv_auth::CredentialSurface;
use oasv_binder::RequestSurface;

/// Borrowed view of one request.
#[derive(Debug)]
pub struct HttpSurface<'a> {
    headers: &'a HeaderMap,
    query: Vec<(String, String)>,
    path: Vec<(String, String)>,
    cookies: CookieJar,
    body: &'a [u8],
}

impl<'a> HttpSurface<'a> {
    /// Build the surface. `path` holds the router's parameter matches.
    pub fn new(parts: &'a Parts, path: Vec<(String, String)>, body: &'a [u8]) -> Self {
        let query = parts
            .uri
            .query()
            .map(|query| {
                url::form_urlencoded::parse(query.as_bytes())
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default();
        Self {
            headers: &parts.headers,
            query,
            path,
            cookies: CookieJar::from_headers(&parts.headers),
            body,
        }
    }
}

impl CredentialSurface for HttpSurface<'_> {
    fn header(&self, name: &str) -> Option<String> {
        // Non-UTF-8 header values are treated as missing.
        self.headers
            .get(name.to_ascii_lowercase().as_str())
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    }

    fn query(&self, name: &str) -> Option<String> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }

    fn cookie(&self, name: &str) -> Option<String> {
        self.cookies.get(name).map(|cookie| cookie.value().to_owned())
    }
}

impl RequestSurface for HttpSurface<'_> {
    fn query_values(&self, name: &str) -> Vec<String> {
        self.query
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
            .collect()
    }

    fn path_param(&self, name: &str) -> Option<String> {
        self.path
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }

    fn body(&self) -> &[u8] {
        self.body
    }
}
