//! Incoming HTTP request type.

use url::form_urlencoded;

use crate::method::Method;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// An incoming HTTP request, as handed to [`Engine::handle`](crate::Engine::handle).
///
/// The server builds these from the wire; tests build them directly:
///
/// ```rust
/// use kite::Request;
///
/// let req = Request::post("/login?next=%2Fhome")
///     .with_header("content-type", "application/x-www-form-urlencoded")
///     .with_body("username=alice");
/// assert_eq!(req.path(), "/login");
/// assert_eq!(req.query("next").as_deref(), Some("/home"));
/// ```
#[derive(Clone, Debug)]
pub struct Request {
    method: Method,
    path: String,
    query: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Request {
    /// Creates a request for `target`, a path optionally followed by `?query`.
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        Self {
            method,
            path: path.to_owned(),
            query: query.to_owned(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn get(target: &str) -> Self {
        Self::new(Method::Get, target)
    }

    pub fn post(target: &str) -> Self {
        Self::new(Method::Post, target)
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn raw_query(&self) -> &str { &self.query }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// First decoded value of `key` in the query string.
    pub fn query(&self, key: &str) -> Option<String> {
        lookup(self.query.as_bytes(), key)
    }

    /// First decoded value of `key` in a url-encoded form body, falling back
    /// to the query string.
    pub fn post_form(&self, key: &str) -> Option<String> {
        let is_form = self.header("content-type")
            .is_some_and(|ct| ct.starts_with(FORM_CONTENT_TYPE));

        is_form
            .then(|| lookup(&self.body, key))
            .flatten()
            .or_else(|| self.query(key))
    }
}

fn lookup(encoded: &[u8], key: &str) -> Option<String> {
    form_urlencoded::parse(encoded)
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}
