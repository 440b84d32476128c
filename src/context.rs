//! Per-request context and the handler chain executor.
//!
//! # The onion
//!
//! A request's chain is the matching groups' middleware followed by one
//! terminal handler. [`Context::next`] runs the chain from the position after
//! the one currently executing. A handler may do work, call `next`, and do
//! more work once everything downstream has finished:
//!
//! ```text
//! A: before ─┐                        ┌─ A: after
//!            B: before ─┐      ┌─ B: after
//!                       H ─────┘
//! ```
//!
//! A handler that returns without calling `next` still counts as done: the
//! loop in the enclosing `next` moves on to the following handler. To stop
//! the chain, call [`Context::fail`], which moves the cursor past the end;
//! handlers already entered still run their post-`next` code.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::handler::BoxedHandler;
use crate::method::Method;
use crate::request::Request;
use crate::response::{ContentType, Response};

/// Path parameters keyed by name.
pub type Params = HashMap<String, String>;

/// Everything a handler can see and write for one request.
///
/// Created fresh by [`Engine::handle`](crate::Engine::handle), owned by that
/// call, and turned into the [`Response`] when the chain returns.
pub struct Context {
    request: Request,
    params: Params,

    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,

    handlers: Vec<BoxedHandler>,
    /// Index of the handler currently executing; `None` before the first,
    /// at or past the end once the chain is exhausted.
    cursor: Option<usize>,
    aborted: bool,
}

impl Context {
    pub(crate) fn new(request: Request, params: Params, handlers: Vec<BoxedHandler>) -> Self {
        Self {
            request,
            params,
            status: 200,
            headers: Vec::new(),
            body: Vec::new(),
            handlers,
            cursor: None,
            aborted: false,
        }
    }

    // ── Chain control ────────────────────────────────────────────────────────

    /// Runs every handler after the current one, in order.
    ///
    /// Returns once the chain is exhausted or a handler called [`fail`].
    /// Calling `next` again after that is a no-op.
    ///
    /// [`fail`]: Context::fail
    pub fn next(&mut self) {
        let mut at = self.cursor.map_or(0, |c| c + 1);
        while let Some(handler) = self.handlers.get(at).cloned() {
            self.cursor = Some(at);
            handler(self);
            // A nested `next` or `fail` may have moved the cursor.
            at = self.cursor.map_or(0, |c| c + 1);
        }
        self.cursor = Some(at);
    }

    /// Stops forward progress and writes `{"message": message}` with `code`.
    ///
    /// Does not unwind: the calling handler and those before it still finish.
    pub fn fail(&mut self, code: u16, message: &str) {
        self.cursor = Some(self.handlers.len());
        self.aborted = true;
        self.json(code, &json!({ "message": message }));
    }

    /// Whether [`fail`](Context::fail) has been called.
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    // ── Request side ─────────────────────────────────────────────────────────

    pub fn method(&self) -> Method { self.request.method() }
    pub fn path(&self) -> &str { self.request.path() }
    pub fn request(&self) -> &Request { &self.request }
    pub fn params(&self) -> &Params { &self.params }

    /// A `:name` or `*name` capture from the matched route.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn query(&self, key: &str) -> Option<String> {
        self.request.query(key)
    }

    pub fn post_form(&self, key: &str) -> Option<String> {
        self.request.post_form(key)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.request.header(name)
    }

    /// The request body as received.
    pub fn body(&self) -> &[u8] {
        self.request.body()
    }

    // ── Response side ────────────────────────────────────────────────────────

    pub fn status(&mut self, code: u16) {
        self.status = code;
    }

    pub fn status_code(&self) -> u16 {
        self.status
    }

    /// Sets a response header, replacing any header with the same name.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            Some(slot) => slot.1 = value,
            None => self.headers.push((name.to_owned(), value)),
        }
    }

    /// Writes a `text/plain` body.
    pub fn string(&mut self, code: u16, body: impl AsRef<str>) {
        self.write(code, Some(ContentType::Text), body.as_ref().as_bytes());
    }

    /// Serializes `value` as the JSON body. Serialization failure becomes a
    /// plain-text `500`.
    pub fn json<T: Serialize + ?Sized>(&mut self, code: u16, value: &T) {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.write(code, Some(ContentType::Json), &bytes),
            Err(e) => {
                error!(path = self.path(), "json encoding failed: {e}");
                self.write(500, Some(ContentType::Text), e.to_string().as_bytes());
            }
        }
    }

    /// Writes a `text/html` body.
    pub fn html(&mut self, code: u16, html: impl AsRef<str>) {
        self.write(code, Some(ContentType::Html), html.as_ref().as_bytes());
    }

    /// Writes raw bytes without touching the content type.
    pub fn data(&mut self, code: u16, bytes: &[u8]) {
        self.write(code, None, bytes);
    }

    fn write(&mut self, code: u16, content_type: Option<ContentType>, bytes: &[u8]) {
        if let Some(ct) = content_type {
            self.set_header("content-type", ct.as_str());
        }
        self.status = code;
        self.body.extend_from_slice(bytes);
    }

    pub(crate) fn into_response(self) -> Response {
        Response { status: self.status, headers: self.headers, body: self.body }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::handler::boxed;

    type Log = Arc<Mutex<Vec<String>>>;

    fn layer(log: &Log, name: &'static str) -> BoxedHandler {
        let log = Arc::clone(log);
        boxed(move |c: &mut Context| {
            log.lock().unwrap().push(format!("{name}>"));
            c.next();
            log.lock().unwrap().push(format!("<{name}"));
        })
    }

    fn terminal(log: &Log, name: &'static str) -> BoxedHandler {
        let log = Arc::clone(log);
        boxed(move |c: &mut Context| {
            log.lock().unwrap().push(name.to_owned());
            c.string(200, name);
        })
    }

    fn run(handlers: Vec<BoxedHandler>) -> Response {
        let mut ctx = Context::new(Request::get("/"), Params::new(), handlers);
        ctx.next();
        ctx.into_response()
    }

    fn entries(log: &Log) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    #[test]
    fn test_onion_order() {
        let log = Log::default();
        run(vec![layer(&log, "a"), layer(&log, "b"), terminal(&log, "h")]);
        assert_eq!(entries(&log), ["a>", "b>", "h", "<b", "<a"]);
    }

    #[test]
    fn test_handler_without_next_does_not_block_chain() {
        let log = Log::default();
        let plain = {
            let log = Arc::clone(&log);
            boxed(move |_: &mut Context| log.lock().unwrap().push("plain".to_owned()))
        };
        run(vec![layer(&log, "a"), plain, terminal(&log, "h")]);
        assert_eq!(entries(&log), ["a>", "plain", "h", "<a"]);
    }

    #[test]
    fn test_fail_stops_forward_progress_only() {
        let log = Log::default();
        let guard = {
            let log = Arc::clone(&log);
            boxed(move |c: &mut Context| {
                log.lock().unwrap().push("guard".to_owned());
                c.fail(401, "unauthorized");
                c.next();
                log.lock().unwrap().push("guard done".to_owned());
            })
        };
        let res = run(vec![layer(&log, "a"), guard, terminal(&log, "h")]);

        assert_eq!(entries(&log), ["a>", "guard", "guard done", "<a"]);
        assert_eq!(res.status(), 401);
        assert_eq!(res.body_text(), Some(r#"{"message":"unauthorized"}"#));
        assert_eq!(res.header("content-type"), Some("application/json"));
    }

    #[test]
    fn test_next_is_idempotent_once_exhausted() {
        let log = Log::default();
        let twice = {
            let log = Arc::clone(&log);
            boxed(move |c: &mut Context| {
                c.next();
                c.next();
                log.lock().unwrap().push("twice done".to_owned());
            })
        };
        run(vec![twice, terminal(&log, "h")]);
        assert_eq!(entries(&log), ["h", "twice done"]);
    }

    #[test]
    fn test_empty_chain() {
        let res = run(Vec::new());
        assert_eq!(res.status(), 200);
        assert!(res.body().is_empty());
    }

    #[test]
    fn test_is_aborted() {
        let mut ctx = Context::new(Request::get("/"), Params::new(), vec![boxed(|_: &mut Context| {})]);
        assert!(!ctx.is_aborted());
        ctx.fail(403, "no");
        assert!(ctx.is_aborted());
    }

    #[test]
    fn test_writers_set_content_type_and_append() {
        let mut ctx = Context::new(Request::get("/"), Params::new(), Vec::new());
        ctx.html(200, "<h1>");
        ctx.html(201, "hi</h1>");
        let res = ctx.into_response();
        assert_eq!(res.status(), 201);
        assert_eq!(res.body_text(), Some("<h1>hi</h1>"));
        assert_eq!(res.headers().len(), 1);
        assert_eq!(res.header("Content-Type"), Some("text/html; charset=utf-8"));
    }

    #[test]
    fn test_data_leaves_content_type_alone() {
        let mut ctx = Context::new(Request::get("/"), Params::new(), Vec::new());
        ctx.set_header("Content-Type", "image/png");
        ctx.data(200, &[0x89, 0x50]);
        let res = ctx.into_response();
        assert_eq!(res.header("content-type"), Some("image/png"));
        assert_eq!(res.body(), &[0x89, 0x50]);
    }

    #[test]
    fn test_param_and_query_access() {
        let mut params = Params::new();
        params.insert("id".into(), "42".into());
        let ctx = Context::new(Request::get("/user/42?tab=repos"), params, Vec::new());
        assert_eq!(ctx.param("id"), Some("42"));
        assert_eq!(ctx.param("name"), None);
        assert_eq!(ctx.query("tab").as_deref(), Some("repos"));
        assert_eq!(ctx.path(), "/user/42");
        assert_eq!(ctx.method(), Method::Get);
    }
}
