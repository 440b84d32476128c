//! Trie request router.
//!
//! One trie per HTTP method, plus a flat map from `"{METHOD}-{pattern}"` to
//! the handler registered under that exact pattern string. Lookup is two
//! steps: the trie finds the terminal node, whose stored pattern is the key
//! back into the handler map.
//!
//! Build it once at startup. Nothing here is synchronised; after serving
//! starts the router is only read.

use std::collections::HashMap;

use percent_encoding::percent_decode_str;
use tracing::{debug, warn};

use crate::context::Params;
use crate::error::Error;
use crate::handler::BoxedHandler;
use crate::method::Method;
use crate::pattern::{self, SegmentKind};
use crate::trie::Node;

/// A successful [`Router::resolve`].
#[derive(Debug, Eq, PartialEq)]
pub struct RouteMatch<'r> {
    /// The registered pattern that matched, e.g. `/user/:name`.
    pub pattern: &'r str,
    /// Captures keyed by `:name` / `*name`.
    pub params: Params,
}

/// The application router.
#[derive(Default)]
pub struct Router {
    roots: HashMap<Method, Node>,
    handlers: HashMap<String, BoxedHandler>,
}

fn key(method: Method, pattern: &str) -> String {
    format!("{method}-{pattern}")
}

/// Percent-decodes one capture; invalid UTF-8 is replaced, not rejected.
fn decode(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `method` + `pattern`.
    ///
    /// Registering the same pair again replaces the handler. The pattern is
    /// validated first; a rejected pattern leaves the router untouched.
    pub fn add_route(
        &mut self,
        method: Method,
        pattern: &str,
        handler: BoxedHandler,
    ) -> Result<(), Error> {
        let invalid = |source| Error::Route { method, pattern: pattern.to_owned(), source };

        let segments = pattern::parse(pattern).map_err(invalid)?;
        let root = self.roots.entry(method).or_default();
        let replaced = root.insert(pattern, &segments, 0).map_err(invalid)?;

        if let Some(previous) = replaced {
            warn!(%method, pattern, previous = %previous, "route replaces a pattern sharing its dynamic segments");
            self.handlers.remove(&key(method, &previous));
        }
        self.handlers.insert(key(method, pattern), handler);

        debug!(%method, pattern, "route registered");
        Ok(())
    }

    /// Finds the route for `method` + `path` and binds its captures.
    ///
    /// Every path piece is matched as literal text; captures are
    /// percent-decoded after matching.
    ///
    /// `None` for an unknown method or no structural match; neither is an
    /// error.
    pub fn resolve(&self, method: Method, path: &str) -> Option<RouteMatch<'_>> {
        let request = pattern::split_path(path);
        let node = self.roots.get(&method)?.search(&request, 0)?;
        let matched = node.pattern()?;

        let mut params = Params::new();
        for (i, segment) in pattern::compile(matched).iter().enumerate() {
            match segment.kind() {
                SegmentKind::Literal => {}
                SegmentKind::Param => {
                    params.insert(segment.name().to_owned(), decode(request[i].raw()));
                }
                SegmentKind::Wildcard => {
                    let rest: Vec<&str> = request[i..].iter().map(|s| s.raw()).collect();
                    params.insert(segment.name().to_owned(), decode(&rest.join("/")));
                    break;
                }
            }
        }

        Some(RouteMatch { pattern: matched, params })
    }

    /// The handler registered under exactly this pattern string.
    pub fn handler(&self, method: Method, pattern: &str) -> Option<&BoxedHandler> {
        self.handlers.get(&key(method, pattern))
    }

    /// Every registered route terminus for `method`, in pre-order.
    pub fn routes(&self, method: Method) -> Vec<&Node> {
        self.roots.get(&method).map(Node::terminals).unwrap_or_default()
    }
}
