//! The engine: router, group registry, and per-request dispatch.
//!
//! # Configure fully, then serve
//!
//! Registration (`route`, `middleware`, `group`) happens on `&mut Engine`
//! during startup. [`Engine::run`] consumes the engine, so once requests are
//! flowing the routes and groups can only be read.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::context::{Context, Params};
use crate::error::Error;
use crate::group::{Group, GroupEntry};
use crate::handler::{BoxedHandler, boxed};
use crate::method::Method;
use crate::pattern;
use crate::request::Request;
use crate::response::Response;
use crate::router::{RouteMatch, Router};
use crate::server::Server;
use crate::trie::Node;

/// Index of the implicit root group (prefix `""`).
const ROOT: usize = 0;

/// The application.
///
/// Holds one [`Router`] and the group registry. The methods that mirror
/// [`Group`]'s act on the implicit root group, whose prefix is empty and
/// whose middleware therefore runs for every request.
pub struct Engine {
    pub(crate) router: Router,
    pub(crate) groups: Vec<GroupEntry>,
    not_found: BoxedHandler,
}

fn not_found(c: &mut Context) {
    let body = format!("404 NOT FOUND: {}\n", c.path());
    c.string(404, body);
}

impl Engine {
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            groups: vec![GroupEntry::new(String::new())],
            not_found: boxed(not_found),
        }
    }

    fn root(&mut self) -> Group<'_> {
        Group::new(self, ROOT)
    }

    /// Appends a registry entry under `parent` and returns its index.
    pub(crate) fn push_group(&mut self, parent: usize, suffix: &str) -> usize {
        let prefix = pattern::join(&self.groups[parent].prefix, suffix);
        debug!(prefix = %prefix, "group created");
        self.groups.push(GroupEntry::new(prefix));
        self.groups.len() - 1
    }

    /// Creates a top-level group with `prefix`.
    pub fn group(&mut self, prefix: &str) -> Group<'_> {
        let index = self.push_group(ROOT, prefix);
        Group::new(self, index)
    }

    /// Appends middleware that runs for every request.
    pub fn middleware<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.root().middleware(handler);
        self
    }

    pub fn route<F>(&mut self, method: Method, pattern: &str, handler: F) -> Result<&mut Self, Error>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.root().route(method, pattern, handler)?;
        Ok(self)
    }

    pub fn get<F>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, Error>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.route(Method::Get, pattern, handler)
    }

    pub fn post<F>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, Error>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.route(Method::Post, pattern, handler)
    }

    pub fn put<F>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, Error>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.route(Method::Put, pattern, handler)
    }

    pub fn patch<F>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, Error>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.route(Method::Patch, pattern, handler)
    }

    pub fn delete<F>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, Error>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.route(Method::Delete, pattern, handler)
    }

    /// Registered route termini for `method`.
    pub fn routes(&self, method: Method) -> Vec<&Node> {
        self.router.routes(method)
    }

    /// The router, for resolving paths without dispatching.
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Dispatches one request through its chain and returns what it wrote.
    ///
    /// The chain is the middleware of every group whose prefix starts the
    /// path, in group creation order, then the matched route's handler or
    /// the built-in `404 NOT FOUND: <path>` step.
    pub fn handle(&self, request: Request) -> Response {
        let method = request.method();
        let path = request.path();

        let mut chain: Vec<BoxedHandler> = self
            .groups
            .iter()
            .filter(|g| g.applies_to(path))
            .flat_map(|g| g.middlewares.iter().cloned())
            .collect();

        let resolved = self
            .router
            .resolve(method, path)
            .and_then(|RouteMatch { pattern, params }| {
                self.router
                    .handler(method, pattern)
                    .map(|handler| (pattern, handler, params))
            });

        let params = match resolved {
            Some((pattern, handler, params)) => {
                trace!(%method, path, pattern, middleware = chain.len(), "dispatch");
                chain.push(Arc::clone(handler));
                params
            }
            None => {
                trace!(%method, path, middleware = chain.len(), "no route");
                chain.push(Arc::clone(&self.not_found));
                Params::new()
            }
        };

        let mut ctx = Context::new(request, params, chain);
        ctx.next();
        ctx.into_response()
    }

    /// Serves this engine on `addr` until SIGTERM / Ctrl-C.
    pub async fn run(self, addr: &str) -> Result<(), Error> {
        Server::bind(addr)?.serve(self).await
    }
}

impl Default for Engine {
    fn default() -> Self { Self::new() }
}
