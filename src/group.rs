//! Route groups.
//!
//! A group is a prefix plus middleware. Groups live in one flat,
//! append-only registry owned by the [`Engine`]; a [`Group`] is just a
//! mutable handle to one registry entry.
//!
//! At dispatch a group's middleware joins the chain iff the request path
//! starts with the group's prefix, as a plain string test. No parent links
//! are consulted, so middleware added to a parent after a child was created
//! still applies to the child's routes. Since `/admin` is a string prefix of
//! `/administrator`, pick group prefixes with that in mind.

use crate::context::Context;
use crate::engine::Engine;
use crate::error::Error;
use crate::handler::{BoxedHandler, boxed};
use crate::method::Method;
use crate::pattern;

/// One registry entry.
pub(crate) struct GroupEntry {
    pub(crate) prefix: String,
    pub(crate) middlewares: Vec<BoxedHandler>,
}

impl GroupEntry {
    pub(crate) fn new(prefix: String) -> Self {
        Self { prefix, middlewares: Vec::new() }
    }

    pub(crate) fn applies_to(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }
}

/// A handle to a route group.
///
/// Obtain one from [`Engine::group`] or [`Group::group`]:
///
/// ```rust
/// use kite::Engine;
///
/// # fn main() -> Result<(), kite::Error> {
/// let mut app = Engine::new();
///
/// let mut v1 = app.group("/v1");
/// v1.middleware(|c| {
///     c.set_header("x-api-version", "1");
///     c.next();
/// });
/// v1.get("/users/:id", |c| {
///     let body = format!("user {}", c.param("id").unwrap_or_default());
///     c.string(200, body);
/// })?;
///
/// app.group("/v2").get("/users", |c| c.string(200, "users v2"))?;
/// # Ok(())
/// # }
/// ```
pub struct Group<'e> {
    engine: &'e mut Engine,
    index: usize,
}

impl<'e> Group<'e> {
    pub(crate) fn new(engine: &'e mut Engine, index: usize) -> Self {
        Self { engine, index }
    }

    fn entry(&mut self) -> &mut GroupEntry {
        &mut self.engine.groups[self.index]
    }

    /// This group's full prefix, ancestors included.
    pub fn prefix(&self) -> &str {
        &self.engine.groups[self.index].prefix
    }

    /// Creates a nested group whose prefix is this prefix + `suffix`.
    pub fn group(&mut self, suffix: &str) -> Group<'_> {
        let index = self.engine.push_group(self.index, suffix);
        Group::new(self.engine, index)
    }

    /// Appends middleware to this group.
    pub fn middleware<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.entry().middlewares.push(boxed(handler));
        self
    }

    /// Registers `handler` at this prefix + `suffix`.
    pub fn route<F>(&mut self, method: Method, suffix: &str, handler: F) -> Result<&mut Self, Error>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        let pattern = pattern::join(self.prefix(), suffix);
        self.engine.router.add_route(method, &pattern, boxed(handler))?;
        Ok(self)
    }

    pub fn get<F>(&mut self, suffix: &str, handler: F) -> Result<&mut Self, Error>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.route(Method::Get, suffix, handler)
    }

    pub fn post<F>(&mut self, suffix: &str, handler: F) -> Result<&mut Self, Error>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.route(Method::Post, suffix, handler)
    }

    pub fn put<F>(&mut self, suffix: &str, handler: F) -> Result<&mut Self, Error>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.route(Method::Put, suffix, handler)
    }

    pub fn patch<F>(&mut self, suffix: &str, handler: F) -> Result<&mut Self, Error>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.route(Method::Patch, suffix, handler)
    }

    pub fn delete<F>(&mut self, suffix: &str, handler: F) -> Result<&mut Self, Error>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.route(Method::Delete, suffix, handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_applies_to_is_string_prefix() {
        let entry = GroupEntry::new("/admin".to_owned());
        assert!(entry.applies_to("/admin"));
        assert!(entry.applies_to("/admin/users"));
        assert!(entry.applies_to("/administrator"));
        assert!(!entry.applies_to("/"));
        assert!(GroupEntry::new(String::new()).applies_to("/anything"));
    }

    #[test]
    fn test_nested_prefixes() {
        let mut engine = Engine::new();
        let mut api = engine.group("/api");
        assert_eq!(api.prefix(), "/api");
        let v1 = api.group("/v1");
        assert_eq!(v1.prefix(), "/api/v1");

        let mut root = engine.group("/");
        assert_eq!(root.group("/admin").prefix(), "/admin");
    }

    #[test]
    fn test_groups_register_in_creation_order() {
        let mut engine = Engine::new();
        engine.group("/a").group("/b");
        engine.group("/c");
        let prefixes: Vec<_> = engine.groups.iter().map(|g| g.prefix.as_str()).collect();
        assert_eq!(prefixes, ["", "/a", "/a/b", "/c"]);
    }

    #[test]
    fn test_group_routes_carry_prefix() {
        let mut engine = Engine::new();
        engine
            .group("/api")
            .get("/users/:id", |_| {})
            .unwrap()
            .post("/users", |_| {})
            .unwrap();

        let get = engine.router.resolve(Method::Get, "/api/users/3").unwrap();
        assert_eq!(get.pattern, "/api/users/:id");
        assert!(engine.router.resolve(Method::Post, "/api/users").is_some());
        assert!(engine.router.resolve(Method::Get, "/users/3").is_none());
    }
}
