//! # kite
//!
//! A small web framework core: trie routing with `:name` and `*name`
//! segments, route groups with prefix-scoped middleware, and an onion-style
//! handler chain.
//!
//! ## How a request flows
//!
//! 1. Every group whose prefix starts the request path contributes its
//!    middleware, in the order the groups were created.
//! 2. The per-method trie resolves the path. Literal segments win over
//!    dynamic ones; captures land in [`Context::param`].
//! 3. The matched handler (or the built-in `404 NOT FOUND: <path>` step) is
//!    appended to the chain, and [`Context::next`] runs it.
//!
//! Middleware call `next` to run everything downstream and can act again on
//! the way out. [`Context::fail`] stops forward progress and writes a JSON
//! error.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use kite::{Engine, middleware};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), kite::Error> {
//!     let mut app = Engine::new();
//!     app.middleware(middleware::logger());
//!
//!     app.get("/", |c| c.html(200, "<h1>Hello kite</h1>"))?;
//!     app.get("/hello/:name", |c| {
//!         let body = format!("hello {}, you're at {}\n", c.param("name").unwrap_or_default(), c.path());
//!         c.string(200, body);
//!     })?;
//!
//!     let mut admin = app.group("/admin");
//!     admin.middleware(|c| {
//!         if c.header("authorization").is_none() {
//!             c.fail(401, "unauthorized");
//!         }
//!     });
//!     admin.get("/stats", |c| c.json(200, &serde_json::json!({ "routes": 3 })))?;
//!
//!     app.run("127.0.0.1:9999").await
//! }
//! ```
//!
//! Dispatch itself is synchronous and needs no runtime, so tests can drive
//! [`Engine::handle`] with a hand-built [`Request`].

mod context;
mod engine;
mod error;
mod group;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod trie;

pub mod middleware;
pub mod pattern;

pub use context::{Context, Params};
pub use engine::Engine;
pub use error::Error;
pub use group::Group;
pub use handler::BoxedHandler;
pub use method::Method;
pub use pattern::{PatternError, Segment, SegmentKind};
pub use request::Request;
pub use response::Response;
pub use router::{RouteMatch, Router};
pub use server::Server;
pub use trie::Node;
