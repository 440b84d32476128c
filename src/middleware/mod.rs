//! Built-in middleware.
//!
//! Middleware are ordinary handlers registered with
//! [`Engine::middleware`](crate::Engine::middleware) or
//! [`Group::middleware`](crate::Group::middleware). Work before
//! [`Context::next`] sees the request on the way in; work after it sees what
//! downstream wrote.

use std::time::Instant;

use tracing::info;

use crate::context::Context;

/// Logs one `info` event per request once everything downstream has run.
///
/// Fields: `method`, `path`, `status`, `elapsed_us`.
///
/// ```rust
/// use kite::{Engine, middleware};
///
/// let mut app = Engine::new();
/// app.middleware(middleware::logger());
/// ```
pub fn logger() -> impl Fn(&mut Context) + Send + Sync + 'static {
    |c: &mut Context| {
        let started = Instant::now();
        c.next();
        let elapsed_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        info!(
            method = %c.method(),
            path = c.path(),
            status = c.status_code(),
            elapsed_us,
            "request"
        );
    }
}
