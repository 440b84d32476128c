//! Handler type erasure.
//!
//! Routes and middleware are the same kind of value: a function that takes
//! the per-request [`Context`]. The router and the group registry hold
//! handlers of *different* closure types in plain `Vec`s and `HashMap`s, so
//! each one is erased behind a trait object once, at registration:
//!
//! ```text
//! |c: &mut Context| c.string(200, "hi")     ← user writes this
//!        ↓ engine.get("/", …)
//! handler::boxed(f)                         ← Arc<dyn Fn(&mut Context)>
//!        ↓ cloned into each request's chain
//! (handler)(&mut ctx)                       ← one virtual call
//! ```
//!
//! Handlers are synchronous. A request's chain runs start to finish on one
//! thread; a handler that blocks, blocks only its own request.

use std::sync::Arc;

use crate::context::Context;

/// A heap-allocated, type-erased handler shared by every request's chain.
///
/// `Arc` makes putting the same middleware into many chains one atomic
/// increment, not a copy.
pub type BoxedHandler = Arc<dyn Fn(&mut Context) + Send + Sync + 'static>;

/// Erase a concrete handler.
pub(crate) fn boxed<F>(handler: F) -> BoxedHandler
where
    F: Fn(&mut Context) + Send + Sync + 'static,
{
    Arc::new(handler)
}
