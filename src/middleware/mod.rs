//! Middleware capability and the middleware shipped with the framework.
//!
//! The dispatcher runs global middleware (added with
//! [`Dispatcher::add_middleware`](crate::dispatcher::Dispatcher::add_middleware))
//! first, then the matched route's own list, both in registration order.

mod auth;
mod core;
mod tracing;

pub use auth::AuthMiddleware;
pub use self::core::{Abort, Middleware, MiddlewareResult};
pub use self::tracing::TracingMiddleware;
