//! # Dispatcher Module
//!
//! Turns one `(method, path)` pair into a response.
//!
//! ## Request Flow
//!
//! 1. The path is normalized (leading/trailing `/` and the query string removed)
//! 2. The routes registered for the method are tried in registration order;
//!    the first match wins and its captures become `ctx.params`
//! 3. Global middleware, then the route's own middleware, run in order; the
//!    first error or [`Abort`](crate::middleware::Abort) short-circuits
//! 4. A fresh [`Page`](crate::controller::Page) and controller are built and
//!    driven through the controller lifecycle
//! 5. With no match, the other methods' routes are scanned: a hit means 405,
//!    otherwise 404
//!
//! ## Error Handling
//!
//! Nothing raised while handling a request escapes [`Dispatcher::dispatch`].
//! Errors and handler panics become [`Outcome::Error`] and are rendered by the
//! [`ErrorResponder`](crate::responder::ErrorResponder), which hides details
//! unless `debug` is enabled.

mod core;
#[allow(clippy::module_inception)]
mod dispatcher;

pub use self::core::{Outcome, RequestContext, Response};
pub use self::dispatcher::Dispatcher;
