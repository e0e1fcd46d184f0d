use tracing::info;

use super::{Middleware, MiddlewareResult};
use crate::dispatcher::RequestContext;

/// Emits one structured event per matched request before the controller runs.
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn handle(&self, ctx: &mut RequestContext) -> MiddlewareResult {
        info!(
            request_id = %ctx.request_id,
            method = %ctx.method,
            path = %ctx.path,
            handler = ctx.handler_name.as_deref().unwrap_or("-"),
            params = ?ctx.params,
            "Request matched"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "tracing"
    }
}
