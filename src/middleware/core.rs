use crate::dispatcher::RequestContext;
use crate::error::{error_status, FrameworkError};

/// What a middleware returns: `Ok(())` lets the chain continue.
pub type MiddlewareResult = Result<(), FrameworkError>;

/// A pre-handler hook that may inspect, annotate or reject a request.
///
/// Middleware runs after the route has matched (so `ctx.params` and
/// `ctx.handler_name` are populated) and before the controller is built.
/// Returning an error short-circuits the chain and the handler never runs.
pub trait Middleware: Send + Sync {
    fn handle(&self, ctx: &mut RequestContext) -> MiddlewareResult;

    /// Name used in logs when this middleware rejects a request.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<F> Middleware for F
where
    F: Fn(&mut RequestContext) -> MiddlewareResult + Send + Sync,
{
    fn handle(&self, ctx: &mut RequestContext) -> MiddlewareResult {
        self(ctx)
    }

    fn name(&self) -> &str {
        "closure"
    }
}

/// Explicit rejection with a status code, e.g. `401` from an auth check.
///
/// The status must be a 4xx or 5xx code; anything else becomes 500.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Abort {
    pub status: u16,
    pub reason: String,
}

impl Abort {
    pub fn new(status: u16, reason: impl Into<String>) -> Self {
        Self {
            status: error_status(status),
            reason: reason.into(),
        }
    }
}

impl From<Abort> for FrameworkError {
    fn from(abort: Abort) -> Self {
        FrameworkError::Aborted {
            status: abort.status,
            reason: abort.reason,
        }
    }
}
