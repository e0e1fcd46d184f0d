use super::{Abort, Middleware, MiddlewareResult};
use crate::dispatcher::RequestContext;

/// Rejects requests whose `authorization` header is not exactly `token`.
pub struct AuthMiddleware {
    token: String,
}

impl AuthMiddleware {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl Middleware for AuthMiddleware {
    fn handle(&self, ctx: &mut RequestContext) -> MiddlewareResult {
        match ctx.header("authorization") {
            Some(h) if h == self.token => Ok(()),
            _ => Err(Abort::new(401, "Unauthorized").into()),
        }
    }

    fn name(&self) -> &str {
        "auth"
    }
}
