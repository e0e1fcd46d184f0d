//! RouteTable: per-method, insertion-ordered lists of compiled routes.
//!
//! Registration is append-only and happens during single-threaded startup.
//! After that the table is shared read-only (usually behind an `Arc`) and
//! needs no locking.

use http::Method;
use std::sync::Arc;
use tracing::{debug, info};

use super::compile::{normalize_path, CompiledMatcher, Params, PathCompiler};
use crate::error::FrameworkError;
use crate::middleware::Middleware;
use crate::registry::{HandlerRef, HandlerRegistry};

/// One registered route. Immutable once built.
pub struct CompiledRoute {
    method: Method,
    matcher: CompiledMatcher,
    handler: HandlerRef,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl CompiledRoute {
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        self.matcher.pattern()
    }

    #[must_use]
    pub fn matcher(&self) -> &CompiledMatcher {
        &self.matcher
    }

    #[must_use]
    pub fn handler(&self) -> &HandlerRef {
        &self.handler
    }

    #[must_use]
    pub fn handler_name(&self) -> &str {
        self.handler.name()
    }

    /// Route middleware in execution order.
    #[must_use]
    pub fn middleware(&self) -> &[Arc<dyn Middleware>] {
        &self.middleware
    }
}

impl std::fmt::Debug for CompiledRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledRoute")
            .field("method", &self.method)
            .field("pattern", &self.matcher.pattern())
            .field("handler", &self.handler.name())
            .field("middleware", &self.middleware.len())
            .finish()
    }
}

/// The winning route plus the parameters bound from the path.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub route: Arc<CompiledRoute>,
    pub params: Params,
}

impl MatchResult {
    #[inline]
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Mapping from HTTP method to its ordered route list.
///
/// Methods are kept in first-registration order so that the `allow` list of
/// a 405 response is deterministic.
#[derive(Default)]
pub struct RouteTable {
    methods: Vec<(Method, Vec<Arc<CompiledRoute>>)>,
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `pattern` and append it to `method`'s sequence.
    ///
    /// Identical patterns are not deduplicated; the earlier registration
    /// always wins at dispatch.
    ///
    /// # Errors
    ///
    /// [`FrameworkError::Compile`] for a malformed pattern. Startup should abort.
    pub fn register(
        &mut self,
        method: Method,
        pattern: &str,
        handler: HandlerRef,
        middleware: Vec<Arc<dyn Middleware>>,
    ) -> Result<(), FrameworkError> {
        let matcher = PathCompiler::compile(pattern)?;
        debug!(
            method = %method,
            pattern = %pattern,
            handler_name = %handler.name(),
            params = ?matcher.param_names(),
            middleware_count = middleware.len(),
            "Route registered"
        );
        let route = Arc::new(CompiledRoute {
            method: method.clone(),
            matcher,
            handler,
            middleware,
        });
        match self.methods.iter_mut().find(|(m, _)| *m == method) {
            Some((_, routes)) => routes.push(route),
            None => self.methods.push((method, vec![route])),
        }
        Ok(())
    }

    /// Register a route whose handler is looked up by name in `registry`.
    ///
    /// # Errors
    ///
    /// [`FrameworkError::Configuration`] for an unknown handler name, or
    /// [`FrameworkError::Compile`] for a malformed pattern.
    pub fn register_named(
        &mut self,
        registry: &HandlerRegistry,
        method: Method,
        pattern: &str,
        handler_name: &str,
        middleware: Vec<Arc<dyn Middleware>>,
    ) -> Result<(), FrameworkError> {
        let handler = registry.resolve(handler_name)?;
        self.register(method, pattern, handler, middleware)
    }

    /// `register(GET, ...)` without middleware.
    pub fn get(&mut self, pattern: &str, handler: HandlerRef) -> Result<(), FrameworkError> {
        self.register(Method::GET, pattern, handler, Vec::new())
    }

    /// `register(POST, ...)` without middleware.
    pub fn post(&mut self, pattern: &str, handler: HandlerRef) -> Result<(), FrameworkError> {
        self.register(Method::POST, pattern, handler, Vec::new())
    }

    /// Routes for `method` in registration (= priority) order.
    #[must_use]
    pub fn routes_for(&self, method: &Method) -> &[Arc<CompiledRoute>] {
        self.methods
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, routes)| routes.as_slice())
            .unwrap_or(&[])
    }

    /// First route under `method` whose matcher accepts `path`.
    #[must_use]
    pub fn find(&self, method: &Method, path: &str) -> Option<MatchResult> {
        let path = normalize_path(path);
        self.routes_for(method).iter().find_map(|route| {
            route.matcher.captures(path).map(|params| MatchResult {
                route: Arc::clone(route),
                params,
            })
        })
    }

    /// Every method other than `except` with at least one pattern matching `path`.
    #[must_use]
    pub fn methods_matching(&self, path: &str, except: Option<&Method>) -> Vec<Method> {
        let path = normalize_path(path);
        self.methods
            .iter()
            .filter(|(m, _)| Some(m) != except)
            .filter(|(_, routes)| routes.iter().any(|r| r.matcher.is_match(path)))
            .map(|(m, _)| m.clone())
            .collect()
    }

    /// Methods with at least one route, in first-registration order.
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.methods.iter().map(|(m, _)| m)
    }

    /// Total number of routes across all methods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.methods.iter().map(|(_, routes)| routes.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Log every registered route.
    pub fn dump_routes(&self) {
        info!(routes_count = self.len(), "Routing table loaded");
        for (method, routes) in &self.methods {
            for route in routes {
                info!(
                    method = %method,
                    pattern = %route.pattern(),
                    handler_name = %route.handler_name(),
                    "Route"
                );
            }
        }
    }
}
