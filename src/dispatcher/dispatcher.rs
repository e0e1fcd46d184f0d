use http::Method;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn};

use super::core::{Outcome, RequestContext, Response};
use crate::config::AppConfig;
use crate::controller::{guard_panics, run_lifecycle, AssetResolver, Page};
use crate::error::FrameworkError;
use crate::middleware::Middleware;
use crate::responder::ErrorResponder;
use crate::router::{normalize_path, RouteTable};
use crate::services::Services;
use crate::templating::Renderer;

/// Resolves `(method, path)` against a [`RouteTable`] and runs the winner.
///
/// The dispatcher owns nothing mutable: the table, renderer, config and
/// services are shared read-only, so one instance can serve concurrent
/// requests from any number of threads.
pub struct Dispatcher {
    table: Arc<RouteTable>,
    renderer: Arc<dyn Renderer>,
    config: Arc<AppConfig>,
    services: Arc<Services>,
    assets: Arc<AssetResolver>,
    responder: ErrorResponder,
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl Dispatcher {
    /// A dispatcher with no services and assets resolved under the
    /// configured `public_dir`.
    pub fn new(table: Arc<RouteTable>, renderer: Arc<dyn Renderer>, config: Arc<AppConfig>) -> Self {
        let responder = ErrorResponder::new(config.debug).with_charset(&config.charset);
        let assets = Arc::new(AssetResolver::new(config.public_dir.clone()));
        Self {
            table,
            renderer,
            config,
            services: Arc::new(Services::new()),
            assets,
            responder,
            middlewares: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_services(mut self, services: Services) -> Self {
        self.services = Arc::new(services);
        self
    }

    #[must_use]
    pub fn with_assets(mut self, assets: AssetResolver) -> Self {
        self.assets = Arc::new(assets);
        self
    }

    /// Add middleware that runs for every matched route, before the route's
    /// own list. Global middleware runs in the order it was added.
    pub fn add_middleware(&mut self, mw: Arc<dyn Middleware>) {
        debug!(middleware = mw.name(), "Global middleware added");
        self.middlewares.push(mw);
    }

    #[must_use]
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    #[must_use]
    pub fn responder(&self) -> &ErrorResponder {
        &self.responder
    }

    /// Match, run middleware, then drive the controller lifecycle.
    ///
    /// Never panics and never returns a raw error: every failure ends up in
    /// the returned [`Outcome`].
    pub fn dispatch(&self, ctx: &mut RequestContext) -> Outcome {
        let span = info_span!(
            "request",
            request_id = %ctx.request_id,
            method = %ctx.method,
            path = %ctx.path
        );
        let _enter = span.enter();

        let Some(matched) = self.table.find(&ctx.method, &ctx.path) else {
            return self.no_match(&ctx.method, &ctx.path);
        };
        let route = matched.route;
        ctx.handler_name = Some(route.handler_name().to_string());
        ctx.params = matched.params;
        debug!(
            pattern = %route.pattern(),
            handler_name = %route.handler_name(),
            params = ?ctx.params,
            "Route matched"
        );

        for mw in self.middlewares.iter().chain(route.middleware()) {
            if let Err(e) = guard_panics(|| mw.handle(ctx)) {
                warn!(middleware = mw.name(), error = %e, "Middleware short-circuited request");
                return Outcome::Error(e);
            }
        }

        let mut page = match Page::new(
            ctx.clone(),
            Arc::clone(&self.config),
            Arc::clone(&self.services),
            Arc::clone(&self.assets),
        ) {
            Ok(page) => page,
            Err(e) => return Outcome::Error(e),
        };
        let mut controller = match guard_panics(|| route.handler().instantiate(&page)) {
            Ok(controller) => controller,
            Err(e) => return Outcome::Error(e),
        };

        let outcome = run_lifecycle(controller.as_mut(), &mut page, self.renderer.as_ref());
        match outcome.result {
            Ok(body) => {
                info!(
                    handler_name = %route.handler_name(),
                    template = %page.template(),
                    bytes = body.len(),
                    "Page rendered"
                );
                Outcome::Handled(Response::html(200, body, &self.config.charset))
            }
            Err(e) => Outcome::Error(e),
        }
    }

    /// 405 when some other method's table matches the path, 404 otherwise.
    fn no_match(&self, method: &Method, path: &str) -> Outcome {
        let allowed = self.table.methods_matching(path, Some(method));
        if allowed.is_empty() {
            debug!(method = %method, path = %path, "No route matched");
            Outcome::NotFound {
                method: method.clone(),
                path: path.to_string(),
            }
        } else {
            debug!(method = %method, path = %path, allowed = ?allowed, "Method not allowed");
            Outcome::MethodNotAllowed {
                method: method.clone(),
                path: path.to_string(),
                allowed,
            }
        }
    }

    /// The transport-facing entry point: `(method, path) -> response`.
    ///
    /// `method` is case-insensitive. A string that is not a valid HTTP
    /// method can never match, so it yields 405 when the path is routed
    /// under any method and 404 otherwise.
    #[must_use]
    pub fn resolve(&self, method: &str, path: &str) -> Response {
        match Method::from_bytes(method.to_ascii_uppercase().as_bytes()) {
            Ok(method) => self.resolve_request(RequestContext::new(method, path)),
            Err(_) => {
                warn!(method = %method, "Invalid HTTP method");
                let path = normalize_path(path.split('?').next().unwrap_or_default()).to_string();
                let allowed = self.table.methods_matching(&path, None);
                let err = if allowed.is_empty() {
                    FrameworkError::NotFound {
                        method: method.to_string(),
                        path,
                    }
                } else {
                    FrameworkError::MethodNotAllowed {
                        method: method.to_string(),
                        path,
                        allowed,
                    }
                };
                self.responder.respond(&err)
            }
        }
    }

    /// Like [`Dispatcher::resolve`] for a context carrying query data and headers.
    #[must_use]
    pub fn resolve_request(&self, mut ctx: RequestContext) -> Response {
        let outcome = self.dispatch(&mut ctx);
        let mut response = outcome.into_response(&self.responder);
        response.set_header("x-request-id", ctx.request_id.to_string());
        response
    }
}
