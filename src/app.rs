//! Application bootstrap: configuration, templates, services and routes wired
//! into a ready-to-use [`Dispatcher`].

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::config::AppConfig;
use crate::controller::AssetResolver;
use crate::dispatcher::{Dispatcher, RequestContext, Response};
use crate::error::FrameworkError;
use crate::middleware::Middleware;
use crate::router::RouteTable;
use crate::services::Services;
use crate::templating::TemplateEngine;

/// A configured site.
///
/// Built once at startup; the route table is complete before the first
/// request and read-only afterwards.
pub struct App {
    base_dir: PathBuf,
    config: Arc<AppConfig>,
    dispatcher: Dispatcher,
}

impl App {
    /// Load `<base_dir>/config/config.json`, build the template engine and
    /// asset resolver, then let `routes` populate the route table.
    ///
    /// # Errors
    ///
    /// Configuration problems and malformed route patterns. Both are fatal:
    /// the site must not start with a partial route table.
    pub fn bootstrap<F>(base_dir: &Path, services: Services, routes: F) -> Result<Self, FrameworkError>
    where
        F: FnOnce(&mut RouteTable) -> Result<(), FrameworkError>,
    {
        let config = Arc::new(AppConfig::load(base_dir)?);

        let templates_dir = config.templates_dir(base_dir);
        let engine = TemplateEngine::from_dir(&templates_dir, &config.templates.extension);
        let assets = AssetResolver::new(config.public_dir(base_dir));

        let mut table = RouteTable::new();
        routes(&mut table)?;
        table.dump_routes();

        let dispatcher = Dispatcher::new(Arc::new(table), Arc::new(engine), Arc::clone(&config))
            .with_services(services)
            .with_assets(assets);

        info!(
            base_dir = %base_dir.display(),
            templates = %templates_dir.display(),
            site = %config.site.name,
            debug = config.debug,
            "Application ready"
        );
        Ok(Self {
            base_dir: base_dir.to_path_buf(),
            config,
            dispatcher,
        })
    }

    /// Register middleware that runs before every route's own list.
    #[must_use]
    pub fn with_middleware(mut self, mw: Arc<dyn Middleware>) -> Self {
        self.dispatcher.add_middleware(mw);
        self
    }

    /// Handle one request: `(method, path) -> response`.
    #[must_use]
    pub fn handle(&self, method: &str, path: &str) -> Response {
        self.dispatcher.resolve(method, path)
    }

    #[must_use]
    pub fn handle_request(&self, ctx: RequestContext) -> Response {
        self.dispatcher.resolve_request(ctx)
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}
