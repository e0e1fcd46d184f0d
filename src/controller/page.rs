use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::assets::{Asset, AssetResolver};
use crate::config::AppConfig;
use crate::dispatcher::RequestContext;
use crate::error::FrameworkError;
use crate::router::Params;
use crate::services::{DatabaseHandle, Services};

/// Per-request controller state: bound params, template vars, the template
/// name and the js/css lists.
///
/// A `Page` is built fresh for every matched request and dropped when the
/// request ends, which also releases its database connection.
pub struct Page {
    request: RequestContext,
    config: Arc<AppConfig>,
    services: Arc<Services>,
    assets: Arc<AssetResolver>,
    database: Option<DatabaseHandle>,
    vars: Map<String, Value>,
    template: String,
    js: Vec<Asset>,
    css: Vec<Asset>,
}

impl Page {
    /// Build the page for a matched request.
    ///
    /// `lang` and `charset` vars default from the configuration. When a
    /// database connector is configured a connection is opened here.
    ///
    /// # Errors
    ///
    /// [`FrameworkError::ExternalService`] when the database is unreachable.
    pub fn new(
        request: RequestContext,
        config: Arc<AppConfig>,
        services: Arc<Services>,
        assets: Arc<AssetResolver>,
    ) -> Result<Self, FrameworkError> {
        let database = match services.database() {
            Some(connector) => Some(DatabaseHandle::acquire(
                connector.as_ref(),
                config.database.as_ref(),
            )?),
            None => None,
        };

        let mut vars = Map::new();
        vars.insert("lang".into(), Value::String(config.lang.clone()));
        vars.insert("charset".into(), Value::String(config.charset.clone()));

        Ok(Self {
            request,
            config,
            services,
            assets,
            database,
            vars,
            template: String::new(),
            js: Vec::new(),
            css: Vec::new(),
        })
    }

    #[inline]
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.request.params.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn params(&self) -> &Params {
        &self.request.params
    }

    #[must_use]
    pub fn query(&self, name: &str) -> Option<&str> {
        self.request.query(name)
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.request.header(name)
    }

    #[must_use]
    pub fn request(&self) -> &RequestContext {
        &self.request
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub fn services(&self) -> &Services {
        &self.services
    }

    #[must_use]
    pub fn vars(&self) -> &Map<String, Value> {
        &self.vars
    }

    #[must_use]
    pub fn var(&self, key: &str) -> Option<&Value> {
        self.vars.get(key)
    }

    /// Insert or replace a template variable.
    pub fn add_var(&mut self, key: &str, value: impl Into<Value>) {
        self.vars.insert(key.to_string(), value.into());
    }

    /// Insert any serializable value as a template variable.
    ///
    /// # Errors
    ///
    /// [`FrameworkError::Unhandled`] when `value` cannot be represented as JSON.
    pub fn add_serialized_var<T: Serialize>(
        &mut self,
        key: &str,
        value: &T,
    ) -> Result<(), FrameworkError> {
        let value = serde_json::to_value(value).map_err(anyhow::Error::from)?;
        self.vars.insert(key.to_string(), value);
        Ok(())
    }

    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn set_template(&mut self, name: impl Into<String>) {
        self.template = name.into();
    }

    #[must_use]
    pub fn js(&self) -> &[Asset] {
        &self.js
    }

    #[must_use]
    pub fn css(&self) -> &[Asset] {
        &self.css
    }

    /// Queue a script. A missing file is logged and skipped.
    pub fn add_js(&mut self, path: &str) {
        if let Some(asset) = self.assets.resolve(path) {
            self.js.push(asset);
        }
    }

    /// Queue a stylesheet. A missing file is logged and skipped.
    pub fn add_css(&mut self, path: &str) {
        if let Some(asset) = self.assets.resolve(path) {
            self.css.push(asset);
        }
    }

    /// Send mail through the configured mailer; `false` when none is configured
    /// or delivery fails.
    pub fn send_email(&self, to: &str, subject: &str, body: &str, alt_body: Option<&str>) -> bool {
        match self.services.mailer() {
            Some(mailer) => mailer.send_email(to, subject, body, alt_body),
            None => {
                error!(to = %to, "Mailer error: no mail service configured");
                false
            }
        }
    }

    /// Cache lookup; a miss when no cache is configured.
    #[must_use]
    pub fn cache_get(&self, key: &str) -> Option<String> {
        self.services.cache().and_then(|cache| cache.get(key))
    }

    pub fn cache_set(&self, key: &str, value: &str, ttl_secs: u64) {
        match self.services.cache() {
            Some(cache) => cache.set(key, value, ttl_secs),
            None => debug!(key = %key, "No cache configured; value not stored"),
        }
    }

    /// Chat completion through the configured chat service; `None` when none
    /// is configured or the request fails.
    #[must_use]
    pub fn chat_completion(
        &self,
        message: &str,
        model: Option<&str>,
        temperature: Option<f64>,
    ) -> Option<String> {
        match self.services.chat() {
            Some(chat) => chat.chat_completion(message, model, temperature),
            None => {
                error!("Chat error: no chat service configured");
                None
            }
        }
    }

    /// This request's database connection, when a connector is configured.
    pub fn database(&mut self) -> Option<&mut DatabaseHandle> {
        self.database.as_mut()
    }

    /// Vars as handed to the renderer: page vars plus `js`, `css` and `template`.
    pub(crate) fn render_vars(&self) -> Result<Map<String, Value>, FrameworkError> {
        let mut vars = self.vars.clone();
        vars.insert(
            "js".into(),
            serde_json::to_value(&self.js).map_err(anyhow::Error::from)?,
        );
        vars.insert(
            "css".into(),
            serde_json::to_value(&self.css).map_err(anyhow::Error::from)?,
        );
        vars.insert("template".into(), Value::String(self.template.clone()));
        Ok(vars)
    }

    /// Drop everything accumulated for rendering.
    pub(crate) fn discard(&mut self) {
        if !self.vars.is_empty() || !self.js.is_empty() || !self.css.is_empty() {
            warn!(
                vars = self.vars.len(),
                js = self.js.len(),
                css = self.css.len(),
                "Discarding unrendered page state"
            );
        }
        self.vars.clear();
        self.js.clear();
        self.css.clear();
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("path", &self.request.path)
            .field("params", &self.request.params)
            .field("template", &self.template)
            .field("vars", &self.vars.len())
            .field("js", &self.js.len())
            .field("css", &self.css.len())
            .field("database", &self.database.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MemoryCache;
    use http::Method;
    use serde_json::json;

    fn page_with(services: Services, public: &std::path::Path) -> Page {
        let config = AppConfig::from_json_str(r#"{ "lang": "fr", "site": { "name": "T" } }"#).unwrap();
        let mut request = RequestContext::new(Method::GET, "/user/42");
        request.params.insert("id".into(), "42".into());
        Page::new(
            request,
            Arc::new(config),
            Arc::new(services),
            Arc::new(AssetResolver::new(public)),
        )
        .unwrap()
    }

    #[test]
    fn test_defaults_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let page = page_with(Services::new(), dir.path());
        assert_eq!(page.var("lang"), Some(&json!("fr")));
        assert_eq!(page.var("charset"), Some(&json!("UTF-8")));
        assert_eq!(page.param("id"), Some("42"));
        assert_eq!(page.template(), "");
    }

    #[test]
    fn test_missing_assets_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("site.css"), "body{}").unwrap();
        let mut page = page_with(Services::new(), dir.path());
        page.add_css("site.css");
        page.add_css("missing.css");
        page.add_js("missing.js");
        assert_eq!(page.css().len(), 1);
        assert_eq!(page.css()[0].file, "site.css");
        assert!(page.js().is_empty());
    }

    #[test]
    fn test_render_vars_include_assets_and_template() {
        let dir = tempfile::tempdir().unwrap();
        let mut page = page_with(Services::new(), dir.path());
        page.set_template("home");
        page.add_var("title", "Welcome");
        let vars = page.render_vars().unwrap();
        assert_eq!(vars["template"], json!("home"));
        assert_eq!(vars["title"], json!("Welcome"));
        assert_eq!(vars["js"], json!([]));
    }

    #[test]
    fn test_services_absent_are_benign() {
        let dir = tempfile::tempdir().unwrap();
        let page = page_with(Services::new(), dir.path());
        assert!(!page.send_email("a@b.io", "s", "b", None));
        page.cache_set("k", "v", 0);
        assert_eq!(page.cache_get("k"), None);
        assert_eq!(page.chat_completion("hi", None, None), None);
    }

    #[test]
    fn test_cache_through_page() {
        let dir = tempfile::tempdir().unwrap();
        let services = Services::new().with_cache(Arc::new(MemoryCache::new()));
        let page = page_with(services, dir.path());
        page.cache_set("k", "v", 60);
        assert_eq!(page.cache_get("k").as_deref(), Some("v"));
    }
}
