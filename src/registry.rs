//! Handler registry: controller factories keyed by handler name.
//!
//! Routes never instantiate controllers by name at request time. A name is
//! resolved against the registry once, when the route is registered, and the
//! resulting [`HandlerRef`] travels with the compiled route.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::controller::{Controller, Page};
use crate::error::FrameworkError;

/// Builds a fresh controller for one request.
///
/// The factory sees the request's [`Page`] (config, params, services) so a
/// controller can fail construction, e.g. when a required service is missing.
pub type ControllerFactory =
    Arc<dyn Fn(&Page) -> Result<Box<dyn Controller>, FrameworkError> + Send + Sync>;

/// A resolved handler: its name plus the factory that builds its controller.
#[derive(Clone)]
pub struct HandlerRef {
    name: Arc<str>,
    factory: ControllerFactory,
}

impl HandlerRef {
    pub fn new<F>(name: &str, factory: F) -> Self
    where
        F: Fn(&Page) -> Result<Box<dyn Controller>, FrameworkError> + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name),
            factory: Arc::new(factory),
        }
    }

    /// Shorthand for controllers that are plain `Default` values.
    #[must_use]
    pub fn of<C>(name: &str) -> Self
    where
        C: Controller + Default + 'static,
    {
        Self::new(name, |_page| Ok(Box::new(C::default())))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instantiate(&self, page: &Page) -> Result<Box<dyn Controller>, FrameworkError> {
        (self.factory)(page)
    }
}

impl fmt::Debug for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRef").field("name", &self.name).finish()
    }
}

/// Name → factory map populated during startup.
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<String, HandlerRef>,
}

impl HandlerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `name`, replacing any previous one.
    pub fn insert<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&Page) -> Result<Box<dyn Controller>, FrameworkError> + Send + Sync + 'static,
    {
        let handler = HandlerRef::new(name, factory);
        if self.handlers.insert(name.to_string(), handler).is_some() {
            warn!(handler_name = %name, "Replaced existing handler factory");
        } else {
            debug!(
                handler_name = %name,
                total_handlers = self.handlers.len(),
                "Handler factory registered"
            );
        }
    }

    /// Register a `Default`-constructible controller type under `name`.
    pub fn insert_default<C>(&mut self, name: &str)
    where
        C: Controller + Default + 'static,
    {
        self.insert(name, |_page| Ok(Box::new(C::default())));
    }

    /// Resolve a handler name.
    ///
    /// # Errors
    ///
    /// [`FrameworkError::Configuration`] when no factory is registered under `name`.
    pub fn resolve(&self, name: &str) -> Result<HandlerRef, FrameworkError> {
        self.handlers.get(name).cloned().ok_or_else(|| {
            FrameworkError::configuration(format!("Controller `{name}` not found."))
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
