//! # External Service Seams
//!
//! Mail, cache, chat completion and database access are collaborators the framework consumes
//! but does not implement. Each one is a small trait (the seam) plus a
//! wrapper that applies the framework's failure policy:
//!
//! - mail, cache and chat failures are logged and swallowed; callers get
//!   `false` or `None`
//! - a database that cannot be reached when a request starts is fatal for
//!   that request and surfaces as a 500; query failures after that are
//!   swallowed like the others
//!
//! Services are configured once at bootstrap and shared by every request.
//! Database connections are acquired per request and released when the
//! request's [`Page`](crate::controller::Page) is dropped.

mod cache;
mod chat;
mod database;
mod mail;

pub use cache::{Cache, CacheStore, MemoryCache};
pub use chat::{ChatService, ChatTransport, API_KEY_VAR};
pub use database::{Connection, DatabaseConnector, DatabaseHandle, Row};
pub use mail::{is_valid_email, strip_tags, LogTransport, MailMessage, MailTransport, Mailbox, Mailer};

use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

use crate::config::AppConfig;

/// Failure reported by a collaborator implementation.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ServiceError(pub String);

impl ServiceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// The optional collaborators available to controllers.
#[derive(Clone, Default)]
pub struct Services {
    mailer: Option<Arc<Mailer>>,
    cache: Option<Arc<Cache>>,
    chat: Option<Arc<ChatService>>,
    database: Option<Arc<dyn DatabaseConnector>>,
}

impl Services {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_mailer(mut self, mailer: Mailer) -> Self {
        self.mailer = Some(Arc::new(mailer));
        self
    }

    /// Build a [`Mailer`] from the `mail` config section.
    ///
    /// Without a `mail` section the transport is dropped and mail stays disabled.
    #[must_use]
    pub fn with_mail_transport(self, config: &AppConfig, transport: Arc<dyn MailTransport>) -> Self {
        match &config.mail {
            Some(mail) => self.with_mailer(Mailer::new(mail.clone(), transport)),
            None => {
                warn!("Mail transport supplied but no `mail` configuration section; mail disabled");
                self
            }
        }
    }

    #[must_use]
    pub fn with_cache(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(Arc::new(Cache::new(store)));
        self
    }

    #[must_use]
    pub fn with_chat(mut self, chat: ChatService) -> Self {
        self.chat = Some(Arc::new(chat));
        self
    }

    #[must_use]
    pub fn with_database(mut self, connector: Arc<dyn DatabaseConnector>) -> Self {
        self.database = Some(connector);
        self
    }

    #[must_use]
    pub fn mailer(&self) -> Option<&Mailer> {
        self.mailer.as_deref()
    }

    #[must_use]
    pub fn cache(&self) -> Option<&Cache> {
        self.cache.as_deref()
    }

    #[must_use]
    pub fn chat(&self) -> Option<&ChatService> {
        self.chat.as_deref()
    }

    #[must_use]
    pub fn database(&self) -> Option<&Arc<dyn DatabaseConnector>> {
        self.database.as_ref()
    }
}
