use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::ServiceError;
use crate::config::MailConfig;

#[allow(clippy::expect_used)]
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag regex should be valid"));

#[allow(clippy::expect_used)]
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").expect("email regex should be valid")
});

/// Remove HTML tags, keeping text content.
#[must_use]
pub fn strip_tags(html: &str) -> String {
    TAG_RE.replace_all(html, "").into_owned()
}

#[must_use]
pub fn is_valid_email(address: &str) -> bool {
    EMAIL_RE.is_match(address)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mailbox {
    pub address: String,
    pub name: String,
}

/// A fully prepared HTML message with its plain-text alternative.
#[derive(Debug, Clone)]
pub struct MailMessage {
    pub from: Mailbox,
    pub reply_to: Option<Mailbox>,
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

/// Delivers prepared messages (SMTP client, HTTP mail API, test double...).
pub trait MailTransport: Send + Sync {
    fn send(&self, message: &MailMessage) -> Result<(), ServiceError>;
}

/// Transport that logs messages instead of delivering them. Useful in development.
pub struct LogTransport;

impl MailTransport for LogTransport {
    fn send(&self, message: &MailMessage) -> Result<(), ServiceError> {
        info!(
            to = %message.to,
            from = %message.from.address,
            subject = %message.subject,
            "Mail delivery skipped (log transport)"
        );
        Ok(())
    }
}

/// `send_email` wrapper applying sender defaults from config and swallowing failures.
pub struct Mailer {
    config: MailConfig,
    transport: Arc<dyn MailTransport>,
}

impl Mailer {
    pub fn new(config: MailConfig, transport: Arc<dyn MailTransport>) -> Self {
        Self { config, transport }
    }

    /// Send an HTML email. Returns `false` on any failure; never raises.
    ///
    /// When `alt_body` is `None` (or empty) the plain-text part is the body
    /// with its tags stripped.
    pub fn send_email(&self, to: &str, subject: &str, body: &str, alt_body: Option<&str>) -> bool {
        if !is_valid_email(to) {
            warn!(to = %to, "Invalid email address; message not sent");
            return false;
        }

        let text_body = match alt_body {
            Some(alt) if !alt.is_empty() => alt.to_string(),
            _ => strip_tags(body),
        };
        let reply_to = self
            .config
            .reply_to_address
            .as_ref()
            .filter(|a| !a.is_empty())
            .map(|address| Mailbox {
                address: address.clone(),
                name: self.config.reply_to_name.clone().unwrap_or_default(),
            });
        let message = MailMessage {
            from: Mailbox {
                address: self.config.from_address.clone(),
                name: self.config.from_name.clone(),
            },
            reply_to,
            to: to.to_string(),
            subject: subject.to_string(),
            html_body: body.to_string(),
            text_body,
        };

        match self.transport.send(&message) {
            Ok(()) => true,
            Err(e) => {
                error!(to = %to, error = %e, "Mailer error");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording {
        sent: Mutex<Vec<MailMessage>>,
        fail: bool,
    }

    impl MailTransport for Recording {
        fn send(&self, message: &MailMessage) -> Result<(), ServiceError> {
            if self.fail {
                return Err(ServiceError::new("smtp unreachable"));
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    fn config() -> MailConfig {
        MailConfig {
            from_address: "noreply@example.com".into(),
            from_name: "Example".into(),
            reply_to_address: Some("help@example.com".into()),
            ..MailConfig::default()
        }
    }

    #[test]
    fn test_alt_body_defaults_to_stripped_html() {
        let transport = Arc::new(Recording::default());
        let mailer = Mailer::new(config(), transport.clone());
        assert!(mailer.send_email("a@b.io", "Hi", "<p>Hello <b>there</b></p>", None));

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent[0].text_body, "Hello there");
        assert_eq!(sent[0].from.address, "noreply@example.com");
        assert_eq!(sent[0].reply_to.as_ref().unwrap().address, "help@example.com");
    }

    #[test]
    fn test_invalid_address_returns_false() {
        let transport = Arc::new(Recording::default());
        let mailer = Mailer::new(config(), transport.clone());
        assert!(!mailer.send_email("not-an-address", "Hi", "body", Some("body")));
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn test_transport_failure_is_swallowed() {
        let transport = Arc::new(Recording {
            fail: true,
            ..Recording::default()
        });
        let mailer = Mailer::new(config(), transport);
        assert!(!mailer.send_email("a@b.io", "Hi", "body", None));
    }
}
