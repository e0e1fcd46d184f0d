//! Maps request-time errors to a status and body.

use http::StatusCode;
use std::error::Error as _;
use tracing::{error, warn};

use crate::dispatcher::Response;
use crate::error::FrameworkError;

/// Turns a [`FrameworkError`] into the final response.
///
/// With `debug` off the body is a fixed `"<status> - <reason>"` line, so no
/// internal detail leaks. With `debug` on the body is the error message
/// followed by its source chain.
#[derive(Debug, Clone)]
pub struct ErrorResponder {
    debug: bool,
    charset: String,
}

impl ErrorResponder {
    #[must_use]
    pub fn new(debug: bool) -> Self {
        Self {
            debug,
            charset: "UTF-8".to_string(),
        }
    }

    #[must_use]
    pub fn with_charset(mut self, charset: &str) -> Self {
        self.charset = charset.to_string();
        self
    }

    #[must_use]
    pub fn debug(&self) -> bool {
        self.debug
    }

    #[must_use]
    pub fn respond(&self, err: &FrameworkError) -> Response {
        let status = err.status();
        if status >= 500 {
            error!(status, kind = ?err.kind(), error = %err, "Request failed");
        } else {
            warn!(status, kind = ?err.kind(), error = %err, "Request rejected");
        }

        let body = if self.debug {
            debug_body(err)
        } else {
            generic_body(status)
        };
        let mut response = Response::text(status, body, &self.charset);

        if let FrameworkError::MethodNotAllowed { allowed, .. } = err {
            let allow = allowed
                .iter()
                .map(|m| m.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            response.set_header("allow", allow);
        }
        response
    }
}

/// Fixed message for `status`.
#[must_use]
pub fn generic_body(status: u16) -> String {
    match status {
        404 => "404 - Page not found".to_string(),
        405 => "405 - Method Not Allowed".to_string(),
        500 => "500 - Internal Server Error".to_string(),
        other => {
            let reason = StatusCode::from_u16(other)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("Error");
            format!("{other} - {reason}")
        }
    }
}

fn debug_body(err: &FrameworkError) -> String {
    let mut body = err.to_string();
    let mut source = err.source();
    let mut first = true;
    while let Some(cause) = source {
        if first {
            body.push_str("\n\nCaused by:");
            first = false;
        }
        body.push_str("\n    ");
        body.push_str(&cause.to_string());
        source = cause.source();
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    #[test]
    fn test_generic_bodies() {
        let responder = ErrorResponder::new(false);
        let response = responder.respond(&FrameworkError::missing_template());
        assert_eq!(response.status, 500);
        assert_eq!(response.body, "500 - Internal Server Error");

        let not_found = FrameworkError::NotFound {
            method: "GET".into(),
            path: "missing".into(),
        };
        assert_eq!(responder.respond(&not_found).body, "404 - Page not found");

        let aborted = FrameworkError::Aborted {
            status: 401,
            reason: "Unauthorized".into(),
        };
        assert_eq!(responder.respond(&aborted).body, "401 - Unauthorized");
    }

    #[test]
    fn test_debug_body_is_message() {
        let responder = ErrorResponder::new(true);
        let response = responder.respond(&FrameworkError::missing_template());
        assert_eq!(response.status, 500);
        assert_eq!(response.body, "No template defined for the controller.");
    }

    #[test]
    fn test_debug_body_includes_cause_chain() {
        let inner = std::io::Error::other("disk on fire");
        let err = FrameworkError::from(anyhow::Error::new(inner).context("loading page"));
        let body = ErrorResponder::new(true).respond(&err).body;
        assert!(body.starts_with("loading page"));
        assert!(body.contains("Caused by:"));
        assert!(body.contains("disk on fire"));
    }

    #[test]
    fn test_method_not_allowed_sets_allow_header() {
        let err = FrameworkError::MethodNotAllowed {
            method: "POST".into(),
            path: "contact".into(),
            allowed: vec![Method::GET, Method::PUT],
        };
        let response = ErrorResponder::new(false).respond(&err);
        assert_eq!(response.status, 405);
        assert_eq!(response.get_header("allow"), Some("GET, PUT"));
    }
}
