//! Error taxonomy shared by route registration, dispatch and the controller lifecycle.
//!
//! Registration-time errors ([`FrameworkError::Compile`], and
//! [`FrameworkError::Configuration`] raised while wiring routes) are fatal and
//! abort startup. Everything raised while handling a request is caught at the
//! dispatcher boundary and turned into a status + body by
//! [`ErrorResponder`](crate::responder::ErrorResponder).

use http::{Method, StatusCode};
use thiserror::Error;

/// Message used when a controller reaches `render` without a template.
pub const NO_TEMPLATE_MESSAGE: &str = "No template defined for the controller.";

/// Every error the framework can raise or forward.
#[derive(Debug, Error)]
pub enum FrameworkError {
    /// Malformed route pattern. Raised by `PathCompiler::compile`.
    #[error("invalid route pattern '{pattern}': {reason}")]
    Compile {
        /// The pattern as registered
        pattern: String,
        /// Why compilation failed
        reason: String,
    },

    /// No route matches the path under any method.
    #[error("no route matches {method} /{path}")]
    NotFound { method: String, path: String },

    /// The path is routed, but not for this method.
    #[error("method {method} is not allowed for /{path}")]
    MethodNotAllowed {
        method: String,
        path: String,
        /// Methods whose tables contain a matching pattern
        allowed: Vec<Method>,
    },

    /// Missing template, missing config key, unknown handler name, ...
    #[error("{0}")]
    Configuration(String),

    /// Failure reported by a mail, cache, database or templating collaborator.
    #[error("{service} error: {message}")]
    ExternalService {
        service: &'static str,
        message: String,
    },

    /// A middleware rejected the request with an explicit status. Only 4xx
    /// and 5xx codes are honoured; anything else is answered with 500.
    #[error("request aborted ({status}): {reason}")]
    Aborted { status: u16, reason: String },

    /// Catch-all for anything else raised by controllers or middleware.
    #[error(transparent)]
    Unhandled(#[from] anyhow::Error),
}

/// Coarse classification of a [`FrameworkError`], used for status mapping and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Compile,
    NotFound,
    MethodNotAllowed,
    Configuration,
    ExternalService,
    Aborted,
    Unhandled,
}

impl FrameworkError {
    pub fn compile(pattern: &str, reason: impl Into<String>) -> Self {
        Self::Compile {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn external(service: &'static str, message: impl Into<String>) -> Self {
        Self::ExternalService {
            service,
            message: message.into(),
        }
    }

    /// The error raised when `render` runs with an empty template name.
    #[must_use]
    pub fn missing_template() -> Self {
        Self::Configuration(NO_TEMPLATE_MESSAGE.to_string())
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Compile { .. } => ErrorKind::Compile,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::MethodNotAllowed { .. } => ErrorKind::MethodNotAllowed,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::ExternalService { .. } => ErrorKind::ExternalService,
            Self::Aborted { .. } => ErrorKind::Aborted,
            Self::Unhandled(_) => ErrorKind::Unhandled,
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::MethodNotAllowed { .. } => 405,
            Self::Aborted { status, .. } => error_status(*status),
            Self::Compile { .. }
            | Self::Configuration(_)
            | Self::ExternalService { .. }
            | Self::Unhandled(_) => 500,
        }
    }
}

/// `status` when it is a client or server error code, otherwise 500.
#[must_use]
pub fn error_status(status: u16) -> u16 {
    match StatusCode::from_u16(status) {
        Ok(code) if code.is_client_error() || code.is_server_error() => status,
        _ => 500,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let not_found = FrameworkError::NotFound {
            method: "GET".into(),
            path: "missing".into(),
        };
        assert_eq!(not_found.status(), 404);

        let not_allowed = FrameworkError::MethodNotAllowed {
            method: "POST".into(),
            path: "contact".into(),
            allowed: vec![Method::GET],
        };
        assert_eq!(not_allowed.status(), 405);

        assert_eq!(FrameworkError::missing_template().status(), 500);
        assert_eq!(FrameworkError::compile("/a/{x}/{x}", "dup").status(), 500);
        assert_eq!(FrameworkError::external("cache", "down").status(), 500);
        assert_eq!(
            FrameworkError::from(anyhow::anyhow!("boom")).kind(),
            ErrorKind::Unhandled
        );
    }

    #[test]
    fn test_missing_template_message_is_bare() {
        assert_eq!(
            FrameworkError::missing_template().to_string(),
            NO_TEMPLATE_MESSAGE
        );
    }

    #[test]
    fn test_aborted_keeps_status() {
        let err = FrameworkError::Aborted {
            status: 401,
            reason: "Unauthorized".into(),
        };
        assert_eq!(err.status(), 401);
        assert_eq!(err.kind(), ErrorKind::Aborted);
    }

    #[test]
    fn test_aborted_with_non_error_status_is_500() {
        for status in [0, 99, 200, 302, 600] {
            let err = FrameworkError::Aborted {
                status,
                reason: "odd".into(),
            };
            assert_eq!(err.status(), 500, "status {status}");
        }
        assert_eq!(error_status(503), 503);
    }
}
