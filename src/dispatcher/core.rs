//! Request/response values that cross the dispatcher boundary.

use http::Method;
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::error::FrameworkError;
use crate::ids::RequestId;
use crate::responder::ErrorResponder;
use crate::router::{normalize_path, Params};

/// Everything the transport layer hands over for one request, plus what
/// routing adds to it (`handler_name`, `params`) before middleware runs.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: RequestId,
    pub method: Method,
    /// Normalized: no leading or trailing `/`, no query string.
    pub path: String,
    pub query: HashMap<String, String>,
    /// Header names as received; lookups are case-insensitive.
    pub headers: Vec<(String, String)>,
    /// Set once a route matches.
    pub handler_name: Option<String>,
    pub params: Params,
    /// Free-form values middleware can attach for later middleware or controllers.
    pub attributes: Map<String, Value>,
}

impl RequestContext {
    /// Build a context from a raw path. Anything after `?` is parsed as the
    /// query string.
    pub fn new(method: Method, raw_path: &str) -> Self {
        let (path, query) = match raw_path.split_once('?') {
            Some((path, query)) => (path, parse_query(query)),
            None => (raw_path, HashMap::new()),
        };
        Self {
            request_id: RequestId::generate(),
            method,
            path: normalize_path(path).to_string(),
            query,
            headers: Vec::new(),
            handler_name: None,
            params: Params::new(),
            attributes: Map::new(),
        }
    }

    #[must_use]
    pub fn with_query(mut self, name: &str, value: &str) -> Self {
        self.query.insert(name.to_string(), value.to_string());
        self
    }

    /// Add a header. An `x-request-id` holding a valid ULID replaces the
    /// generated request id.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if name.eq_ignore_ascii_case("x-request-id") {
            if let Some(id) = RequestId::from_header(value) {
                self.request_id = id;
            }
        }
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// First header named `name`, ignoring case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn set_attribute(&mut self, key: &str, value: impl Into<Value>) {
        self.attributes.insert(key.to_string(), value.into());
    }
}

fn parse_query(query: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Status, headers and body handed back to the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Response {
    #[must_use]
    pub fn html(status: u16, body: String, charset: &str) -> Self {
        Self::with_content_type(status, body, format!("text/html; charset={charset}"))
    }

    #[must_use]
    pub fn text(status: u16, body: String, charset: &str) -> Self {
        Self::with_content_type(status, body, format!("text/plain; charset={charset}"))
    }

    fn with_content_type(status: u16, body: String, content_type: String) -> Self {
        Self {
            status,
            headers: vec![("content-type".to_string(), content_type)],
            body,
        }
    }

    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Set a header, replacing any existing value with the same name.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            Some(slot) => slot.1 = value,
            None => self.headers.push((name.to_string(), value)),
        }
    }
}

/// Result of dispatching one request.
#[derive(Debug)]
pub enum Outcome {
    Handled(Response),
    NotFound {
        method: Method,
        path: String,
    },
    MethodNotAllowed {
        method: Method,
        path: String,
        allowed: Vec<Method>,
    },
    Error(FrameworkError),
}

impl Outcome {
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::Handled(response) => response.status,
            Self::NotFound { .. } => 404,
            Self::MethodNotAllowed { .. } => 405,
            Self::Error(e) => e.status(),
        }
    }

    /// Turn the outcome into a response, going through `responder` for
    /// everything but `Handled`.
    #[must_use]
    pub fn into_response(self, responder: &ErrorResponder) -> Response {
        let error = match self {
            Self::Handled(response) => return response,
            Self::NotFound { method, path } => FrameworkError::NotFound {
                method: method.to_string(),
                path,
            },
            Self::MethodNotAllowed {
                method,
                path,
                allowed,
            } => FrameworkError::MethodNotAllowed {
                method: method.to_string(),
                path,
                allowed,
            },
            Self::Error(e) => e,
        };
        responder.respond(&error)
    }
}
