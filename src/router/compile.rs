//! PathCompiler: turns `{name}` route patterns into anchored regex matchers.
//!
//! Compilation runs once per pattern at registration time. Dispatch only ever
//! calls [`CompiledMatcher::captures`] on an already-built matcher.

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::FrameworkError;

/// Parameter name → literal captured value.
pub type Params = HashMap<String, String>;

/// Strip leading and trailing `/` from a request path or a route pattern.
///
/// Both sides of a match are normalised the same way, so `"/user/42/"`,
/// `"user/42"` and `"/user/42"` are equivalent and `"/"` becomes `""`.
#[inline]
#[must_use]
pub fn normalize_path(path: &str) -> &str {
    path.trim_matches('/')
}

/// An anchored matcher plus the parameter names in capture order.
#[derive(Debug, Clone)]
pub struct CompiledMatcher {
    pattern: String,
    regex: Regex,
    param_names: Vec<Arc<str>>,
}

impl CompiledMatcher {
    /// The pattern as it was registered.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Parameter names in left-to-right occurrence order.
    #[must_use]
    pub fn param_names(&self) -> &[Arc<str>] {
        &self.param_names
    }

    #[must_use]
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Full-string match against an already-normalised path.
    #[inline]
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Match a normalised path and bind captures to parameter names by position.
    #[must_use]
    pub fn captures(&self, path: &str) -> Option<Params> {
        let caps = self.regex.captures(path)?;
        let mut params = Params::with_capacity(self.param_names.len());
        for (i, name) in self.param_names.iter().enumerate() {
            if let Some(val) = caps.get(i + 1) {
                params.insert(name.to_string(), val.as_str().to_string());
            }
        }
        Some(params)
    }
}

/// Builds [`CompiledMatcher`]s from route patterns.
pub struct PathCompiler;

impl PathCompiler {
    /// Compile a `/`-separated pattern with `{name}` placeholders.
    ///
    /// Each placeholder segment becomes `([^/]+)`; literal segments are
    /// escaped and must match verbatim. The resulting regex is anchored on
    /// both ends.
    ///
    /// # Errors
    ///
    /// [`FrameworkError::Compile`] when a parameter name repeats, a placeholder
    /// name is empty or contains characters outside `[A-Za-z0-9_]`, a segment
    /// mixes literal text with braces, or the pattern contains an empty segment.
    ///
    /// # Example
    ///
    /// ```
    /// use trellis::router::PathCompiler;
    ///
    /// let matcher = PathCompiler::compile("/user/{id}").unwrap();
    /// let params = matcher.captures("user/42").unwrap();
    /// assert_eq!(params["id"], "42");
    /// ```
    pub fn compile(pattern: &str) -> Result<CompiledMatcher, FrameworkError> {
        let normalized = normalize_path(pattern);

        let mut regex_src = String::with_capacity(normalized.len() + 8);
        regex_src.push('^');
        let mut param_names: Vec<Arc<str>> = Vec::with_capacity(normalized.matches('{').count());
        let mut seen = HashSet::new();

        if !normalized.is_empty() {
            for (idx, segment) in normalized.split('/').enumerate() {
                if idx > 0 {
                    regex_src.push('/');
                }
                if segment.is_empty() {
                    return Err(FrameworkError::compile(pattern, "empty path segment"));
                }
                match placeholder_name(segment) {
                    Some(name) => {
                        if name.is_empty()
                            || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                        {
                            return Err(FrameworkError::compile(
                                pattern,
                                format!("invalid parameter name '{name}'"),
                            ));
                        }
                        if !seen.insert(name) {
                            return Err(FrameworkError::compile(
                                pattern,
                                format!("duplicate parameter name '{name}'"),
                            ));
                        }
                        regex_src.push_str("([^/]+)");
                        param_names.push(Arc::from(name));
                    }
                    None if segment.contains(['{', '}']) => {
                        return Err(FrameworkError::compile(
                            pattern,
                            format!("segment '{segment}' must be a literal or a single {{name}}"),
                        ));
                    }
                    None => regex_src.push_str(&regex::escape(segment)),
                }
            }
        }

        regex_src.push('$');
        let regex = Regex::new(&regex_src)
            .map_err(|e| FrameworkError::compile(pattern, e.to_string()))?;

        Ok(CompiledMatcher {
            pattern: pattern.to_string(),
            regex,
            param_names,
        })
    }
}

fn placeholder_name(segment: &str) -> Option<&str> {
    segment.strip_prefix('{')?.strip_suffix('}')
}
