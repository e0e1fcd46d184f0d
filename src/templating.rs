//! Template rendering capability and its minijinja implementation.
//!
//! The controller lifecycle only ever sees [`Renderer`]: a template name plus
//! the page vars in, a string out. [`TemplateEngine`] is the default
//! implementation, loading `<name>.<extension>` from a template directory.

use minijinja::{path_loader, Environment, ErrorKind};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

use crate::error::FrameworkError;
use crate::slug::slugify;

/// `render(name, vars) -> string`.
pub trait Renderer: Send + Sync {
    fn render(&self, name: &str, vars: &Map<String, Value>) -> Result<String, FrameworkError>;
}

impl<F> Renderer for F
where
    F: Fn(&str, &Map<String, Value>) -> Result<String, FrameworkError> + Send + Sync,
{
    fn render(&self, name: &str, vars: &Map<String, Value>) -> Result<String, FrameworkError> {
        self(name, vars)
    }
}

/// minijinja environment with the framework's template helpers installed.
pub struct TemplateEngine {
    env: Environment<'static>,
    extension: String,
}

impl TemplateEngine {
    /// Load templates lazily from `dir`.
    pub fn from_dir(dir: &Path, extension: &str) -> Self {
        let mut env = Self::base_env();
        env.set_loader(path_loader(dir));
        debug!(dir = %dir.display(), extension = %extension, "Template engine ready");
        Self {
            env,
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    /// Build an engine from in-memory `(name, source)` pairs. Names are the
    /// bare template names; the extension is added here.
    ///
    /// # Errors
    ///
    /// [`FrameworkError::Configuration`] when a template fails to parse.
    pub fn from_sources<I, N, S>(extension: &str, sources: I) -> Result<Self, FrameworkError>
    where
        I: IntoIterator<Item = (N, S)>,
        N: AsRef<str>,
        S: Into<String>,
    {
        let mut engine = Self {
            env: Self::base_env(),
            extension: extension.trim_start_matches('.').to_string(),
        };
        for (name, source) in sources {
            let file = engine.file_name(name.as_ref());
            engine
                .env
                .add_template_owned(file.clone(), source.into())
                .map_err(|e| {
                    FrameworkError::configuration(format!("Template `{file}` is invalid: {e}"))
                })?;
        }
        Ok(engine)
    }

    fn base_env() -> Environment<'static> {
        let mut env = Environment::new();
        env.add_function(
            "slugify",
            |text: String, separator: Option<String>, extra: Option<String>| {
                slugify(
                    &text,
                    separator.as_deref().unwrap_or("-"),
                    extra.as_deref().unwrap_or(""),
                )
            },
        );
        env
    }

    fn file_name(&self, name: &str) -> String {
        if self.extension.is_empty() {
            name.to_string()
        } else {
            format!("{name}.{}", self.extension)
        }
    }
}

impl Renderer for TemplateEngine {
    fn render(&self, name: &str, vars: &Map<String, Value>) -> Result<String, FrameworkError> {
        let file = self.file_name(name);
        let template = self.env.get_template(&file).map_err(|e| match e.kind() {
            ErrorKind::TemplateNotFound => {
                FrameworkError::configuration(format!("Template `{file}` not found."))
            }
            _ => FrameworkError::external("templating", e.to_string()),
        })?;
        template
            .render(vars)
            .map_err(|e| FrameworkError::external("templating", e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_renders_in_memory_template() {
        let engine =
            TemplateEngine::from_sources("html", [("hello", "<h1>Hello {{ name }}!</h1>")]).unwrap();
        let out = engine.render("hello", &vars(json!({ "name": "World" }))).unwrap();
        assert_eq!(out, "<h1>Hello World!</h1>");
    }

    #[test]
    fn test_slugify_function_is_available() {
        let engine = TemplateEngine::from_sources(
            "txt",
            [("slug", "{{ slugify(title) }}|{{ slugify(title, '_') }}")],
        )
        .unwrap();
        let out = engine.render("slug", &vars(json!({ "title": "Été Indien" }))).unwrap();
        assert_eq!(out, "ete-indien|ete_indien");
    }

    #[test]
    fn test_missing_template_is_configuration_error() {
        let engine = TemplateEngine::from_sources("html", Vec::<(&str, &str)>::new()).unwrap();
        let err = engine.render("nope", &Map::new()).unwrap_err();
        assert_eq!(err.to_string(), "Template `nope.html` not found.");
    }

    #[test]
    fn test_loads_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("page.html"), "{{ lang }}/{{ charset }}").unwrap();
        let engine = TemplateEngine::from_dir(dir.path(), ".html");
        let out = engine
            .render("page", &vars(json!({ "lang": "fr", "charset": "UTF-8" })))
            .unwrap();
        assert_eq!(out, "fr/UTF-8");
    }
}
