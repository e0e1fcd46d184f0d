//! # Application Configuration
//!
//! Site configuration is read from `<base>/config/config.json` and then
//! overlaid with environment variables, so secrets can live outside the
//! JSON file. A `.env` file in the base directory is loaded first when
//! present; variables already set in the process environment win over it.
//!
//! ## Environment overrides
//!
//! | Variable | Config key |
//! |---|---|
//! | `MYSQL_HOST` / `MYSQL_DATABASE` / `MYSQL_USER` / `MYSQL_PASSWORD` | `database.host` / `database.dbname` / `database.user` / `database.password` |
//! | `MAIL_HOST` / `MAIL_PORT` / `MAIL_USERNAME` / `MAIL_PASSWORD` / `MAIL_ENCRYPTION` | `mail.*` |
//! | `REDIS_HOST` / `REDIS_PORT` | `redis.host` / `redis.port` |
//! | `OPENAI_API_URL` / `OPENAI_DEFAULT_MODEL` / `OPENAI_DEFAULT_TEMPERATURE` | `openai.*` |
//!
//! An override creates its section when the JSON file does not have one.
//! Ports may be written as numbers or numeric strings. Keys a section does
//! not know about are kept in its `extra` map.
//!
//! ## Example
//!
//! ```json
//! {
//!   "debug": false,
//!   "lang": "en",
//!   "charset": "UTF-8",
//!   "site": { "name": "My Site" },
//!   "redis": { "host": "127.0.0.1", "port": 6379 }
//! }
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::FrameworkError;

/// Path of the JSON file relative to the site base directory.
pub const CONFIG_FILE: &str = "config/config.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub debug: bool,
    #[serde(default = "default_lang")]
    pub lang: String,
    #[serde(default = "default_charset")]
    pub charset: String,
    pub site: SiteConfig,
    #[serde(default)]
    pub mail: Option<MailConfig>,
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub redis: Option<RedisConfig>,
    #[serde(default)]
    pub openai: Option<OpenAiConfig>,
    #[serde(default)]
    pub templates: TemplateConfig,
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,
    /// Any other top-level keys, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default = "default_mail_host")]
    pub host: String,
    #[serde(default = "default_mail_port", deserialize_with = "port_number")]
    pub port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_mail_encryption")]
    pub encryption: String,
    #[serde(default)]
    pub from_address: String,
    #[serde(default)]
    pub from_name: String,
    #[serde(default)]
    pub reply_to_address: Option<String>,
    #[serde(default)]
    pub reply_to_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_host")]
    pub host: String,
    #[serde(default)]
    pub dbname: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RedisConfig {
    #[serde(default = "default_redis_host")]
    pub host: String,
    #[serde(default = "default_redis_port", deserialize_with = "port_number")]
    pub port: u16,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Chat-completion API settings. The API key is read from `OPENAI_API_KEY`
/// when the chat service is built, never from the JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default = "default_openai_url")]
    pub api_url: String,
    #[serde(default = "default_openai_model")]
    pub default_model: String,
    #[serde(default = "default_openai_temperature", deserialize_with = "float_number")]
    pub default_temperature: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_url: default_openai_url(),
            default_model: default_openai_model(),
            default_temperature: default_openai_temperature(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Template directory, relative to the site base directory.
    #[serde(default = "default_templates_dir")]
    pub dir: PathBuf,
    /// Extension appended to template names, without the dot.
    #[serde(default = "default_template_extension")]
    pub extension: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            dir: default_templates_dir(),
            extension: default_template_extension(),
        }
    }
}

fn default_lang() -> String {
    "en".to_string()
}
fn default_charset() -> String {
    "UTF-8".to_string()
}
fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}
fn default_templates_dir() -> PathBuf {
    PathBuf::from("templates")
}
fn default_template_extension() -> String {
    "html".to_string()
}
fn default_mail_host() -> String {
    "localhost".to_string()
}
fn default_mail_port() -> u16 {
    587
}
fn default_mail_encryption() -> String {
    "tls".to_string()
}
fn default_db_host() -> String {
    "localhost".to_string()
}
fn default_redis_host() -> String {
    "127.0.0.1".to_string()
}
fn default_redis_port() -> u16 {
    6379
}
fn default_openai_url() -> String {
    "https://api.openai.com/v1/".to_string()
}
fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_openai_temperature() -> f64 {
    0.7
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString<T> {
    Number(T),
    Text(String),
}

/// Accepts `6379` as well as `"6379"`.
fn port_number<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::<u16>::deserialize(deserializer)? {
        NumberOrString::Number(port) => Ok(port),
        NumberOrString::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid port `{text}`"))),
    }
}

fn float_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::<f64>::deserialize(deserializer)? {
        NumberOrString::Number(value) => Ok(value),
        NumberOrString::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid number `{text}`"))),
    }
}

impl AppConfig {
    /// Load `.env`, then `config/config.json`, then apply environment overrides.
    ///
    /// # Errors
    ///
    /// [`FrameworkError::Configuration`] when the file is missing, unreadable,
    /// not valid JSON, or lacks a required key such as `site.name`.
    pub fn load(base_dir: &Path) -> Result<Self, FrameworkError> {
        let dotenv_path = base_dir.join(".env");
        if dotenv_path.is_file() {
            if let Err(e) = dotenv::from_path(&dotenv_path) {
                return Err(FrameworkError::configuration(format!(
                    "Failed to load {}: {e}",
                    dotenv_path.display()
                )));
            }
            debug!(path = %dotenv_path.display(), "Loaded .env file");
        }

        let config_path = base_dir.join(CONFIG_FILE);
        if !config_path.is_file() {
            return Err(FrameworkError::configuration(format!(
                "Configuration file does not exist at: {}",
                config_path.display()
            )));
        }
        let raw = fs::read_to_string(&config_path).map_err(|e| {
            FrameworkError::configuration(format!(
                "Failed to read configuration file: {}: {e}",
                config_path.display()
            ))
        })?;

        let mut config = Self::from_json_str(&raw)?;
        config.apply_env_overrides(|key| env::var(key).ok());

        info!(
            path = %config_path.display(),
            debug = config.debug,
            site = %config.site.name,
            mail = config.mail.is_some(),
            database = config.database.is_some(),
            redis = config.redis.is_some(),
            openai = config.openai.is_some(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Parse a configuration document without touching the environment.
    ///
    /// # Errors
    ///
    /// [`FrameworkError::Configuration`] for invalid JSON, a non-object root,
    /// or missing required keys.
    pub fn from_json_str(raw: &str) -> Result<Self, FrameworkError> {
        let value: Value = serde_json::from_str(raw).map_err(|e| {
            FrameworkError::configuration(format!("Error parsing configuration file: {e}"))
        })?;
        if !value.is_object() {
            return Err(FrameworkError::configuration(
                "Configuration file must contain a JSON object.",
            ));
        }
        serde_json::from_value(value)
            .map_err(|e| FrameworkError::configuration(format!("Invalid configuration: {e}")))
    }

    /// Overlay values from `lookup` (normally the process environment).
    ///
    /// Ports that do not parse as numbers are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let db = [
            "MYSQL_HOST",
            "MYSQL_DATABASE",
            "MYSQL_USER",
            "MYSQL_PASSWORD",
        ]
        .map(&lookup);
        if db.iter().any(Option::is_some) {
            let section = self.database.get_or_insert_with(|| DatabaseConfig {
                host: default_db_host(),
                ..DatabaseConfig::default()
            });
            let [host, dbname, user, password] = db;
            overlay(&mut section.host, host);
            overlay(&mut section.dbname, dbname);
            overlay(&mut section.user, user);
            overlay(&mut section.password, password);
        }

        let mail = [
            "MAIL_HOST",
            "MAIL_PORT",
            "MAIL_USERNAME",
            "MAIL_PASSWORD",
            "MAIL_ENCRYPTION",
        ]
        .map(&lookup);
        if mail.iter().any(Option::is_some) {
            let section = self.mail.get_or_insert_with(|| MailConfig {
                host: default_mail_host(),
                port: default_mail_port(),
                encryption: default_mail_encryption(),
                ..MailConfig::default()
            });
            let [host, port, username, password, encryption] = mail;
            overlay(&mut section.host, host);
            if let Some(port) = port.and_then(|p| p.parse().ok()) {
                section.port = port;
            }
            overlay(&mut section.username, username);
            overlay(&mut section.password, password);
            overlay(&mut section.encryption, encryption);
        }

        let redis = ["REDIS_HOST", "REDIS_PORT"].map(&lookup);
        if redis.iter().any(Option::is_some) {
            let section = self.redis.get_or_insert_with(|| RedisConfig {
                host: default_redis_host(),
                port: default_redis_port(),
                ..RedisConfig::default()
            });
            let [host, port] = redis;
            overlay(&mut section.host, host);
            if let Some(port) = port.and_then(|p| p.parse().ok()) {
                section.port = port;
            }
        }

        let openai = [
            "OPENAI_API_URL",
            "OPENAI_DEFAULT_MODEL",
            "OPENAI_DEFAULT_TEMPERATURE",
        ]
        .map(&lookup);
        if openai.iter().any(Option::is_some) {
            let section = self.openai.get_or_insert_with(OpenAiConfig::default);
            let [api_url, model, temperature] = openai;
            overlay(&mut section.api_url, api_url);
            overlay(&mut section.default_model, model);
            if let Some(temperature) = temperature.and_then(|t| t.parse().ok()) {
                section.default_temperature = temperature;
            }
        }
    }

    /// Look up a top-level key, typed sections included, as JSON.
    ///
    /// # Errors
    ///
    /// [`FrameworkError::Configuration`] when the key is absent or its
    /// optional section is not configured.
    pub fn var(&self, key: &str) -> Result<Value, FrameworkError> {
        if let Some(value) = self.extra.get(key) {
            return Ok(value.clone());
        }
        let document = serde_json::to_value(self).map_err(|e| {
            FrameworkError::configuration(format!("Failed to serialize configuration: {e}"))
        })?;
        let found = match document {
            Value::Object(mut map) => map.remove(key).filter(|v| !v.is_null()),
            _ => None,
        };
        found.ok_or_else(|| {
            FrameworkError::configuration(format!("Configuration key '{key}' not found."))
        })
    }

    /// Template directory resolved against `base_dir`.
    #[must_use]
    pub fn templates_dir(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.templates.dir)
    }

    /// Public asset directory resolved against `base_dir`.
    #[must_use]
    pub fn public_dir(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.public_dir)
    }
}

fn overlay(slot: &mut String, value: Option<String>) {
    if let Some(v) = value {
        *slot = v;
    }
}
