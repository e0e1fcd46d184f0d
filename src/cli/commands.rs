use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::controller::AssetResolver;
use crate::router::{normalize_path, PathCompiler};

/// Developer utilities for trellis sites.
#[derive(Parser)]
#[command(name = "trellis")]
#[command(about = "Trellis CLI", long_about = None, version)]
pub struct Cli {
    /// Pretty, debug-level logs instead of JSON
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Compile a route pattern and match a path against it
    CheckRoute {
        /// Route pattern, e.g. `/user/{id}`
        #[arg(long)]
        pattern: String,

        /// Request path to match
        #[arg(long)]
        path: String,
    },
    /// Print the version token of an asset
    AssetVersion {
        /// Public directory the asset path is relative to
        #[arg(long, default_value = "public")]
        public: PathBuf,

        /// Asset path, e.g. `css/site.css`
        path: String,
    },
    /// Load a site's configuration and print a summary
    CheckConfig {
        /// Site base directory (the one containing `config/config.json`)
        #[arg(long, default_value = ".", env = "TRELLIS_SITE")]
        site: PathBuf,
    },
}

/// Run a parsed command, printing its report to stdout.
///
/// # Errors
///
/// Invalid patterns, unreadable assets and configuration failures.
pub fn run_cli(cli: Cli) -> Result<()> {
    let report = match &cli.command {
        Commands::CheckRoute { pattern, path } => check_route(pattern, path)?,
        Commands::AssetVersion { public, path } => asset_version(public, path)?,
        Commands::CheckConfig { site } => check_config(site)?,
    };
    println!("{report}");
    Ok(())
}

pub(crate) fn check_route(pattern: &str, path: &str) -> Result<String> {
    let matcher = PathCompiler::compile(pattern)?;
    let mut lines = vec![format!("regex: {}", matcher.regex().as_str())];
    match matcher.captures(normalize_path(path)) {
        Some(params) => {
            lines.push("match".to_string());
            // Report in pattern order rather than hash order
            for name in matcher.param_names() {
                let value = params.get(name.as_ref()).map(String::as_str).unwrap_or("");
                lines.push(format!("  {name} = {value}"));
            }
        }
        None => lines.push("no match".to_string()),
    }
    Ok(lines.join("\n"))
}

pub(crate) fn asset_version(public: &Path, path: &str) -> Result<String> {
    let token = AssetResolver::new(public)
        .version_token(path)
        .with_context(|| format!("Cannot version asset `{path}` under {}", public.display()))?;
    Ok(format!("{path}?v={token}"))
}

pub(crate) fn check_config(site: &Path) -> Result<String> {
    let config = AppConfig::load(site)
        .with_context(|| format!("Invalid site configuration in {}", site.display()))?;
    let sections = [
        ("mail", config.mail.is_some()),
        ("database", config.database.is_some()),
        ("redis", config.redis.is_some()),
        ("openai", config.openai.is_some()),
    ]
    .iter()
    .filter(|(_, present)| *present)
    .map(|(name, _)| *name)
    .collect::<Vec<_>>();

    Ok(format!(
        "site: {}\ndebug: {}\nlang: {}\ncharset: {}\ntemplates: {} (.{})\npublic: {}\nservices: {}",
        config.site.name,
        config.debug,
        config.lang,
        config.charset,
        config.templates_dir(site).display(),
        config.templates.extension,
        config.public_dir(site).display(),
        if sections.is_empty() {
            "none".to_string()
        } else {
            sections.join(", ")
        }
    ))
}
