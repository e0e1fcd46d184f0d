//! Unit tests for CLI commands

use super::commands::{asset_version, check_config, check_route};
use crate::cli::{Cli, Commands};
use clap::Parser;
use std::fs;

#[test]
fn test_check_route_command_parses() {
    let cli = Cli::try_parse_from([
        "trellis",
        "check-route",
        "--pattern",
        "/user/{id}",
        "--path",
        "/user/42",
    ])
    .unwrap();

    match cli.command {
        Commands::CheckRoute { pattern, path } => {
            assert_eq!(pattern, "/user/{id}");
            assert_eq!(path, "/user/42");
        }
        _ => panic!("Expected CheckRoute command"),
    }
    assert!(!cli.verbose);
}

#[test]
fn test_asset_version_defaults_public_dir() {
    let cli = Cli::try_parse_from(["trellis", "asset-version", "css/site.css"]).unwrap();
    match cli.command {
        Commands::AssetVersion { public, path } => {
            assert_eq!(public.to_string_lossy(), "public");
            assert_eq!(path, "css/site.css");
        }
        _ => panic!("Expected AssetVersion command"),
    }
}

#[test]
fn test_check_route_reports_params_in_pattern_order() {
    let report = check_route("/blog/{year}/{slug}", "/blog/2024/hello-world").unwrap();
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines[1], "match");
    assert_eq!(lines[2], "  year = 2024");
    assert_eq!(lines[3], "  slug = hello-world");
}

#[test]
fn test_check_route_no_match_and_invalid_pattern() {
    let report = check_route("/contact", "/about").unwrap();
    assert!(report.ends_with("no match"));
    assert!(check_route("/a/{x}/{x}", "/a/1/2").is_err());
}

#[test]
fn test_asset_version_reports_token() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("app.js"), "alert(1)").unwrap();
    let report = asset_version(dir.path(), "app.js").unwrap();
    assert!(report.starts_with("app.js?v="));
    assert_eq!(report.len(), "app.js?v=".len() + 16);
    assert!(asset_version(dir.path(), "missing.js").is_err());
}

#[test]
fn test_check_config_summary() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("config")).unwrap();
    fs::write(
        dir.path().join("config/config.json"),
        r#"{ "site": { "name": "Demo" }, "redis": { "host": "cache" } }"#,
    )
    .unwrap();
    let report = check_config(dir.path()).unwrap();
    assert!(report.contains("site: Demo"));
    assert!(report.contains("redis"));
}
