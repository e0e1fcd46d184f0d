#![allow(dead_code)]

use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use trellis::{AppConfig, Controller, Dispatcher, FrameworkError, HandlerRef, Page, Renderer, RouteTable};

/// Throwaway site directory: `config/config.json`, `templates/`, `public/`.
pub struct TestSite {
    dir: TempDir,
}

impl TestSite {
    pub fn new(config_json: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("config")).unwrap();
        fs::create_dir_all(dir.path().join("templates")).unwrap();
        fs::create_dir_all(dir.path().join("public")).unwrap();
        fs::write(dir.path().join("config/config.json"), config_json).unwrap();
        Self { dir }
    }

    pub fn with_template(self, name: &str, source: &str) -> Self {
        let path = self.dir.path().join("templates").join(name);
        write_file(&path, source);
        self
    }

    pub fn with_asset(self, path: &str, content: &str) -> Self {
        let path = self.dir.path().join("public").join(path);
        write_file(&path, content);
        self
    }

    pub fn with_file(self, path: &str, content: &str) -> Self {
        write_file(&self.dir.path().join(path), content);
        self
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn public_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("public")
    }
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

pub fn config(debug: bool) -> Arc<AppConfig> {
    let raw = format!(r#"{{ "debug": {debug}, "site": {{ "name": "Test Site" }} }}"#);
    Arc::new(AppConfig::from_json_str(&raw).unwrap())
}

/// Renderer that returns `"<template>|<vars as JSON>"`.
pub fn echo_renderer() -> Arc<dyn Renderer> {
    Arc::new(|name: &str, vars: &Map<String, Value>| {
        Ok::<_, FrameworkError>(format!("{name}|{}", Value::Object(vars.clone())))
    })
}

pub fn dispatcher(table: RouteTable, debug: bool) -> Dispatcher {
    Dispatcher::new(Arc::new(table), echo_renderer(), config(debug))
}

/// Shared, ordered record of what ran during a request.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// Sets a template named after itself and records its params.
pub struct Recording {
    pub name: &'static str,
    pub log: CallLog,
}

impl Controller for Recording {
    fn treat(&mut self, _page: &mut Page) -> Result<(), FrameworkError> {
        self.log.push(format!("{}:treat", self.name));
        Ok(())
    }

    fn assign_data(&mut self, page: &mut Page) -> Result<(), FrameworkError> {
        let mut params: Vec<_> = page
            .params()
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        params.sort();
        self.log
            .push(format!("{}:assign:{}", self.name, params.join(",")));
        page.add_var("handler", self.name);
        page.set_template(self.name);
        Ok(())
    }
}

pub fn recording(name: &'static str, log: &CallLog) -> HandlerRef {
    let log = log.clone();
    HandlerRef::new(name, move |_page| {
        Ok(Box::new(Recording {
            name,
            log: log.clone(),
        }))
    })
}

/// Never sets a template.
#[derive(Default)]
pub struct NoTemplate;

impl Controller for NoTemplate {
    fn assign_data(&mut self, page: &mut Page) -> Result<(), FrameworkError> {
        page.add_var("unused", true);
        Ok(())
    }
}

#[derive(Default)]
pub struct Panicking;

impl Controller for Panicking {
    fn assign_data(&mut self, _page: &mut Page) -> Result<(), FrameworkError> {
        panic!("controller exploded");
    }
}
