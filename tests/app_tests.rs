mod common;

use common::TestSite;
use std::sync::{Arc, Mutex};
use trellis::error::ErrorKind;
use serde_json::{json, Value};
use trellis::config::OpenAiConfig;
use trellis::services::{
    ChatService, ChatTransport, MailMessage, MailTransport, MemoryCache, ServiceError, Services,
};
use trellis::{App, AppConfig, Controller, FrameworkError, HandlerRef, Page};

const CONFIG: &str = r#"{
    "debug": false,
    "lang": "fr",
    "charset": "UTF-8",
    "site": { "name": "Démo" },
    "mail": { "from_address": "noreply@example.com", "from_name": "Demo" },
    "analytics_id": "UA-123"
}"#;

#[derive(Default)]
struct Home;

impl Controller for Home {
    fn assign_data(&mut self, page: &mut Page) -> Result<(), FrameworkError> {
        let site = page.config().site.name.clone();
        let analytics = page.config().var("analytics_id")?;
        page.add_var("site", site);
        page.add_var("analytics", analytics);
        page.add_js("js/app.js");
        page.set_template("home");
        Ok(())
    }
}

#[derive(Default)]
struct Article;

impl Controller for Article {
    fn assign_data(&mut self, page: &mut Page) -> Result<(), FrameworkError> {
        let title = page.param("title").unwrap_or_default().to_string();
        page.add_var("title", title);
        page.set_template("article");
        Ok(())
    }
}

fn site() -> TestSite {
    TestSite::new(CONFIG)
        .with_template(
            "home.html",
            "<html lang=\"{{ lang }}\">{{ site }}|{{ analytics }}\
             {% for s in js %}<script src=\"/{{ s.file }}?v={{ s.version }}\"></script>{% endfor %}</html>",
        )
        .with_template("article.html", "{{ slugify(title) }}")
        .with_asset("js/app.js", "document.title = 'demo';")
}

fn routes(table: &mut trellis::RouteTable) -> Result<(), FrameworkError> {
    table.get("/", HandlerRef::of::<Home>("home"))?;
    table.get("/article/{title}", HandlerRef::of::<Article>("article"))?;
    Ok(())
}

#[test]
fn test_bootstrap_and_render_with_minijinja() {
    let site = site();
    let app = App::bootstrap(site.path(), Services::new(), routes).unwrap();
    assert_eq!(app.config().lang, "fr");
    assert_eq!(app.dispatcher().table().len(), 2);

    let response = app.handle("GET", "/");
    assert_eq!(response.status, 200);
    assert!(response.body.starts_with("<html lang=\"fr\">Démo|UA-123"));
    // minijinja's HTML escaping also encodes `/` inside values
    assert!(response.body.contains("app.js?v="));

    let article = app.handle("GET", "/article/Crème-Brûlée");
    assert_eq!(article.status, 200);
    assert_eq!(article.body, "creme-brulee");
}

#[test]
fn test_missing_template_file_is_500() {
    let site = TestSite::new(CONFIG);
    let app = App::bootstrap(site.path(), Services::new(), routes).unwrap();
    let response = app.handle("GET", "/");
    assert_eq!(response.status, 500);
    assert_eq!(response.body, "500 - Internal Server Error");
}

#[test]
fn test_bad_pattern_aborts_bootstrap() {
    let site = site();
    let result = App::bootstrap(site.path(), Services::new(), |table| {
        table.get("/post/{id}/{id}", HandlerRef::of::<Article>("post"))
    });
    assert_eq!(result.err().unwrap().kind(), ErrorKind::Compile);
}

#[test]
fn test_missing_config_aborts_bootstrap() {
    let dir = tempfile::tempdir().unwrap();
    let result = App::bootstrap(dir.path(), Services::new(), routes);
    let err = result.err().unwrap();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(err.to_string().starts_with("Configuration file does not exist at:"));
}

#[test]
fn test_dotenv_overrides_config() {
    let site = TestSite::new(r#"{ "site": { "name": "Env" } }"#)
        .with_file(".env", "REDIS_PORT=6390\n");
    let config = AppConfig::load(site.path()).unwrap();
    assert_eq!(config.redis.unwrap().port, 6390);
}

#[derive(Default)]
struct Outbox {
    sent: Mutex<Vec<MailMessage>>,
}

impl MailTransport for Outbox {
    fn send(&self, message: &MailMessage) -> Result<(), ServiceError> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

#[derive(Default)]
struct Contact;

impl Controller for Contact {
    fn assign_data(&mut self, page: &mut Page) -> Result<(), FrameworkError> {
        let visits = page
            .cache_get("visits")
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(0)
            + 1;
        page.cache_set("visits", &visits.to_string(), 0);
        let sent = page.send_email("owner@example.com", "Hello", "<p>Hi <b>there</b></p>", None);
        page.add_var("sent", sent);
        page.add_var("visits", visits);
        page.set_template("contact");
        Ok(())
    }
}

#[test]
fn test_controllers_use_mail_and_cache_services() {
    let site = TestSite::new(CONFIG).with_template(
        "contact.html",
        "{% if sent %}sent{% else %}failed{% endif %}/{{ visits }}",
    );
    let outbox = Arc::new(Outbox::default());
    let config = AppConfig::from_json_str(CONFIG).unwrap();
    let services = Services::new()
        .with_mail_transport(&config, outbox.clone())
        .with_cache(Arc::new(MemoryCache::new()));

    let app = App::bootstrap(site.path(), services, |table| {
        table.post("/contact", HandlerRef::of::<Contact>("contact"))
    })
    .unwrap();

    assert_eq!(app.handle("POST", "/contact").body, "sent/1");
    assert_eq!(app.handle("POST", "/contact").body, "sent/2");

    let sent = outbox.sent.lock().unwrap();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].from.address, "noreply@example.com");
    assert_eq!(sent[0].text_body, "Hi there");
}

struct EchoChat;

impl ChatTransport for EchoChat {
    fn post_json(&self, _url: &str, _api_key: &str, payload: &Value) -> Result<Value, ServiceError> {
        let asked = payload["messages"][0]["content"].as_str().unwrap_or_default();
        Ok(json!({ "choices": [{ "message": { "content": format!(" re: {asked} ") } }] }))
    }
}

#[derive(Default)]
struct Assistant;

impl Controller for Assistant {
    fn assign_data(&mut self, page: &mut Page) -> Result<(), FrameworkError> {
        let question = page.query("q").unwrap_or_default().to_string();
        let answer = page.chat_completion(&question, None, None);
        page.add_var("answer", answer.unwrap_or_else(|| "-".to_string()));
        page.set_template("assistant");
        Ok(())
    }
}

#[test]
fn test_controller_uses_chat_service() {
    let site = TestSite::new(CONFIG).with_template("assistant.html", "{{ answer }}");
    let chat = ChatService::new(OpenAiConfig::default(), "sk-test", Arc::new(EchoChat)).unwrap();
    let app = App::bootstrap(site.path(), Services::new().with_chat(chat), |table| {
        table.get("/assistant", HandlerRef::of::<Assistant>("assistant"))
    })
    .unwrap();

    assert_eq!(app.handle("GET", "/assistant?q=weather").body, "re: weather");
}
