//! # Trellis
//!
//! **Trellis** is a minimal MVC web framework core: a declarative route table,
//! a dispatcher that resolves `(method, path)` to a controller, and a
//! controller lifecycle that turns bound parameters into rendered output.
//!
//! The HTTP transport is not part of this crate. A server hands each request
//! to [`App::handle`] (or [`Dispatcher::resolve`]) and writes back the
//! returned [`Response`].
//!
//! ## Architecture
//!
//! - **[`router`]** - `{name}` pattern compilation and the per-method route table
//! - **[`registry`]** - controller factories keyed by handler name
//! - **[`dispatcher`]** - first-match dispatch, middleware, 404/405 handling
//! - **[`middleware`]** - the pre-handler hook capability plus tracing and auth middleware
//! - **[`controller`]** - the [`Controller`] capability, [`Page`] state and the lifecycle driver
//! - **[`responder`]** - error → status + body, honouring the `debug` flag
//! - **[`templating`]** - the render capability and its minijinja implementation
//! - **[`services`]** - mail, cache, chat-completion and database seams with their failure policies
//! - **[`config`]** - `config/config.json` + `.env` + environment overrides
//! - **[`app`]** - bootstrap wiring all of the above
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Transport
//!     participant Dispatcher
//!     participant Table as RouteTable
//!     participant MW as Middleware
//!     participant Ctl as Controller
//!     participant Tpl as Renderer
//!     participant Resp as ErrorResponder
//!
//!     Transport->>Dispatcher: resolve("GET", "/user/42")
//!     Dispatcher->>Table: find(GET, "user/42")
//!     Table-->>Dispatcher: route + {id: "42"}
//!     Dispatcher->>MW: handle(ctx) (global, then route)
//!     alt aborted
//!         MW-->>Resp: Abort / error
//!     end
//!     Dispatcher->>Ctl: treat → assign_data
//!     Ctl->>Tpl: render(template, vars)
//!     alt error or panic
//!         Ctl-->>Resp: FrameworkError
//!         Resp-->>Transport: status + body
//!     end
//!     Tpl-->>Transport: 200 text/html
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use trellis::{AppConfig, Controller, Dispatcher, FrameworkError, HandlerRef, Page, RouteTable};
//!
//! #[derive(Default)]
//! struct Profile;
//!
//! impl Controller for Profile {
//!     fn assign_data(&mut self, page: &mut Page) -> Result<(), FrameworkError> {
//!         let id = page.param("id").unwrap_or_default().to_string();
//!         page.add_var("id", id);
//!         page.set_template("profile");
//!         Ok(())
//!     }
//! }
//!
//! let mut table = RouteTable::new();
//! table.get("/user/{id}", HandlerRef::of::<Profile>("profile")).unwrap();
//!
//! let renderer = |name: &str, vars: &serde_json::Map<String, serde_json::Value>| {
//!     Ok::<_, FrameworkError>(format!("{name}:{}", vars["id"]))
//! };
//! let config = AppConfig::from_json_str(r#"{ "site": { "name": "Demo" } }"#).unwrap();
//! let dispatcher = Dispatcher::new(Arc::new(table), Arc::new(renderer), Arc::new(config));
//!
//! let response = dispatcher.resolve("GET", "/user/42");
//! assert_eq!(response.status, 200);
//! assert_eq!(response.body, r#"profile:"42""#);
//! assert_eq!(dispatcher.resolve("POST", "/user/42").status, 405);
//! assert_eq!(dispatcher.resolve("GET", "/missing").status, 404);
//! ```
//!
//! ## Logging
//!
//! Everything logs through `tracing`; call [`logging::init_logging`] once at
//! startup to install a JSON or pretty subscriber.

pub mod app;
pub mod cli;
pub mod config;
pub mod controller;
pub mod dispatcher;
pub mod error;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod registry;
pub mod responder;
pub mod router;
pub mod services;
pub mod slug;
pub mod templating;

pub use app::App;
pub use config::AppConfig;
pub use controller::{Controller, Page};
pub use dispatcher::{Dispatcher, Outcome, RequestContext, Response};
pub use error::{ErrorKind, FrameworkError};
pub use middleware::{Abort, Middleware};
pub use registry::{HandlerRef, HandlerRegistry};
pub use responder::ErrorResponder;
pub use router::{PathCompiler, RouteTable};
pub use templating::{Renderer, TemplateEngine};
