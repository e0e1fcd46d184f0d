//! # Router Module
//!
//! Path compilation and the route table.
//!
//! The router works in two phases:
//!
//! 1. **Compilation**: at startup every pattern (e.g. `/user/{id}`) is turned
//!    into an anchored regex plus its ordered parameter names.
//! 2. **Matching**: for each request the dispatcher walks the routes for the
//!    request method in registration order and stops at the first match.
//!
//! First match wins even when a later literal route would be a better fit, so
//! callers rank overlapping routes purely by registration order.
//!
//! ## Example
//!
//! ```rust
//! use trellis::controller::{Controller, Page};
//! use trellis::error::FrameworkError;
//! use trellis::registry::HandlerRef;
//! use trellis::router::RouteTable;
//! use http::Method;
//!
//! #[derive(Default)]
//! struct Profile;
//!
//! impl Controller for Profile {
//!     fn assign_data(&mut self, page: &mut Page) -> Result<(), FrameworkError> {
//!         page.set_template("profile");
//!         Ok(())
//!     }
//! }
//!
//! let mut table = RouteTable::new();
//! table.get("/user/{id}", HandlerRef::of::<Profile>("profile")).unwrap();
//!
//! let matched = table.find(&Method::GET, "/user/42").unwrap();
//! assert_eq!(matched.param("id"), Some("42"));
//! ```

mod compile;
mod table;

pub use compile::{normalize_path, CompiledMatcher, Params, PathCompiler};
pub use table::{CompiledRoute, MatchResult, RouteTable};
