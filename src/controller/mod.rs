//! # Controllers
//!
//! A controller is a page-specific type implementing [`Controller`]. The
//! framework builds a fresh one per matched request together with a [`Page`]
//! holding the request's state, then drives both through
//! [`run_lifecycle`]:
//!
//! ```text
//! Created ──treat()──▶ Treated ──assign_data()──▶ DataAssigned ──render──▶ Rendered
//!    │                    │                           │
//!    └────────────────────┴───────────────────────────┴──────▶ Errored
//! ```
//!
//! `treat` is optional pre-processing. `assign_data` must set the template
//! and fill in vars and assets. Rendering fails when no template was set.
//!
//! ## Example
//!
//! ```rust
//! use trellis::controller::{Controller, Page};
//! use trellis::error::FrameworkError;
//!
//! #[derive(Default)]
//! struct Profile;
//!
//! impl Controller for Profile {
//!     fn assign_data(&mut self, page: &mut Page) -> Result<(), FrameworkError> {
//!         let id = page.param("id").unwrap_or_default().to_string();
//!         page.add_var("user_id", id);
//!         page.add_css("css/profile.css");
//!         page.set_template("profile");
//!         Ok(())
//!     }
//! }
//! ```

mod assets;
mod lifecycle;
mod page;

pub use assets::{Asset, AssetResolver};
pub use lifecycle::{render, run_lifecycle, LifecycleOutcome, LifecycleState};
pub(crate) use lifecycle::guard_panics;
pub use page::Page;

use crate::error::FrameworkError;

/// Page-specific behaviour plugged into the controller lifecycle.
pub trait Controller {
    /// Pre-processing hook, run before [`Controller::assign_data`].
    fn treat(&mut self, _page: &mut Page) -> Result<(), FrameworkError> {
        Ok(())
    }

    /// Set the template and populate vars, js and css.
    fn assign_data(&mut self, page: &mut Page) -> Result<(), FrameworkError>;
}
