//! # CLI Module
//!
//! Developer utilities shipped as the `trellis` binary.
//!
//! ## Commands
//!
//! ### `check-route`
//!
//! Compile a pattern and show what a path binds:
//!
//! ```bash
//! trellis check-route --pattern '/user/{id}' --path /user/42
//! ```
//!
//! ### `asset-version`
//!
//! Print the cache-busting token templates will see for an asset:
//!
//! ```bash
//! trellis asset-version --public site/public css/site.css
//! ```
//!
//! ### `check-config`
//!
//! Load `config/config.json` (plus `.env` and environment overrides) and print
//! a summary:
//!
//! ```bash
//! trellis check-config --site ./site
//! ```

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{run_cli, Cli, Commands};
