//! Core infrastructure for the Cotype platform.
//!
//! App state, the model registry, the default access control policy, the
//! per-model hook table and the auth middleware. Feature crates build on top
//! of these without depending on each other.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod acl;
pub mod app;
pub mod hooks;
pub mod middleware;
pub mod models;
pub mod prelude;

// Re-export commonly used types
pub use acl::RolePolicy;
pub use app::{App, AppOpts, AppState};
pub use cotype_types::extract::Auth;
pub use hooks::{FrozenHookRegistry, HookRegistry};
pub use models::{FrozenModelRegistry, ModelRegistry};

// vim: ts=4
