//! Cotype is a self-hosted headless CMS.
//!
//! # Features
//!
//! - Models declared as JSON (content, settings and media types)
//! - Versioned content with a publish/unpublish workflow
//! - Role based access control on every operation
//! - Users and roles as built-in settings models
//! - REST API under `/admin/rest`
//! - Pluggable persistence, a SQLite adapter is provided

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

// Re-export shared types and adapter traits from cotype-types
pub use cotype_types::acl;
pub use cotype_types::error;
pub use cotype_types::model;
pub use cotype_types::persistence_adapter;
pub use cotype_types::types;
pub use cotype_types::utils;

// Feature crate re-exports
pub use cotype_content as content;
pub use cotype_core::hooks;
pub use cotype_core::models;
pub use cotype_settings as settings;

// Local modules
pub mod app;
pub mod prelude;
pub mod routes;

pub use crate::app::{App, AppBuilder};

// vim: ts=4
