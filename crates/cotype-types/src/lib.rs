//! Shared types, model descriptors, adapter traits, and core utilities for
//! the Cotype content platform.
//!
//! Everything the feature crates and the persistence adapters have in common
//! lives here, so adapters do not depend on the server crates.

pub mod acl;
pub mod error;
pub mod extract;
pub mod model;
pub mod persistence_adapter;
pub mod prelude;
pub mod types;
pub mod utils;

// vim: ts=4
