//! Content records: revision history, the publish workflow, CRUD and search.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod handler;
mod prelude;
pub mod publish;
pub mod search;
pub mod service;
pub mod versions;

pub use publish::PublishState;
pub use versions::{VersionEntry, VersionList};

// vim: ts=4
