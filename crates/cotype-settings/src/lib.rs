//! Settings models: generic CRUD plus the business rules of `users` and `roles`.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod handler;
pub mod hooks;
mod prelude;
pub mod service;

pub use hooks::register_hooks;

// vim: ts=4
