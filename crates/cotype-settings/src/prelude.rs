pub use cotype_core::prelude::*;

// vim: ts=4
