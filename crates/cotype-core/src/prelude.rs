pub use crate::app::App;
pub use cotype_types::prelude::*;

// vim: ts=4
