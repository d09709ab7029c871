pub use crate::error::{CtResult, Error};
pub use crate::types::{Data, RecordId, Rev, Timestamp};

pub use tracing::{debug, debug_span, error, error_span, info, info_span, warn, warn_span};

// vim: ts=4
