//! Shared error taxonomy, timestamp helpers, and redaction utilities used
//! across the qaagent crates.

pub mod error;
pub mod path;
pub mod redact;
pub mod time;

pub use error::{Error, ErrorKind, Result};
