//! Configuration module for linkscour
//!
//! The configuration record is assembled by the CLI layer (flags and
//! `LINKSCOUR_*` environment variables) and validated here before a crawl
//! starts.

mod types;
mod validation;

pub use types::{default_workers, Config, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
pub use validation::validate;
