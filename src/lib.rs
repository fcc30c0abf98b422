//! Linkscour: a recursive broken-link checker
//!
//! This crate crawls a website starting from a root URL, follows every
//! in-site anchor link, validates every referenced URL (in-site or
//! external), and reports broken links and missing fragment targets.

pub mod config;
pub mod crawler;
pub mod report;
pub mod sink;
pub mod url;

use thiserror::Error;

/// Main error type for linkscour operations
#[derive(Debug, Error)]
pub enum ScourError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("crawl cancelled by interrupt")]
    Cancelled,

    #[error("found {0} bad links")]
    BadLinks(usize),

    #[error("post-processing sink error: {0}")]
    Sink(#[from] sink::SinkError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid root URL: {0}")]
    InvalidRoot(String),
}

/// Result type alias for linkscour operations
pub type Result<T> = std::result::Result<T, ScourError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, Crawl};
pub use report::{validate, FailureKind, PageFailure, Report};
