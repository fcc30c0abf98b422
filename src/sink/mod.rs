//! Optional post-processing sinks
//!
//! Sinks run after the crawl and the report are finished:
//! - the archive sink forwards every successfully fetched URL to the
//!   Wayback Machine
//! - the webhook reporter posts the error report as structured JSON events
//!
//! Both are injected collaborators; a failing sink surfaces as its own
//! run-level outcome and never alters the report itself.

mod archive;
mod webhook;

pub use archive::ArchiveSink;
pub use webhook::WebhookReporter;

use crate::report::Report;
use thiserror::Error;

/// Errors from post-processing sinks
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("{failed} of {total} archive submissions failed")]
    Archive { failed: usize, total: usize },

    #[error("webhook request failed: {0}")]
    Webhook(#[from] reqwest::Error),

    #[error("webhook returned status {0}")]
    WebhookStatus(reqwest::StatusCode),
}

/// Consumer of a finished error report
#[async_trait::async_trait]
pub trait ReportSink: Send + Sync {
    /// Publishes the report. Called once, after the crawl completes.
    async fn publish(&self, report: &Report) -> Result<(), SinkError>;
}
