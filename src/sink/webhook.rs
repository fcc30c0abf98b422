//! Webhook error reporting
//!
//! Posts the finished error report to a configured hook URL as one JSON
//! payload: an event per erroring URL with its failure type, the sorted
//! missing fragments when applicable, and the referring pages.

use crate::report::{FailureKind, Report};
use crate::sink::{ReportSink, SinkError};
use reqwest::Client;
use serde::Serialize;

/// One structured event per report entry
#[derive(Debug, Serialize)]
struct ReportEvent {
    url: String,

    /// `request error` for fetch failures, `missing page IDs` for fragments
    #[serde(rename = "failure type")]
    failure_type: &'static str,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    missing_fragments: Vec<String>,

    referenced_by: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ReportPayload {
    events: Vec<ReportEvent>,
}

/// Posts the error report to a webhook
pub struct WebhookReporter {
    client: Client,
    hook_url: String,
}

impl WebhookReporter {
    pub fn new(client: Client, hook_url: String) -> Self {
        Self { client, hook_url }
    }

    fn payload(report: &Report) -> ReportPayload {
        let events = report
            .iter()
            .map(|(url, failure)| ReportEvent {
                url: url.clone(),
                failure_type: match failure.kind {
                    FailureKind::MissingFragment => "missing page IDs",
                    _ => "request error",
                },
                missing_fragments: failure.missing_fragments.iter().cloned().collect(),
                referenced_by: failure.refs.clone(),
            })
            .collect();
        ReportPayload { events }
    }
}

#[async_trait::async_trait]
impl ReportSink for WebhookReporter {
    async fn publish(&self, report: &Report) -> Result<(), SinkError> {
        if report.is_empty() {
            return Ok(());
        }

        let response = self
            .client
            .post(&self.hook_url)
            .json(&Self::payload(report))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SinkError::WebhookStatus(response.status()));
        }
        Ok(())
    }
}
