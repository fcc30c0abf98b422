//! Crawler module for fetching and mapping a site
//!
//! This module contains the core crawling machinery:
//! - the deduplicating work queue
//! - the in-memory page store
//! - HTTP fetching with content-type gating and error classification
//! - HTML parsing for anchor targets and identifiers
//! - the coordinating event loop and its worker pool

mod coordinator;
mod fetcher;
mod parser;
mod queue;
mod store;

pub use coordinator::{Coordinator, Crawl};
pub use fetcher::{build_http_client, Fetcher};
pub use parser::{extract, ExtractedDoc};
pub use queue::WorkQueue;
pub use store::{FetchFailure, FetchResult, PageRecord, PageStore};

use crate::config::Config;
use crate::url::LinkFilter;
use crate::Result;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Crawls every page reachable from the root URL.
///
/// This is the main entry point for a crawl. The root is re-serialized
/// through the `url` crate so that the in-site prefix check works against
/// the same normalized form the fetcher reports (a bare authority gains a
/// `/` path, exactly as redirect-final URLs carry one).
pub async fn crawl(config: &Config, root: &str, cancel: CancellationToken) -> Result<Crawl> {
    let root = Url::parse(root)?.to_string();

    let client = build_http_client(config)?;
    let filter = LinkFilter::new(config.exclude_prefixes.clone());
    let fetcher = Fetcher::new(client, root.clone(), filter);

    let coordinator = Coordinator::new(config, fetcher, root);
    Ok(coordinator.run(cancel).await)
}
