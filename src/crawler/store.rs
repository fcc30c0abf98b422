use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

/// Reportable ways a fetch can fail.
///
/// Transient conditions (timeouts, connection resets, non-2xx statuses
/// other than 404/410) never reach this type; the fetcher swallows them
/// and returns an empty result instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// HTTP 404 from the fetched URL
    NotFound,
    /// HTTP 410
    Gone,
    /// Name resolution failed
    Dns,
}

impl std::fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "404 Not Found"),
            Self::Gone => write!(f, "410 Gone"),
            Self::Dns => write!(f, "DNS lookup failed"),
        }
    }
}

/// The tuple a worker sends back to the coordinator.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// Final URL after following redirects, not necessarily the URL asked for
    pub url: String,
    /// Absolute URLs referenced by anchors on the page, exclusion-filtered,
    /// fragments retained. Empty unless the final URL is under the root.
    pub links: Vec<String>,
    /// Anchor identifiers present on the page
    pub ids: Vec<String>,
    /// Set instead of `links`/`ids` when the fetch failed reportably
    pub failure: Option<FetchFailure>,
}

impl FetchResult {
    /// A successful (or silently skipped) fetch.
    pub fn ok(url: String, links: Vec<String>, ids: Vec<String>) -> Self {
        Self {
            url,
            links,
            ids,
            failure: None,
        }
    }

    /// A skipped fetch: no error, nothing extracted.
    pub fn empty(url: String) -> Self {
        Self::ok(url, Vec::new(), Vec::new())
    }

    /// A reportably failed fetch.
    pub fn failed(url: String, failure: FetchFailure) -> Self {
        Self {
            url,
            links: Vec::new(),
            ids: Vec::new(),
            failure: Some(failure),
        }
    }
}

/// Per-URL record of what a crawled page contained.
#[derive(Debug, Default)]
pub struct PageRecord {
    pub ids: HashSet<String>,
    pub links: HashSet<String>,
    pub failure: Option<FetchFailure>,
}

/// In-memory record of every URL visited, keyed by final URL.
///
/// Written only by the coordinator while the crawl runs, then consumed
/// read-only by the validator.
#[derive(Debug, Default)]
pub struct PageStore {
    pages: HashMap<String, PageRecord>,
}

impl PageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a fetch result under its final URL and returns the record.
    pub fn insert(&mut self, result: FetchResult) -> &PageRecord {
        let record = if let Some(failure) = result.failure {
            PageRecord {
                failure: Some(failure),
                ..PageRecord::default()
            }
        } else {
            PageRecord {
                ids: result.ids.into_iter().collect(),
                links: result.links.into_iter().collect(),
                failure: None,
            }
        };
        match self.pages.entry(result.url) {
            Entry::Occupied(mut occupied) => {
                // Two requested URLs can redirect to the same final URL;
                // the later result wins.
                occupied.insert(record);
                occupied.into_mut()
            }
            Entry::Vacant(vacant) => vacant.insert(record),
        }
    }

    pub fn get(&self, url: &str) -> Option<&PageRecord> {
        self.pages.get(url)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PageRecord)> {
        self.pages.iter()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// URLs that were fetched without a reportable failure.
    pub fn good_urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = self
            .pages
            .iter()
            .filter(|(_, record)| record.failure.is_none())
            .map(|(url, _)| url.clone())
            .collect();
        urls.sort();
        urls
    }
}
