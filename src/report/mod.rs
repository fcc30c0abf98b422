//! Error-report assembly
//!
//! The validator reduces the finished page store to a structured report:
//! per-URL fetch failures with back-references from the in-site pages that
//! linked to them, plus per-URL missing-fragment entries.

mod text;

pub use text::render;

use crate::crawler::{FetchFailure, PageStore};
use crate::url::split_fragment;
use std::collections::{BTreeMap, BTreeSet};

/// Why a URL appears in the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// HTTP 404
    NotFound,
    /// HTTP 410
    Gone,
    /// Name resolution failed
    Dns,
    /// A link referenced a fragment with no matching identifier on the page
    MissingFragment,
}

impl From<&FetchFailure> for FailureKind {
    fn from(failure: &FetchFailure) -> Self {
        match failure {
            FetchFailure::NotFound => Self::NotFound,
            FetchFailure::Gone => Self::Gone,
            FetchFailure::Dns => Self::Dns,
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "404 Not Found"),
            Self::Gone => write!(f, "410 Gone"),
            Self::Dns => write!(f, "DNS lookup failed"),
            Self::MissingFragment => write!(f, "missing fragments"),
        }
    }
}

/// One erroring URL: what went wrong, who linked to it, and which
/// fragments were missing (for fragment errors only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    pub kind: FailureKind,
    /// In-site pages that linked to this URL, sorted
    pub refs: Vec<String>,
    /// Populated only when `kind` is `MissingFragment`
    pub missing_fragments: BTreeSet<String>,
}

impl PageFailure {
    fn fetch(kind: FailureKind) -> Self {
        Self {
            kind,
            refs: Vec::new(),
            missing_fragments: BTreeSet::new(),
        }
    }

    fn missing_fragment() -> Self {
        Self::fetch(FailureKind::MissingFragment)
    }
}

/// Mapping from URL to its failure, ordered for deterministic output
pub type Report = BTreeMap<String, PageFailure>;

/// Reduces the page store to the final error report.
///
/// Phase A records every fetch failure. Phase B walks each page under the
/// root prefix: back-references are attached to phase-A entries, and every
/// link fragment is checked against the identifiers of its target page.
/// Fragment entries are merged last and override a same-key fetch entry.
pub fn validate(pages: &PageStore, root: &str) -> Report {
    let mut report = Report::new();

    for (url, record) in pages.iter() {
        if let Some(failure) = &record.failure {
            report.insert(url.clone(), PageFailure::fetch(failure.into()));
        }
    }

    let mut fragment_failures = Report::new();
    for (page, record) in pages.iter() {
        // Off-site pages were never parsed for links.
        if !page.starts_with(root) {
            continue;
        }
        for link in &record.links {
            let (base, fragment) = split_fragment(link);

            if let Some(failure) = report.get_mut(&base) {
                failure.refs.push(page.clone());
            }

            if fragment.is_empty() {
                continue;
            }
            // Legacy hash-bang URLs are JavaScript routes, not anchors.
            if fragment.starts_with('!') {
                continue;
            }
            if let Some(target) = pages.get(&base) {
                if target.ids.contains(&fragment) {
                    continue;
                }
            }

            let failure = fragment_failures
                .entry(base)
                .or_insert_with(PageFailure::missing_fragment);
            failure.refs.push(page.clone());
            failure.missing_fragments.insert(fragment);
        }
    }

    for (url, failure) in fragment_failures {
        report.insert(url, failure);
    }

    for failure in report.values_mut() {
        failure.refs.sort();
        failure.refs.dedup();
    }

    report
}
