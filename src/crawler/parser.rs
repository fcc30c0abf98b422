//! HTML parsing for link checking
//!
//! Extracts two things from a document:
//! - anchor targets (`<a href>`), resolved to absolute URLs
//! - identifiers: any element's `id` attribute, plus `name` attributes on
//!   anchors (legacy named anchors still found in older documents)

use crate::url::resolve_href;
use scraper::{Html, Selector};
use url::Url;

/// What the extractor pulled out of one document
#[derive(Debug, Clone, Default)]
pub struct ExtractedDoc {
    /// Identifiers addressable by a `#fragment`
    pub ids: Vec<String>,

    /// Absolute anchor targets, fragments retained
    pub links: Vec<String>,
}

/// Parses an HTML document and extracts identifiers and, when
/// `collect_links` is set, anchor targets resolved against `base`.
///
/// Parsing is best-effort: malformed HTML yields whatever the parser can
/// recover. An empty or missing `href` yields no link; a fragment-only
/// `href` resolves to the containing page and is kept.
pub fn extract(body: &str, base: &Url, collect_links: bool) -> ExtractedDoc {
    let document = Html::parse_document(body);
    let mut doc = ExtractedDoc::default();

    // Selectors are constant and known valid.
    let id_selector = Selector::parse("[id]").unwrap();
    let anchor_selector = Selector::parse("a").unwrap();

    for element in document.select(&id_selector) {
        if let Some(id) = element.value().attr("id") {
            if !id.is_empty() {
                doc.ids.push(id.to_string());
            }
        }
    }

    for element in document.select(&anchor_selector) {
        if let Some(name) = element.value().attr("name") {
            if !name.is_empty() {
                doc.ids.push(name.to_string());
            }
        }
        if collect_links {
            if let Some(href) = element.value().attr("href") {
                if let Some(link) = resolve_href(base, href) {
                    doc.links.push(link);
                }
            }
        }
    }

    doc
}
