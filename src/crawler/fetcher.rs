//! HTTP fetching for the crawler
//!
//! One fetch is an HTTP GET with redirect following, a status check, a
//! content-type gate, and a handoff to the HTML parser. The error policy
//! lives here in one place: 404/410 and DNS failures are reported, every
//! other network or HTTP problem is treated as transient and swallowed.

use crate::config::Config;
use crate::crawler::parser;
use crate::crawler::store::{FetchFailure, FetchResult};
use crate::url::LinkFilter;
use reqwest::{header, Client, StatusCode};
use url::Url;

/// Accept header advertising the content we can actually check
const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Declared content types we are willing to parse
const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "text/html",
    "application/xhtml+xml",
    "application/xml",
    "text/xml",
    "text/plain",
];

/// How much of the body the HTML sniffer looks at
const SNIFF_LEN: usize = 512;

/// Builds the HTTP client shared by all workers
///
/// One instance (connection pool included) serves the whole crawl; reqwest
/// clients are safe to use concurrently.
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.request_timeout)
        .redirect(reqwest::redirect::Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Performs fetches on behalf of the worker pool
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    root: String,
    filter: LinkFilter,
}

impl Fetcher {
    pub fn new(client: Client, root: String, filter: LinkFilter) -> Self {
        Self {
            client,
            root,
            filter,
        }
    }

    /// Fetches one URL and returns what the coordinator needs to know.
    ///
    /// The result is keyed by the final URL after redirects. Links are only
    /// collected when the final URL is under the root prefix, and each one
    /// passes the exclusion filter before it is returned.
    pub async fn fetch(&self, url: &str) -> FetchResult {
        let response = match self
            .client
            .get(url)
            .header(header::ACCEPT, HTML_ACCEPT)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => return self.classify_transport_error(url, &err),
        };

        let final_url = response.url().to_string();
        let status = response.status();

        match status {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => {
                return FetchResult::failed(final_url, FetchFailure::NotFound);
            }
            StatusCode::GONE => {
                return FetchResult::failed(final_url, FetchFailure::Gone);
            }
            _ => {
                tracing::debug!("Ignoring status {} from {}", status, final_url);
                return FetchResult::empty(final_url);
            }
        }

        let declared = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(err) => {
                tracing::debug!("Error reading body of {}: {}", final_url, err);
                return FetchResult::empty(final_url);
            }
        };

        if let Some(content_type) = &declared {
            if !declared_type_allowed(content_type) {
                tracing::debug!("Skipping {}, content-type {}", final_url, content_type);
                return FetchResult::empty(final_url);
            }
        }

        if !looks_like_html(&body[..body.len().min(SNIFF_LEN)]) {
            tracing::debug!("Skipping {}, body does not sniff as HTML", final_url);
            return FetchResult::empty(final_url);
        }

        let base = match Url::parse(&final_url) {
            Ok(base) => base,
            Err(_) => return FetchResult::empty(final_url),
        };

        let collect_links = final_url.starts_with(&self.root);
        let doc = parser::extract(&String::from_utf8_lossy(&body), &base, collect_links);
        let links: Vec<String> = doc
            .links
            .into_iter()
            .filter(|link| self.filter.allows(link))
            .collect();

        tracing::debug!("Got OK: {}", final_url);
        FetchResult::ok(final_url, links, doc.ids)
    }

    fn classify_transport_error(&self, url: &str, err: &reqwest::Error) -> FetchResult {
        if is_dns_failure(err) {
            return FetchResult::failed(url.to_string(), FetchFailure::Dns);
        }
        tracing::debug!("Ignoring transient error for {}: {}", url, err);
        FetchResult::empty(url.to_string())
    }
}

/// Checks the declared Content-Type header against the allow-list.
///
/// Only the media type is compared; parameters such as charset are ignored.
fn declared_type_allowed(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    ALLOWED_CONTENT_TYPES.contains(&essence.as_str())
}

/// Tag prefixes that identify an HTML document, per WHATWG MIME sniffing.
/// Each must be followed by a space or `>` (except the comment opener).
const HTML_SIGNATURES: &[&str] = &[
    "<!DOCTYPE HTML",
    "<HTML",
    "<HEAD",
    "<SCRIPT",
    "<IFRAME",
    "<H1",
    "<DIV",
    "<FONT",
    "<TABLE",
    "<A",
    "<STYLE",
    "<TITLE",
    "<B",
    "<BODY",
    "<BR",
    "<P",
    "<!--",
];

/// Sniffs whether a body prefix looks like an HTML document.
fn looks_like_html(prefix: &[u8]) -> bool {
    let text = String::from_utf8_lossy(prefix);
    let trimmed = text.trim_start_matches(['\t', '\n', '\x0c', '\r', ' ']);
    let upper: String = trimmed
        .chars()
        .take(32)
        .map(|c| c.to_ascii_uppercase())
        .collect();

    HTML_SIGNATURES.iter().any(|signature| {
        if !upper.starts_with(signature) {
            return false;
        }
        if *signature == "<!--" {
            return true;
        }
        matches!(
            upper.as_bytes().get(signature.len()).copied(),
            Some(b' ') | Some(b'>')
        )
    })
}

/// Detects a name-resolution failure inside a reqwest transport error.
///
/// reqwest exposes no dedicated predicate, so this walks the error source
/// chain for the resolver's wording. Anything else on a connect failure is
/// treated as transient.
fn is_dns_failure(err: &reqwest::Error) -> bool {
    if !err.is_connect() {
        return false;
    }
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        let text = cause.to_string();
        if text.contains("dns error") || text.contains("failed to lookup address") {
            return true;
        }
        source = cause.source();
    }
    false
}
