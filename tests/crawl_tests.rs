//! End-to-end crawl tests
//!
//! These tests use wiremock to serve small fixture sites and run the full
//! crawl-then-validate cycle against them.

use linkscour::config::Config;
use linkscour::{crawl, validate, FailureKind, Report};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(workers: usize, exclude_prefixes: Vec<String>) -> Config {
    Config {
        workers,
        request_timeout: Duration::from_secs(5),
        exclude_prefixes,
        user_agent: "linkscour-tests/0.1".to_string(),
        verbose: false,
    }
}

/// Wraps a body in enough HTML that the content sniffer accepts it.
fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

async fn run_crawl(root: &str, workers: usize, excludes: Vec<String>) -> Report {
    let config = test_config(workers, excludes);
    let outcome = crawl(&config, root, CancellationToken::new())
        .await
        .expect("crawl failed");
    let normalized = url::Url::parse(root).unwrap().to_string();
    validate(&outcome.pages, &normalized)
}

#[tokio::test]
async fn test_basic_failure() {
    // Nothing mounted: the root 404s.
    let server = MockServer::start().await;
    let root = format!("{}/404", server.uri());

    let report = run_crawl(&root, 1, vec![]).await;

    assert_eq!(report.len(), 1);
    let failure = &report[&root];
    assert_eq!(failure.kind, FailureKind::NotFound);
    assert!(failure.kind.to_string().contains("404"));
    assert!(failure.refs.is_empty());
}

#[tokio::test]
async fn test_basic_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/basic-a.html"))
        .respond_with(html(r#"<a href="basic-b.html">b</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/basic-b.html"))
        .respond_with(html("fine"))
        .mount(&server)
        .await;

    let report = run_crawl(&format!("{}/basic-a.html", server.uri()), 1, vec![]).await;
    assert!(report.is_empty(), "unexpected report: {:?}", report);
}

#[tokio::test]
async fn test_more_crawlers_match_single_crawler() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<a href="/a.html">a</a><a href="/b.html">b</a><a href="/broken.html">c</a>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/a.html"))
        .respond_with(html(r#"<a href="/b.html">b</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b.html"))
        .respond_with(html("leaf"))
        .mount(&server)
        .await;

    let root = format!("{}/", server.uri());
    let single = run_crawl(&root, 1, vec![]).await;
    let pooled = run_crawl(&root, 5, vec![]).await;

    assert_eq!(single, pooled);
    assert_eq!(single.len(), 1);
    assert_eq!(
        single[&format!("{}/broken.html", server.uri())].kind,
        FailureKind::NotFound
    );
}

#[tokio::test]
async fn test_circular_links_terminate() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/circular-a.html"))
        .respond_with(html(r#"<a href="circular-b.html">b</a>"#))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/circular-b.html"))
        .respond_with(html(r#"<a href="circular-a.html">a</a>"#))
        .expect(1)
        .mount(&server)
        .await;

    let report = run_crawl(&format!("{}/circular-a.html", server.uri()), 1, vec![]).await;
    assert!(report.is_empty());
    // expect(1) verified when the server drops: each page fetched once.
}

#[tokio::test]
async fn test_good_external_link() {
    let site = MockServer::start().await;
    let external = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/external-good.html"))
        .respond_with(html(&format!(
            r#"<a href="{}/exists">elsewhere</a>"#,
            external.uri()
        )))
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .and(path("/exists"))
        .respond_with(html("external page"))
        .mount(&external)
        .await;

    let report = run_crawl(&format!("{}/external-good.html", site.uri()), 1, vec![]).await;
    assert!(report.is_empty());
}

#[tokio::test]
async fn test_bad_external_link() {
    let site = MockServer::start().await;
    let external = MockServer::start().await;
    let bad_link = format!("{}/404", external.uri());

    Mock::given(method("GET"))
        .and(path("/external-bad.html"))
        .respond_with(html(&format!(r#"<a href="{}">gone</a>"#, bad_link)))
        .mount(&site)
        .await;

    let root = format!("{}/external-bad.html", site.uri());
    let report = run_crawl(&root, 1, vec![]).await;

    assert_eq!(report.len(), 1);
    let failure = &report[&bad_link];
    assert_eq!(failure.kind, FailureKind::NotFound);
    assert_eq!(failure.refs, vec![root]);
}

#[tokio::test]
async fn test_external_pages_are_not_recursed() {
    let site = MockServer::start().await;
    let external = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/root.html"))
        .respond_with(html(&format!(
            r#"<a href="{}/landing">ext</a>"#,
            external.uri()
        )))
        .mount(&site)
        .await;
    // The external landing page links onward; that link must not be followed.
    Mock::given(method("GET"))
        .and(path("/landing"))
        .respond_with(html(r#"<a href="/deeper">deeper</a>"#))
        .mount(&external)
        .await;
    Mock::given(method("GET"))
        .and(path("/deeper"))
        .respond_with(html("should never be fetched"))
        .expect(0)
        .mount(&external)
        .await;

    let report = run_crawl(&format!("{}/root.html", site.uri()), 2, vec![]).await;
    assert!(report.is_empty());
}

#[tokio::test]
async fn test_good_fragment_link() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/id-good-a.html"))
        .respond_with(html(r#"<a href="id-good-b.html#foo">b</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/id-good-b.html"))
        .respond_with(html(r#"<div id="foo">target</div>"#))
        .mount(&server)
        .await;

    let report = run_crawl(&format!("{}/id-good-a.html", server.uri()), 1, vec![]).await;
    assert!(report.is_empty());
}

#[tokio::test]
async fn test_missing_fragment_link() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/id-bad-a.html"))
        .respond_with(html(r#"<a href="id-bad-b.html#foo">b</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/id-bad-b.html"))
        .respond_with(html(r#"<div id="bar">wrong id</div>"#))
        .mount(&server)
        .await;

    let root = format!("{}/id-bad-a.html", server.uri());
    let report = run_crawl(&root, 1, vec![]).await;

    assert_eq!(report.len(), 1);
    let target = format!("{}/id-bad-b.html", server.uri());
    let failure = &report[&target];
    assert_eq!(failure.kind, FailureKind::MissingFragment);
    assert_eq!(
        failure.missing_fragments.iter().collect::<Vec<_>>(),
        vec!["foo"]
    );
    assert_eq!(failure.refs, vec![root]);
}

#[tokio::test]
async fn test_legacy_anchor_name_satisfies_fragment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old-a.html"))
        .respond_with(html(r#"<a href="old-b.html#legacy">b</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/old-b.html"))
        .respond_with(html(r#"<a name="legacy">anchor</a>"#))
        .mount(&server)
        .await;

    let report = run_crawl(&format!("{}/old-a.html", server.uri()), 1, vec![]).await;
    assert!(report.is_empty());
}

#[tokio::test]
async fn test_hash_bang_fragment_ignored() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/id-ignore-a.html"))
        .respond_with(html(r#"<a href="id-ignore-b.html#!route/x">b</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/id-ignore-b.html"))
        .respond_with(html("no ids at all"))
        .mount(&server)
        .await;

    let report = run_crawl(&format!("{}/id-ignore-a.html", server.uri()), 1, vec![]).await;
    assert!(report.is_empty());
}

#[tokio::test]
async fn test_fragment_only_link_checks_containing_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/self.html"))
        .respond_with(html(r##"<a href="#missing">jump</a>"##))
        .mount(&server)
        .await;

    let root = format!("{}/self.html", server.uri());
    let report = run_crawl(&root, 1, vec![]).await;

    assert_eq!(report.len(), 1);
    let failure = &report[&root];
    assert_eq!(failure.kind, FailureKind::MissingFragment);
    assert!(failure.missing_fragments.contains("missing"));
}

#[tokio::test]
async fn test_excluded_prefix_never_fetched() {
    let site = MockServer::start().await;
    let external = MockServer::start().await;
    let excluded_prefix = format!("{}/excluded-path", external.uri());

    Mock::given(method("GET"))
        .and(path("/excluded.html"))
        .respond_with(html(&format!(
            r#"<a href="{}/x">excluded</a>"#,
            excluded_prefix
        )))
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .and(path("/excluded-path/x"))
        .respond_with(ResponseTemplate::new(404))
        .expect(0)
        .mount(&external)
        .await;

    let report = run_crawl(
        &format!("{}/excluded.html", site.uri()),
        1,
        vec![excluded_prefix],
    )
    .await;
    assert!(report.is_empty());
}

#[tokio::test]
async fn test_non_html_root_produces_empty_report() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/file.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"%PDF-1.4 not actually html".to_vec())
                .insert_header("content-type", "application/pdf"),
        )
        .mount(&server)
        .await;

    let report = run_crawl(&format!("{}/file.pdf", server.uri()), 1, vec![]).await;
    assert!(report.is_empty());
}

#[tokio::test]
async fn test_transient_server_error_not_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky.html"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let report = run_crawl(&format!("{}/flaky.html", server.uri()), 1, vec![]).await;
    assert!(report.is_empty());
}

#[tokio::test]
async fn test_gone_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone.html"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&server)
        .await;

    let root = format!("{}/gone.html", server.uri());
    let report = run_crawl(&root, 1, vec![]).await;
    assert_eq!(report[&root].kind, FailureKind::Gone);
}

#[tokio::test]
async fn test_redirect_stores_final_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/moved.html">moved</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/moved.html"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", "/destination.html"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/destination.html"))
        .respond_with(html(r#"<a href="/broken.html">next</a>"#))
        .mount(&server)
        .await;

    // The redirect lands under the root prefix, so the destination is keyed
    // by its final URL and its links are still followed and validated.
    let report = run_crawl(&format!("{}/", server.uri()), 1, vec![]).await;
    assert_eq!(report.len(), 1);
    assert_eq!(
        report[&format!("{}/broken.html", server.uri())].kind,
        FailureKind::NotFound
    );
}

#[tokio::test]
async fn test_repeat_runs_are_identical() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<a href="/a.html#nowhere">a</a><a href="/missing.html">m</a>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/a.html"))
        .respond_with(html("no anchors"))
        .mount(&server)
        .await;

    let root = format!("{}/", server.uri());
    let first = run_crawl(&root, 3, vec![]).await;
    let second = run_crawl(&root, 3, vec![]).await;

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[tokio::test]
async fn test_pre_cancelled_token_reports_cancellation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/next.html">next</a>"#))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let config = test_config(2, vec![]);
    let outcome = crawl(&config, &format!("{}/", server.uri()), cancel)
        .await
        .expect("crawl failed");

    assert!(outcome.cancelled);
}
