//! Linkscour command-line entry point

use clap::Parser;
use linkscour::config::{self, Config, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use linkscour::crawler::build_http_client;
use linkscour::sink::{ArchiveSink, ReportSink, WebhookReporter};
use linkscour::{crawl, report, validate, ScourError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Linkscour: a recursive broken-link checker
///
/// Linkscour takes a root URL and recurses down through the links it finds
/// in the HTML pages, checking for broken links and missing fragment
/// targets. Every flag may also be set through a LINKSCOUR_* environment
/// variable.
#[derive(Parser, Debug)]
#[command(name = "linkscour")]
#[command(version)]
#[command(about = "A recursive broken-link checker", long_about = None)]
struct Cli {
    /// Root URL to crawl
    #[arg(value_name = "URL", env = "LINKSCOUR_URL")]
    url: String,

    /// Number of concurrent fetch workers
    #[arg(
        short,
        long,
        env = "LINKSCOUR_WORKERS",
        default_value_t = config::default_workers()
    )]
    workers: usize,

    /// Per-request timeout in seconds
    #[arg(
        long,
        value_name = "SECONDS",
        env = "LINKSCOUR_TIMEOUT",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    timeout: u64,

    /// URL prefix to ignore (repeatable, or comma separated)
    #[arg(
        short = 'x',
        long = "exclude",
        value_name = "PREFIX",
        env = "LINKSCOUR_EXCLUDE",
        value_delimiter = ','
    )]
    exclude: Vec<String>,

    /// User-Agent header sent with every request
    #[arg(long, env = "LINKSCOUR_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Log skipped fetches and transient errors
    #[arg(short, long, env = "LINKSCOUR_VERBOSE")]
    verbose: bool,

    /// Submit every successfully fetched URL to the Wayback Machine
    #[arg(long, env = "LINKSCOUR_ARCHIVE")]
    archive: bool,

    /// Hook URL to POST the error report to as JSON
    #[arg(long, value_name = "URL", env = "LINKSCOUR_WEBHOOK_URL")]
    webhook_url: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let code = match run(cli).await {
        Ok(()) => 0,
        Err(err) => {
            match &err {
                // The report already told the whole story.
                ScourError::BadLinks(_) => tracing::info!("{}", err),
                _ => tracing::error!("{}", err),
            }
            match err {
                ScourError::Cancelled => 3,
                ScourError::BadLinks(_) => 4,
                ScourError::Sink(_) => 5,
                _ => 1,
            }
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> linkscour::Result<()> {
    let config = Config {
        workers: cli.workers,
        request_timeout: Duration::from_secs(cli.timeout),
        exclude_prefixes: cli.exclude,
        user_agent: cli.user_agent,
        verbose: cli.verbose,
    };
    config::validate(&config, &cli.url)?;

    // Re-serialize so the in-site prefix has the same form the fetcher
    // reports for final URLs.
    let root = Url::parse(&cli.url)?.to_string();

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received");
            signal_token.cancel();
        }
    });

    let outcome = crawl(&config, &root, cancel.clone()).await?;
    let report = validate(&outcome.pages, &root);

    print!("{}", report::render(&report));

    if outcome.cancelled {
        return Err(ScourError::Cancelled);
    }

    if cli.archive {
        let client = build_http_client(&config)?;
        let sink = ArchiveSink::new(client);
        sink.archive_all(&outcome.pages.good_urls(), &cancel).await?;
    }

    if let Some(hook_url) = cli.webhook_url {
        let client = build_http_client(&config)?;
        let reporter = WebhookReporter::new(client, hook_url);
        reporter.publish(&report).await?;
    }

    if !report.is_empty() {
        return Err(ScourError::BadLinks(report.len()));
    }

    Ok(())
}

/// Sets up the tracing subscriber; the report itself goes to stdout, so
/// all logging is written to stderr.
fn setup_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("linkscour=debug")
    } else {
        EnvFilter::new("linkscour=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
