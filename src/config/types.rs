use std::time::Duration;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default User-Agent, matching a current desktop browser so servers that
/// sniff crawlers serve the same pages a reader would see.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

/// Run configuration for a single crawl
#[derive(Debug, Clone)]
pub struct Config {
    /// Number of concurrent fetch workers
    pub workers: usize,

    /// Timeout applied to every HTTP request
    pub request_timeout: Duration,

    /// URL prefixes that are never enqueued or reported
    pub exclude_prefixes: Vec<String>,

    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Log transient fetch failures and per-page progress
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            exclude_prefixes: Vec::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            verbose: false,
        }
    }
}

/// One worker per available CPU, falling back to 1 when the host does not
/// report its parallelism.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
