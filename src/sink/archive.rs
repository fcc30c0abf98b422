//! Wayback Machine submission
//!
//! Every URL the crawl fetched successfully is offered to the archive
//! endpoint with a HEAD request. Submissions go through a token bucket
//! and a small concurrent worker set, within the rate the endpoint
//! tolerates.

use crate::sink::SinkError;
use futures_util::StreamExt;
use reqwest::Client;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

const ARCHIVE_ENDPOINT: &str = "https://web.archive.org/save";

/// Requests per minute the archive endpoint tolerates
const ARCHIVE_RATE_PER_MINUTE: f64 = 15.0;

/// Burst size: a fresh bucket allows this many immediate submissions
const ARCHIVE_BURST: f64 = 15.0;

const ARCHIVE_CONCURRENCY: usize = 4;

/// Token bucket limiter: `refill_per_sec` tokens accrue per second up to
/// `capacity`; each request takes one.
struct TokenBucket {
    state: Mutex<BucketState>,
    capacity: f64,
    refill_per_sec: f64,
}

struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn new(capacity: f64, refill_per_sec: f64) -> Self {
        Self {
            state: Mutex::new(BucketState {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
            capacity,
            refill_per_sec,
        }
    }

    /// Waits until a token is available and takes it.
    async fn acquire(&self) {
        loop {
            let wait = {
                let mut state = self.state.lock().await;
                let now = Instant::now();
                let elapsed = now.duration_since(state.last_refill).as_secs_f64();
                state.tokens = (state.tokens + elapsed * self.refill_per_sec).min(self.capacity);
                state.last_refill = now;

                if state.tokens >= 1.0 {
                    state.tokens -= 1.0;
                    return;
                }

                let needed = 1.0 - state.tokens;
                Duration::from_secs_f64((needed / self.refill_per_sec).max(0.001))
            };
            sleep(wait).await;
        }
    }
}

/// Submits successfully fetched URLs to the Wayback Machine
pub struct ArchiveSink {
    client: Client,
    limiter: TokenBucket,
}

impl ArchiveSink {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            limiter: TokenBucket::new(ARCHIVE_BURST, ARCHIVE_RATE_PER_MINUTE / 60.0),
        }
    }

    /// Archives every URL in the list, honoring the cancellation token.
    ///
    /// Individual failures are logged and counted; cancellation skips the
    /// remaining URLs without counting as failure.
    pub async fn archive_all(
        &self,
        urls: &[String],
        cancel: &CancellationToken,
    ) -> Result<(), SinkError> {
        tracing::info!("archiving {} urls", urls.len());

        let failed: usize = futures_util::stream::iter(urls)
            .map(|url| async move {
                tokio::select! {
                    result = self.archive(url) => {
                        if let Err(err) = result {
                            tracing::warn!("archive submission for {} failed: {}", url, err);
                            1
                        } else {
                            0
                        }
                    }
                    _ = cancel.cancelled() => 0,
                }
            })
            .buffer_unordered(ARCHIVE_CONCURRENCY)
            .fold(0, |acc, n| async move { acc + n })
            .await;

        if failed > 0 {
            return Err(SinkError::Archive {
                failed,
                total: urls.len(),
            });
        }
        Ok(())
    }

    async fn archive(&self, url: &str) -> Result<(), reqwest::Error> {
        self.limiter.acquire().await;
        self.client
            .head(format!("{}/{}", ARCHIVE_ENDPOINT, url))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
