//! Crawl coordination
//!
//! A single event loop owns the work queue, the page store, and the
//! in-flight counter, and talks to a fixed pool of fetch workers over two
//! capacity-1 channels. Serializing every queue and store update through
//! one `select!` means no lock protects either, and the termination
//! condition (queue empty AND nothing in flight) can be evaluated without
//! races.

use crate::config::Config;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::queue::WorkQueue;
use crate::crawler::store::{FetchResult, PageStore};
use futures_util::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

/// What a worker hands back for one dispatched URL.
///
/// Every dispatch produces exactly one reply, so the in-flight counter
/// always drains to zero, even after cancellation: aborted fetches reply
/// without a page.
enum WorkerReply {
    Page(FetchResult),
    Aborted,
}

/// Outcome of a finished crawl
#[derive(Debug)]
pub struct Crawl {
    /// Every page visited, keyed by final URL
    pub pages: PageStore,
    /// True when the crawl was cut short by the cancellation token
    pub cancelled: bool,
}

/// Runs the event loop until the site is exhausted or the token fires.
pub struct Coordinator {
    fetcher: Arc<Fetcher>,
    workers: usize,
    root: String,
}

impl Coordinator {
    pub fn new(config: &Config, fetcher: Fetcher, root: String) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            workers: config.workers,
            root,
        }
    }

    /// Crawls everything reachable from the root.
    ///
    /// Work dispatch and result intake share one `select!`; the dispatch
    /// branch is disabled while the queue is empty. On cancellation the
    /// loop stops dispatching but keeps receiving until the in-flight
    /// counter reaches zero, then closes the feed channel so every worker
    /// exits.
    pub async fn run(self, cancel: CancellationToken) -> Crawl {
        tracing::info!("starting {} crawl workers", self.workers);

        let (work_tx, work_rx) = mpsc::channel::<String>(1);
        let (reply_tx, mut reply_rx) = mpsc::channel::<WorkerReply>(1);

        let pool = self.spawn_workers(work_rx, reply_tx, cancel.clone());

        let mut queue = WorkQueue::new(&self.root);
        let mut pages = PageStore::new();
        let mut in_flight: usize = 0;
        let mut cancelled = false;

        while in_flight > 0 || (!queue.is_empty() && !cancelled) {
            tokio::select! {
                permit = work_tx.reserve(), if !queue.is_empty() && !cancelled => {
                    match permit {
                        Ok(permit) => {
                            // head() is Some while the queue is non-empty
                            if let Some(url) = queue.pop() {
                                permit.send(url);
                                in_flight += 1;
                            }
                        }
                        Err(_) => break,
                    }
                }

                reply = reply_rx.recv() => {
                    match reply {
                        Some(WorkerReply::Page(result)) => {
                            in_flight -= 1;
                            self.ingest(result, &mut pages, &mut queue);
                        }
                        Some(WorkerReply::Aborted) => {
                            in_flight -= 1;
                        }
                        None => break,
                    }
                }

                _ = cancel.cancelled(), if !cancelled => {
                    tracing::info!("cancellation requested, draining {} in-flight fetches", in_flight);
                    cancelled = true;
                }
            }
        }

        // Closing the feed terminates the worker pool.
        drop(work_tx);
        let _ = pool.await;

        tracing::info!("crawl finished: {} pages visited", pages.len());
        Crawl { pages, cancelled }
    }

    /// Stores a result under its final URL and offers newly discovered
    /// links to the queue when the page is under the root prefix.
    fn ingest(&self, result: FetchResult, pages: &mut PageStore, queue: &mut WorkQueue) {
        let under_root = result.url.starts_with(&self.root);
        let record = pages.insert(result);
        if under_root {
            for link in &record.links {
                queue.enqueue(link);
            }
        }
    }

    /// Launches the worker pool: a single task running up to `workers`
    /// concurrent fetches off the feed channel.
    fn spawn_workers(
        &self,
        work_rx: mpsc::Receiver<String>,
        reply_tx: mpsc::Sender<WorkerReply>,
        cancel: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        let fetcher = self.fetcher.clone();
        let workers = self.workers;

        tokio::spawn(async move {
            ReceiverStream::new(work_rx)
                .for_each_concurrent(workers, |url| {
                    let fetcher = fetcher.clone();
                    let reply_tx = reply_tx.clone();
                    let cancel = cancel.clone();

                    async move {
                        // Racing the token against the request aborts the
                        // in-flight I/O promptly on cancellation.
                        let reply = tokio::select! {
                            result = fetcher.fetch(&url) => WorkerReply::Page(result),
                            _ = cancel.cancelled() => WorkerReply::Aborted,
                        };
                        let _ = reply_tx.send(reply).await;
                    }
                })
                .await;
        })
    }
}
