//! Wave scheduler: bounded-concurrency processing of one list of pending links
//!
//! A wave spawns one task per pending link into a `JoinSet`. Each task must
//! hold a permit from a fixed-size semaphore while it fetches, extracts and
//! persists, so at most `concurrency` tasks do work at once. `run_wave`
//! returns only after every task in the set has finished, which gives the
//! crawl driver a full barrier between waves.

use crate::crawler::fetcher::{fetch_url, FetchResult};
use crate::crawler::parser::extract_from_body;
use crate::crawler::session::CrawlSession;
use crate::link::Link;
use crate::storage::{LinkStore, StorageError, StorageResult};
use reqwest::Client;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Outcome of a single crawl-target task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The target was fetched and its status recorded
    Fetched {
        /// Number of links extracted from the page
        links_discovered: usize,
    },

    /// The fetch failed at the transport level; nothing was recorded
    Failed,
}

/// Summary of one completed wave
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WaveReport {
    /// Targets fetched (any HTTP status)
    pub processed: usize,

    /// Targets whose task failed (transport error or task panic)
    pub failed: usize,

    /// New links extracted across all pages in the wave
    pub links_discovered: usize,

    /// Highest number of tasks observed holding a permit at the same time
    pub peak_in_flight: usize,
}

/// Tracks how many tasks currently hold a permit
#[derive(Debug, Default)]
struct InFlight {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl InFlight {
    fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }

    fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

/// Runs waves of crawl-target tasks with a fixed concurrency cap
pub struct WaveScheduler<S> {
    client: Client,
    session: Arc<CrawlSession>,
    storage: Arc<Mutex<S>>,
    concurrency: usize,
}

impl<S> Clone for WaveScheduler<S> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            session: Arc::clone(&self.session),
            storage: Arc::clone(&self.storage),
            concurrency: self.concurrency,
        }
    }
}

impl<S: LinkStore + 'static> WaveScheduler<S> {
    /// Creates a new wave scheduler
    ///
    /// # Arguments
    ///
    /// * `client` - Shared HTTP client
    /// * `session` - The crawl session (dedup set, base origin)
    /// * `storage` - The link store shared by every task
    /// * `concurrency` - Permit pool size; clamped to at least 1
    pub fn new(
        client: Client,
        session: Arc<CrawlSession>,
        storage: Arc<Mutex<S>>,
        concurrency: usize,
    ) -> Self {
        Self {
            client,
            session,
            storage,
            concurrency: concurrency.max(1),
        }
    }

    /// The permit pool size
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Processes every pending link and waits for all of them to finish
    ///
    /// Per-task failures are logged and counted, never returned.
    pub async fn run_wave(&self, pending: Vec<Link>) -> WaveReport {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let in_flight = Arc::new(InFlight::default());
        let mut tasks = JoinSet::new();

        for link in pending {
            let scheduler = self.clone();
            let semaphore = Arc::clone(&semaphore);
            let in_flight = Arc::clone(&in_flight);

            tasks.spawn(async move {
                // The semaphore is never closed, so acquire only fails if it is dropped
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return TaskOutcome::Failed,
                };

                in_flight.enter();
                let outcome = scheduler.process_link(link).await;
                in_flight.leave();
                outcome
            });
        }

        let mut report = WaveReport::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(TaskOutcome::Fetched { links_discovered }) => {
                    report.processed += 1;
                    report.links_discovered += links_discovered;
                }
                Ok(TaskOutcome::Failed) => report.failed += 1,
                Err(e) => {
                    tracing::error!("Crawl task aborted: {}", e);
                    report.failed += 1;
                }
            }
        }
        report.peak_in_flight = in_flight.peak();

        report
    }

    /// Fetches one target, extracts and persists its links, then records its status
    async fn process_link(&self, mut link: Link) -> TaskOutcome {
        let url = link.target_url();
        tracing::debug!("Fetching {}", url);

        let result = fetch_url(&self.client, &url, &self.session).await;

        if let Some((status_code, status_message)) = result.status() {
            link.record_status(status_code, status_message);
        }

        let mut links_discovered = 0;
        match result {
            FetchResult::NetworkError { error } => {
                tracing::warn!("Fetch failed for {}: {}", url, error);
                return TaskOutcome::Failed;
            }
            FetchResult::HttpError { status_code, .. } => {
                tracing::debug!("{} returned HTTP {}", url, status_code);
            }
            FetchResult::BodyError { error, .. } => {
                tracing::warn!("Failed to read body of {}: {}", url, error);
            }
            FetchResult::Success {
                content_type, body, ..
            } => match extract_from_body(&body, content_type.as_deref(), &url, &self.session) {
                Ok(extracted) => {
                    links_discovered = extracted.len();
                    self.save_links(extracted, &url);
                }
                Err(e) => tracing::warn!("Failed to parse {}: {}", url, e),
            },
        }

        match self.with_storage(|storage| storage.update_status(&link)) {
            Ok(0) if link.id.is_some() => {
                tracing::debug!("Status for {} was already recorded", url)
            }
            Ok(_) => {}
            Err(e) => tracing::error!("Failed to record status for {}: {}", url, e),
        }

        TaskOutcome::Fetched { links_discovered }
    }

    /// Persists the links extracted from one page as a single batch
    ///
    /// Root-relative links are tagged with the base origin so later waves can
    /// find them. Failures are logged and the links are dropped.
    fn save_links(&self, mut links: Vec<Link>, source_url: &str) {
        if links.is_empty() {
            return;
        }

        let base_origin = self.session.base_origin().unwrap_or_default();
        for link in links.iter_mut().filter(|l| l.is_root_relative()) {
            link.base_url = base_origin.to_string();
        }

        match self.with_storage(|storage| storage.insert_bulk(&links)) {
            Ok(saved) => tracing::info!(
                "Saved {} of {} links from {}",
                saved,
                links.len(),
                source_url
            ),
            Err(e) => tracing::error!(
                "Failed to save {} links from {}: {}",
                links.len(),
                source_url,
                e
            ),
        }
    }

    fn with_storage<T>(&self, op: impl FnOnce(&mut S) -> StorageResult<T>) -> StorageResult<T> {
        let mut storage = self
            .storage
            .lock()
            .map_err(|_| StorageError::LockPoisoned)?;
        op(&mut storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::crawler::fetcher::build_http_client;
    use crate::storage::SqliteStorage;

    fn scheduler(concurrency: usize) -> WaveScheduler<SqliteStorage> {
        let config = Config::default();
        let client = build_http_client(&config.crawler, &config.user_agent).unwrap();
        WaveScheduler::new(
            client,
            Arc::new(CrawlSession::new()),
            Arc::new(Mutex::new(SqliteStorage::new_in_memory().unwrap())),
            concurrency,
        )
    }

    #[test]
    fn test_concurrency_clamped() {
        assert_eq!(scheduler(0).concurrency(), 1);
        assert_eq!(scheduler(4).concurrency(), 4);
    }

    #[tokio::test]
    async fn test_empty_wave() {
        let report = scheduler(2).run_wave(vec![]).await;
        assert_eq!(report, WaveReport::default());
    }

    #[tokio::test]
    async fn test_transport_failures_do_not_fail_wave() {
        let scheduler = scheduler(2);
        let pending = vec![
            Link::seed("http://127.0.0.1:9/a"),
            Link::seed("http://127.0.0.1:9/b"),
            Link::seed("http://127.0.0.1:9/c"),
        ];

        let report = scheduler.run_wave(pending).await;

        assert_eq!(report.failed, 3);
        assert_eq!(report.processed, 0);
        assert!(report.peak_in_flight <= 2);
    }

    #[test]
    fn test_in_flight_peak() {
        let gauge = InFlight::default();
        gauge.enter();
        gauge.enter();
        gauge.leave();
        gauge.enter();
        gauge.leave();
        gauge.leave();

        assert_eq!(gauge.peak(), 2);
    }
}
