//! Crawler coordinator - main crawl orchestration logic
//!
//! The coordinator drives a crawl as a sequence of waves:
//!
//! ```text
//! Seeded -> (WaveRunning -> WaveComplete -> QueryPending)* -> Done
//! ```
//!
//! The first wave holds only the seed link. After each wave the coordinator
//! asks storage for links under the base origin that are root-relative and
//! still have no status, and feeds them to the next wave. The crawl ends when
//! that query comes back empty.

use crate::config::Config;
use crate::crawler::fetcher::build_http_client;
use crate::crawler::scheduler::{WaveReport, WaveScheduler};
use crate::crawler::session::CrawlSession;
use crate::link::Link;
use crate::storage::{LinkStore, StorageError};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use url::Url;

/// Where the crawl driver currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    /// Holding the seed link, no wave run yet
    Seeded,
    /// A wave is in progress
    WaveRunning,
    /// The last wave has fully completed
    WaveComplete,
    /// Querying storage for the next wave
    QueryPending,
    /// No pending links remain
    Done,
}

/// Totals for a finished crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Number of waves run (including the seed wave)
    pub waves: usize,

    /// Targets fetched across all waves
    pub targets_fetched: usize,

    /// Targets whose fetch failed at the transport level
    pub targets_failed: usize,

    /// New links extracted across all waves
    pub links_discovered: usize,

    /// The origin established from the first 200 response, if any
    pub base_origin: Option<String>,

    /// Wall-clock duration of the crawl
    pub elapsed: Duration,
}

/// Main crawler coordinator structure
pub struct Coordinator<S> {
    seed: Url,
    session: Arc<CrawlSession>,
    storage: Arc<Mutex<S>>,
    scheduler: WaveScheduler<S>,
    state: CrawlState,
}

impl<S: LinkStore + 'static> Coordinator<S> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `seed` - The validated starting URL
    /// * `storage` - The link store to persist into
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(AtlasError)` - Failed to build the HTTP client
    pub fn new(config: &Config, seed: Url, storage: S) -> crate::Result<Self> {
        let client = build_http_client(&config.crawler, &config.user_agent)?;
        let session = Arc::new(CrawlSession::new());
        let storage = Arc::new(Mutex::new(storage));

        let scheduler = WaveScheduler::new(
            client,
            Arc::clone(&session),
            Arc::clone(&storage),
            config.crawler.concurrency as usize,
        );

        Ok(Self {
            seed,
            session,
            storage,
            scheduler,
            state: CrawlState::Seeded,
        })
    }

    /// Current driver state
    pub fn state(&self) -> CrawlState {
        self.state
    }

    /// The crawl session shared with every task
    pub fn session(&self) -> &Arc<CrawlSession> {
        &self.session
    }

    /// The link store shared with every task
    pub fn storage(&self) -> &Arc<Mutex<S>> {
        &self.storage
    }

    /// Runs waves until no pending links remain
    ///
    /// Waves run strictly one after another; wave N+1 starts only after
    /// every task of wave N has finished.
    pub async fn run(&mut self) -> crate::Result<CrawlSummary> {
        let start_time = Instant::now();
        tracing::info!("Starting crawl from {}", self.seed);

        let mut summary = CrawlSummary {
            waves: 0,
            targets_fetched: 0,
            targets_failed: 0,
            links_discovered: 0,
            base_origin: None,
            elapsed: Duration::ZERO,
        };
        let mut pending = vec![Link::seed(self.seed.as_str())];

        loop {
            self.state = CrawlState::WaveRunning;
            summary.waves += 1;
            let wave_size = pending.len();
            tracing::info!("Wave {}: {} links", summary.waves, wave_size);

            let report = self.scheduler.run_wave(pending).await;
            self.state = CrawlState::WaveComplete;
            log_wave(summary.waves, wave_size, &report);

            summary.targets_fetched += report.processed;
            summary.targets_failed += report.failed;
            summary.links_discovered += report.links_discovered;

            self.state = CrawlState::QueryPending;
            pending = self.next_wave();

            if pending.is_empty() {
                self.state = CrawlState::Done;
                break;
            }
        }

        summary.base_origin = self.session.base_origin().map(str::to_string);
        summary.elapsed = start_time.elapsed();

        tracing::info!(
            "Crawl completed: {} waves, {} targets fetched, {} failed, {} links discovered in {:?}",
            summary.waves,
            summary.targets_fetched,
            summary.targets_failed,
            summary.links_discovered,
            summary.elapsed
        );

        Ok(summary)
    }

    /// Queries storage for the next wave's targets
    ///
    /// Links already attempted in this session are dropped so a target whose
    /// fetch failed (and therefore has no status) is not fetched again. A
    /// failed query ends the crawl.
    fn next_wave(&self) -> Vec<Link> {
        let Some(base_origin) = self.session.base_origin() else {
            tracing::warn!("No base origin established; nothing left to crawl");
            return Vec::new();
        };

        let queried = self
            .storage
            .lock()
            .map_err(|_| StorageError::LockPoisoned)
            .and_then(|storage| storage.find_pending(base_origin));

        let links = match queried {
            Ok(links) => links,
            Err(e) => {
                tracing::error!("Failed to query pending links: {}", e);
                return Vec::new();
            }
        };

        let found = links.len();
        let pending: Vec<Link> = links
            .into_iter()
            .filter(|link| link.id.map_or(true, |id| self.session.mark_attempted(id)))
            .collect();

        if pending.len() < found {
            tracing::debug!(
                "Skipping {} pending links already attempted this run",
                found - pending.len()
            );
        }

        pending
    }
}

fn log_wave(wave: usize, size: usize, report: &WaveReport) {
    tracing::info!(
        "Wave {} complete: {}/{} fetched, {} failed, {} new links, peak concurrency {}",
        wave,
        report.processed,
        size,
        report.failed,
        report.links_discovered,
        report.peak_in_flight
    );
}

/// Runs a complete crawl against the given store
///
/// # Example
///
/// ```no_run
/// use link_atlas::config::Config;
/// use link_atlas::crawler::run_crawl;
/// use link_atlas::storage::SqliteStorage;
/// use link_atlas::url::validate_seed_url;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::default();
/// let seed = validate_seed_url("https://example.com")?;
/// let storage = SqliteStorage::new_in_memory()?;
/// let summary = run_crawl(&config, seed, storage).await?;
/// println!("{} waves", summary.waves);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl<S: LinkStore + 'static>(
    config: &Config,
    seed: Url,
    storage: S,
) -> crate::Result<CrawlSummary> {
    let mut coordinator = Coordinator::new(config, seed, storage)?;
    coordinator.run().await
}
