//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching and status classification
//! - HTML parsing and anchor extraction
//! - Bounded-concurrency wave scheduling
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;
mod session;

pub use coordinator::{run_crawl, Coordinator, CrawlState, CrawlSummary};
pub use fetcher::{build_http_client, fetch_url, status_message, FetchResult};
pub use parser::{
    extract_from_body, extract_links, is_html_content_type, parse_document, ParseError,
};
pub use scheduler::{TaskOutcome, WaveReport, WaveScheduler};
pub use session::CrawlSession;

use crate::config::Config;
use crate::storage::open_storage;
use std::path::Path;
use url::Url;

/// Runs a complete crawl into the configured database
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Open (or create) the link database
/// 2. Build the HTTP client
/// 3. Fetch the seed and record its links
/// 4. Run waves over pending root-relative links until none remain
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `seed` - The validated starting URL
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - Crawl completed
/// * `Err(AtlasError)` - Storage or client setup failed
pub async fn crawl(config: &Config, seed: Url) -> crate::Result<CrawlSummary> {
    let storage = open_storage(Path::new(&config.output.database_path))?;
    run_crawl(config, seed, storage).await
}
