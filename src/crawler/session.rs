//! Crawl session state shared by every task of one crawl
//!
//! A session owns the process-lifetime href dedup set, the write-once base
//! origin, and the ids of links already attempted as crawl targets. It is
//! created by the caller and handed to every wave, so separate crawls (and
//! separate tests) never share state.

use std::collections::HashSet;
use std::sync::{Mutex, OnceLock, RwLock};

/// Shared state for a single crawl run
#[derive(Debug, Default)]
pub struct CrawlSession {
    seen_hrefs: RwLock<HashSet<String>>,
    base_origin: OnceLock<String>,
    attempted: Mutex<HashSet<i64>>,
}

impl CrawlSession {
    /// Creates an empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims an href for extraction
    ///
    /// Returns true exactly once per distinct href for the lifetime of the
    /// session. The membership check and the insert happen under one write
    /// lock, so two concurrent extractions can never both claim the same href.
    pub fn claim_href(&self, href: &str) -> bool {
        if self.has_seen(href) {
            return false;
        }

        let mut seen = self
            .seen_hrefs
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        seen.insert(href.to_string())
    }

    /// Returns true if the href has already been claimed
    pub fn has_seen(&self, href: &str) -> bool {
        self.seen_hrefs
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains(href)
    }

    /// Number of distinct hrefs claimed so far
    pub fn seen_count(&self) -> usize {
        self.seen_hrefs
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// The base origin, once established
    pub fn base_origin(&self) -> Option<&str> {
        self.base_origin.get().map(String::as_str)
    }

    /// Establishes the base origin if it is still unset
    ///
    /// The first caller wins; later calls leave the value untouched and
    /// return false.
    pub fn establish_base_origin(&self, origin: String) -> bool {
        self.base_origin.set(origin).is_ok()
    }

    /// Marks a stored link id as attempted
    ///
    /// Returns false if the id had already been attempted in this session.
    pub fn mark_attempted(&self, link_id: i64) -> bool {
        self.attempted
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(link_id)
    }

    /// Returns true if the stored link id has already been attempted
    pub fn was_attempted(&self, link_id: i64) -> bool {
        self.attempted
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains(&link_id)
    }
}
