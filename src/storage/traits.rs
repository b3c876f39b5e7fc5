//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::link::Link;
use crate::storage::LinkCounts;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Link already exists: {href} (base '{base_url}')")]
    Duplicate { href: String, base_url: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// This is the gateway the crawler persists through. The crawler shares one
/// store between concurrent tasks behind a mutex, so implementations only
/// need `Send`.
pub trait LinkStore: Send {
    // ===== Crawl Queries =====

    /// Finds links waiting to be fetched
    ///
    /// Returns links whose `base_url` equals `base_origin`, whose `href`
    /// starts with `/`, and whose status is still absent.
    fn find_pending(&self, base_origin: &str) -> StorageResult<Vec<Link>>;

    // ===== Link Management =====

    /// Inserts one new link and returns its id
    ///
    /// Fails with `StorageError::Duplicate` if a link with the same
    /// (href, base_url) pair already exists.
    fn insert(&mut self, link: &Link) -> StorageResult<i64>;

    /// Inserts the links extracted from one page
    ///
    /// Best effort: links colliding with an existing (href, base_url) pair
    /// are skipped. Returns the number of rows inserted.
    fn insert_bulk(&mut self, links: &[Link]) -> StorageResult<u64>;

    /// Writes `status_code`/`status_message` for an existing link by id
    ///
    /// Returns the number of rows affected (zero when the link has no id or
    /// the id is unknown).
    fn update_status(&mut self, link: &Link) -> StorageResult<u64>;

    // ===== Reporting =====

    /// Gets every link recorded under a base origin, ordered by href
    fn all_links_from(&self, base_origin: &str) -> StorageResult<Vec<Link>>;

    /// Counts links recorded under a base origin
    fn count_links(&self, base_origin: &str) -> StorageResult<LinkCounts>;
}
