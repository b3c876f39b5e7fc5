//! Storage module for persisting the link graph
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - Inserting newly extracted links (single and batched)
//! - Recording fetch status on crawl targets
//! - Querying pending root-relative links for the next wave

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{LinkStore, StorageError, StorageResult};

use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(StorageError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path)
}

/// Link counts for one base origin
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkCounts {
    /// All links recorded under the origin
    pub total: u64,

    /// Links that have been fetched and carry a status
    pub resolved: u64,

    /// Root-relative links still waiting to be fetched
    pub pending: u64,

    /// Resolved links whose status code is 400 or above
    pub broken: u64,
}
