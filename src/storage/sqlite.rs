//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the LinkStore trait.

use crate::link::Link;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{LinkStore, StorageError, StorageResult};
use crate::storage::LinkCounts;
use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode, Row};
use std::path::Path;

/// Columns selected for every full link read, in `link_from_row` order
const LINK_COLUMNS: &str = "id, href, text, source_url, base_url, status_code, status_message";

/// Rows that belong to an origin: resolved against it, or found on one of its pages.
/// The source match stops at a path boundary so `https://example.com` never
/// matches `https://example.com.evil.org` or `http://localhost:30001`.
const ORIGIN_SCOPE: &str = "(base_url = ?1
    OR source_url = ?1
    OR substr(source_url, 1, length(?1) + 1) = ?1 || '/')";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for tests and throwaway crawls)
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn link_from_row(row: &Row<'_>) -> rusqlite::Result<Link> {
    Ok(Link {
        id: Some(row.get(0)?),
        href: row.get(1)?,
        text: row.get(2)?,
        source_url: row.get(3)?,
        base_url: row.get(4)?,
        status_code: row.get(5)?,
        status_message: row.get(6)?,
    })
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

impl LinkStore for SqliteStorage {
    // ===== Crawl Queries =====

    fn find_pending(&self, base_origin: &str) -> StorageResult<Vec<Link>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM links
             WHERE base_url = ?1 AND href LIKE '/%' AND status_code IS NULL
             ORDER BY id",
            LINK_COLUMNS
        ))?;

        let links = stmt
            .query_map(params![base_origin], link_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(links)
    }

    // ===== Link Management =====

    fn insert(&mut self, link: &Link) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        let result = self.conn.execute(
            "INSERT INTO links (href, text, source_url, base_url, status_code, status_message, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                link.href,
                link.text,
                link.source_url,
                link.base_url,
                link.status_code,
                link.status_message,
                now
            ],
        );

        match result {
            Ok(_) => Ok(self.conn.last_insert_rowid()),
            Err(e) if is_constraint_violation(&e) => Err(StorageError::Duplicate {
                href: link.href.clone(),
                base_url: link.base_url.clone(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    fn insert_bulk(&mut self, links: &[Link]) -> StorageResult<u64> {
        if links.is_empty() {
            return Ok(0);
        }

        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        let mut inserted = 0u64;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO links (href, text, source_url, base_url, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for link in links {
                inserted += stmt.execute(params![
                    link.href,
                    link.text,
                    link.source_url,
                    link.base_url,
                    now
                ])? as u64;
            }
        }
        tx.commit()?;

        Ok(inserted)
    }

    fn update_status(&mut self, link: &Link) -> StorageResult<u64> {
        let Some(id) = link.id else {
            return Ok(0);
        };

        // Status is written once; an already-resolved row is left untouched
        let affected = self.conn.execute(
            "UPDATE links SET status_code = ?1, status_message = ?2
             WHERE id = ?3 AND status_code IS NULL",
            params![link.status_code, link.status_message, id],
        )?;

        Ok(affected as u64)
    }

    // ===== Reporting =====

    fn all_links_from(&self, base_origin: &str) -> StorageResult<Vec<Link>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM links WHERE {} ORDER BY href, id",
            LINK_COLUMNS, ORIGIN_SCOPE
        ))?;

        let links = stmt
            .query_map(params![base_origin], link_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(links)
    }

    fn count_links(&self, base_origin: &str) -> StorageResult<LinkCounts> {
        let query = format!(
            "SELECT
                COUNT(*),
                COALESCE(SUM(CASE WHEN status_code IS NOT NULL THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN base_url = ?1 AND href LIKE '/%' AND status_code IS NULL
                             THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status_code >= 400 THEN 1 ELSE 0 END), 0)
             FROM links WHERE {}",
            ORIGIN_SCOPE
        );

        let counts = self.conn.query_row(&query, params![base_origin], |row| {
            Ok(LinkCounts {
                total: row.get::<_, i64>(0)? as u64,
                resolved: row.get::<_, i64>(1)? as u64,
                pending: row.get::<_, i64>(2)? as u64,
                broken: row.get::<_, i64>(3)? as u64,
            })
        })?;

        Ok(counts)
    }
}
