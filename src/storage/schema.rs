//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Link-Atlas database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Every anchor extracted during any crawl
CREATE TABLE IF NOT EXISTS links (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    href TEXT NOT NULL,
    text TEXT NOT NULL DEFAULT '',
    source_url TEXT NOT NULL,
    base_url TEXT NOT NULL DEFAULT '',
    status_code INTEGER,
    status_message TEXT,
    created_at TEXT NOT NULL,
    UNIQUE(href, base_url)
);

CREATE INDEX IF NOT EXISTS idx_links_base_url ON links(base_url);
CREATE INDEX IF NOT EXISTS idx_links_status_code ON links(status_code);
CREATE INDEX IF NOT EXISTS idx_links_source_url ON links(source_url);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
