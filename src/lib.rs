//! Link-Atlas: a same-site link graph recorder
//!
//! This crate crawls a website from a single seed URL, records every anchor it
//! finds (href, visible text, source page) and the HTTP outcome of each
//! root-relative link, and repeats in waves until no unexplored paths remain.

pub mod config;
pub mod crawler;
pub mod link;
pub mod output;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Link-Atlas operations
#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("URL should start with https:// or http://, got scheme '{0}'")]
    InvalidScheme(String),

    #[error("URL is missing a host (e.g. example.com)")]
    MissingHost,
}

/// Result type alias for Link-Atlas operations
pub type Result<T> = std::result::Result<T, AtlasError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, CrawlSession, CrawlSummary};
pub use link::Link;
pub use crate::url::{origin_of, validate_seed_url};
