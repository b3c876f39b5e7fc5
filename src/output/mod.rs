//! Output module for reporting on the recorded link graph
//!
//! This module handles:
//! - Exporting the links of a site as a CSV report
//! - Printing link counts for a site

mod report;
pub mod stats;

pub use report::{report_rows, write_link_report, ReportRow};
pub use stats::{format_statistics, load_statistics, print_statistics};

use crate::storage::StorageError;
use thiserror::Error;

/// Errors raised while producing output
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
