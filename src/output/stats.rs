//! Link statistics for a recorded site
//!
//! This module provides functionality for extracting and displaying
//! link counts from the storage layer.

use crate::output::OutputResult;
use crate::storage::{LinkCounts, LinkStore};

/// Loads link counts for a site from storage
///
/// # Arguments
///
/// * `storage` - The link store to query
/// * `base_origin` - The site's origin, e.g. `https://example.com`
pub fn load_statistics(storage: &dyn LinkStore, base_origin: &str) -> OutputResult<LinkCounts> {
    Ok(storage.count_links(base_origin)?)
}

/// Formats link counts as a human-readable block
pub fn format_statistics(base_origin: &str, counts: &LinkCounts) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== Link Statistics: {} ===\n\n", base_origin));
    out.push_str(&format!("  Total links:    {}\n", counts.total));
    out.push_str(&format!(
        "  Resolved:       {} ({:.1}%)\n",
        counts.resolved,
        percentage(counts.resolved, counts.total)
    ));
    out.push_str(&format!("  Pending:        {}\n", counts.pending));
    out.push_str(&format!(
        "  Broken (4xx+):  {} ({:.1}% of resolved)\n",
        counts.broken,
        percentage(counts.broken, counts.resolved)
    ));

    out
}

/// Prints link counts to stdout
pub fn print_statistics(base_origin: &str, counts: &LinkCounts) {
    print!("{}", format_statistics(base_origin, counts));
}

fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        (part as f64 / whole as f64) * 100.0
    }
}
