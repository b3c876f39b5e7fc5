//! CSV link report
//!
//! One row per link recorded under a site's origin:
//!
//! ```text
//! link,text,status code,status message
//! https://example.com/about,About us,200,200 OK
//! https://example.com/missing,Old page,404,404 Not Found
//! https://example.com/later,Later,,
//! ```
//!
//! Links that were never fetched (external links, or targets whose fetch
//! failed) have empty status columns.

use crate::link::Link;
use crate::output::OutputResult;
use crate::storage::LinkStore;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const HEADER: [&str; 4] = ["link", "text", "status code", "status message"];

/// A single report line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub link: String,
    pub text: String,
    pub status_code: String,
    pub status_message: String,
}

impl From<&Link> for ReportRow {
    fn from(link: &Link) -> Self {
        Self {
            link: format!("{}{}", link.base_url, link.href),
            text: link.text.clone(),
            status_code: link
                .status_code
                .map(|code| code.to_string())
                .unwrap_or_default(),
            status_message: link.status_message.clone().unwrap_or_default(),
        }
    }
}

/// Loads the report rows for a site, ordered by href
pub fn report_rows(storage: &dyn LinkStore, base_origin: &str) -> OutputResult<Vec<ReportRow>> {
    let links = storage.all_links_from(base_origin)?;
    Ok(links.iter().map(ReportRow::from).collect())
}

/// Writes the CSV report for a site to a file
///
/// # Arguments
///
/// * `storage` - The link store to read from
/// * `base_origin` - The site's origin, e.g. `https://example.com`
/// * `output_path` - Where the CSV file is written (truncated if present)
///
/// # Returns
///
/// * `Ok(usize)` - Number of rows written, excluding the header
/// * `Err(OutputError)` - Failed to query or write
pub fn write_link_report(
    storage: &dyn LinkStore,
    base_origin: &str,
    output_path: &Path,
) -> OutputResult<usize> {
    let rows = report_rows(storage, base_origin)?;
    let file = File::create(output_path)?;
    write_rows(file, &rows)?;

    tracing::info!(
        "Wrote {} links to {}",
        rows.len(),
        output_path.display()
    );
    Ok(rows.len())
}

fn write_rows<W: Write>(writer: W, rows: &[ReportRow]) -> OutputResult<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(HEADER)?;

    for row in rows {
        writer.write_record([
            row.link.as_str(),
            row.text.as_str(),
            row.status_code.as_str(),
            row.status_message.as_str(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
