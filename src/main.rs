//! Link-Atlas main entry point
//!
//! This is the command-line interface for the Link-Atlas link graph recorder.

use clap::Parser;
use link_atlas::config::{load_config, validate, Config};
use link_atlas::crawler::crawl;
use link_atlas::storage::open_storage;
use link_atlas::url::{origin_of, validate_seed_url};
use link_atlas::UrlError;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use url::Url;

/// Link-Atlas: records the link graph of a website
///
/// Link-Atlas crawls a site from a single starting URL, stores every anchor
/// it finds in SQLite together with the HTTP status of each same-site link,
/// and keeps going until no unexplored paths remain.
#[derive(Parser, Debug)]
#[command(name = "link-atlas")]
#[command(version)]
#[command(about = "Records the link graph of a website", long_about = None)]
struct Cli {
    /// Starting URL, e.g. https://example.com
    #[arg(value_name = "URL")]
    url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// SQLite database path (overrides config)
    #[arg(long, value_name = "FILE")]
    database: Option<String>,

    /// Write a CSV link report to this path after the crawl (overrides config)
    #[arg(long, value_name = "FILE")]
    report: Option<String>,

    /// Maximum concurrent fetches per wave (overrides config)
    #[arg(long, value_name = "N")]
    concurrency: Option<u32>,

    /// Per-request timeout in seconds (overrides config)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Show link statistics for the URL's site from the database and exit
    #[arg(long)]
    stats: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // The seed is validated before any storage or network activity
    let seed = match validate_seed_url(&cli.url) {
        Ok(seed) => seed,
        Err(e) => {
            tracing::error!("Invalid URL '{}': {}", cli.url, e);
            return Err(e.into());
        }
    };

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.stats {
        handle_stats(&config, &seed)?;
    } else {
        handle_crawl(&config, seed).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("link_atlas=info,warn"),
            1 => EnvFilter::new("link_atlas=debug,info"),
            2 => EnvFilter::new("link_atlas=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file (if any) and applies command-line overrides
fn build_config(cli: &Cli) -> link_atlas::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)?
        }
        None => Config::default(),
    };

    if let Some(database) = &cli.database {
        config.output.database_path = database.clone();
    }
    if let Some(report) = &cli.report {
        config.output.report_path = Some(report.clone());
    }
    if let Some(concurrency) = cli.concurrency {
        config.crawler.concurrency = concurrency;
    }
    if let Some(timeout) = cli.timeout {
        config.crawler.request_timeout_secs = timeout;
    }

    // Overrides go through the same checks as file values
    validate(&config)?;
    Ok(config)
}

/// Handles the --stats mode: shows link counts for the seed's site
fn handle_stats(config: &Config, seed: &Url) -> link_atlas::Result<()> {
    use link_atlas::output::{load_statistics, print_statistics};

    let origin = origin_of(seed).ok_or(UrlError::MissingHost)?;
    println!("Database: {}\n", config.output.database_path);

    let storage = open_storage(Path::new(&config.output.database_path))?;
    let counts = load_statistics(&storage, &origin)?;
    print_statistics(&origin, &counts);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, seed: Url) -> link_atlas::Result<()> {
    use link_atlas::output::write_link_report;

    tracing::info!(
        "Database: {}, concurrency: {}, timeout: {}s",
        config.output.database_path,
        config.crawler.concurrency,
        config.crawler.request_timeout_secs
    );

    let summary = match crawl(config, seed).await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e);
        }
    };

    let Some(report_path) = &config.output.report_path else {
        return Ok(());
    };

    match &summary.base_origin {
        Some(origin) => {
            let storage = open_storage(Path::new(&config.output.database_path))?;
            write_link_report(&storage, origin, Path::new(report_path))?;
            println!("✓ Report written to: {}", report_path);
        }
        None => {
            tracing::warn!("No page returned 200; skipping report {}", report_path);
        }
    }

    Ok(())
}
