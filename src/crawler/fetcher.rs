//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the shared HTTP client (user agent, timeouts, redirect policy)
//! - GET requests for crawl targets
//! - Classifying the outcome (body, non-2xx status, transport failure)
//! - Establishing the crawl's base origin from the first 200 response

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::crawler::session::CrawlSession;
use crate::url::origin_of;
use reqwest::header::CONTENT_TYPE;
use reqwest::{redirect::Policy, Client, StatusCode};
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// 2xx response with a readable body
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Human-readable status, e.g. "200 OK"
        status_message: String,
        /// Content-Type header value, if present
        content_type: Option<String>,
        /// Page body content
        body: String,
    },

    /// Non-2xx response; recorded as the link's status, not an error
    HttpError {
        /// HTTP status code
        status_code: u16,
        /// Human-readable status, e.g. "404 Not Found"
        status_message: String,
    },

    /// Headers arrived but the body could not be read
    BodyError {
        /// HTTP status code
        status_code: u16,
        /// Human-readable status
        status_message: String,
        /// Error description
        error: String,
    },

    /// Transport failure (DNS, connection refused, timeout); no status available
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// The status code and message to record on the link, if any
    pub fn status(&self) -> Option<(u16, &str)> {
        match self {
            Self::Success {
                status_code,
                status_message,
                ..
            }
            | Self::HttpError {
                status_code,
                status_message,
            }
            | Self::BodyError {
                status_code,
                status_message,
                ..
            } => Some((*status_code, status_message.as_str())),
            Self::NetworkError { .. } => None,
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are followed transparently (up to `max_redirects` hops) so the
/// response URL is the post-redirect URL.
///
/// # Arguments
///
/// * `crawler` - Timeout and redirect settings
/// * `user_agent` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use link_atlas::config::Config;
/// use link_atlas::crawler::build_http_client;
///
/// let config = Config::default();
/// let client = build_http_client(&config.crawler, &config.user_agent).unwrap();
/// ```
pub fn build_http_client(
    crawler: &CrawlerConfig,
    user_agent: &UserAgentConfig,
) -> Result<Client, reqwest::Error> {
    let timeout = Duration::from_secs(crawler.request_timeout_secs);

    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(redirect_policy(crawler.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Zero hops means a 3xx is returned as-is and recorded like any other status
fn redirect_policy(max_redirects: u32) -> Policy {
    match max_redirects {
        0 => Policy::none(),
        hops => Policy::limited(hops as usize),
    }
}

/// Formats a status as code plus canonical reason ("404 Not Found")
pub fn status_message(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

/// Fetches a URL and classifies the outcome
///
/// # Outcomes
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx, body read | `Success` |
/// | non-2xx | `HttpError` (status kept, no body) |
/// | body read fails | `BodyError` (status kept) |
/// | DNS / connect / timeout | `NetworkError` |
///
/// On a 200 response, if the session has no base origin yet, the origin of
/// the post-redirect URL becomes the crawl's base origin.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
/// * `session` - The crawl session holding the base origin
pub async fn fetch_url(client: &Client, url: &str, session: &CrawlSession) -> FetchResult {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            let error = if e.is_timeout() {
                format!("Request timeout: {}", e)
            } else if e.is_connect() {
                format!("Connection failed: {}", e)
            } else {
                e.to_string()
            };
            return FetchResult::NetworkError { error };
        }
    };

    let status = response.status();
    let status_code = status.as_u16();
    let message = status_message(status);

    if !status.is_success() {
        return FetchResult::HttpError {
            status_code,
            status_message: message,
        };
    }

    let final_url = response.url().clone();
    if status == StatusCode::OK && session.base_origin().is_none() {
        if let Some(origin) = origin_of(&final_url) {
            if session.establish_base_origin(origin.clone()) {
                tracing::info!("Base origin established: {}", origin);
            }
        }
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    match response.text().await {
        Ok(body) => FetchResult::Success {
            final_url: final_url.to_string(),
            status_code,
            status_message: message,
            content_type,
            body,
        },
        Err(e) => FetchResult::BodyError {
            status_code,
            status_message: message,
            error: e.to_string(),
        },
    }
}
