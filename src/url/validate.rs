//! Seed URL validation

use crate::{UrlError, UrlResult};
use url::Url;

/// Validates the user-supplied seed URL
///
/// The seed must parse, use the `http` or `https` scheme, and name a host.
/// Validation happens before any storage or network work starts.
///
/// # Examples
///
/// ```
/// use link_atlas::url::validate_seed_url;
///
/// assert!(validate_seed_url("https://example.com").is_ok());
/// assert!(validate_seed_url("example.com").is_err());
/// ```
pub fn validate_seed_url(url_str: &str) -> UrlResult<Url> {
    let url = Url::parse(url_str).map_err(|e| match e {
        url::ParseError::RelativeUrlWithoutBase => UrlError::InvalidScheme(String::new()),
        url::ParseError::EmptyHost => UrlError::MissingHost,
        other => UrlError::Parse(other.to_string()),
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlError::MissingHost),
    }
}
