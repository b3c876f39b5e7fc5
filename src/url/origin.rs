//! Base origin derivation

use url::Url;

/// Derives the origin (`scheme://host[:port]`) of a URL
///
/// This is the value recorded as a crawl's base origin and prefixed onto
/// root-relative hrefs. The port is kept when it is not the scheme default,
/// so local test servers resolve correctly.
///
/// # Arguments
///
/// * `url` - The URL to take the origin from
///
/// # Returns
///
/// * `Some(String)` - The origin without a trailing slash
/// * `None` - If the URL has no host
///
/// # Examples
///
/// ```
/// use url::Url;
/// use link_atlas::url::origin_of;
///
/// let url = Url::parse("https://example.com/path?q=1").unwrap();
/// assert_eq!(origin_of(&url), Some("https://example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(origin_of(&url), Some("http://127.0.0.1:8080".to_string()));
/// ```
pub fn origin_of(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    match url.port() {
        Some(port) => Some(format!("{}://{}:{}", url.scheme(), host, port)),
        None => Some(format!("{}://{}", url.scheme(), host)),
    }
}
