//! The link record: unit of work for the crawler and unit of storage
//!
//! A `Link` is created when an anchor is extracted from a page, persisted
//! (which assigns its `id`), and, when root-relative, later fetched as a crawl
//! target so its status fields can be filled in.

/// A single anchor discovered during the crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Link {
    /// Storage id, assigned on persist
    pub id: Option<i64>,

    /// The raw `href` attribute value (absolute or root-relative)
    pub href: String,

    /// Visible anchor text, fragments joined with `", "`
    pub text: String,

    /// Fully resolved URL of the page this link was found on
    pub source_url: String,

    /// Origin prefixed onto a root-relative `href`; empty for absolute hrefs
    pub base_url: String,

    /// HTTP status code, set once the link has been fetched as a target
    pub status_code: Option<u16>,

    /// Human-readable status (e.g. "404 Not Found")
    pub status_message: Option<String>,
}

impl Link {
    /// Creates the seed link for a crawl
    ///
    /// The seed's `href` is the user-supplied absolute URL, so `base_url`
    /// stays empty.
    pub fn seed(url: &str) -> Self {
        Self {
            href: url.to_string(),
            ..Self::default()
        }
    }

    /// Creates a freshly extracted link that has not been persisted yet
    pub fn discovered(href: &str, text: String, source_url: &str) -> Self {
        Self {
            href: href.to_string(),
            text,
            source_url: source_url.to_string(),
            ..Self::default()
        }
    }

    /// Returns true if `href` starts with `/`
    ///
    /// Only root-relative links are ever enqueued as crawl targets.
    pub fn is_root_relative(&self) -> bool {
        self.href.starts_with('/')
    }

    /// The URL to fetch when this link is a crawl target
    ///
    /// `base_url + href`, or `href` alone when no base is recorded.
    pub fn target_url(&self) -> String {
        format!("{}{}", self.base_url, self.href)
    }

    /// Returns true once status fields have been recorded
    pub fn is_resolved(&self) -> bool {
        self.status_code.is_some()
    }

    /// Records the fetch outcome on this link
    ///
    /// Status fields transition from absent to present once; a second call
    /// leaves the first outcome in place and returns false.
    pub fn record_status(&mut self, status_code: u16, status_message: &str) -> bool {
        if self.is_resolved() {
            return false;
        }
        self.status_code = Some(status_code);
        self.status_message = Some(status_message.to_string());
        true
    }
}
