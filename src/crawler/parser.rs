//! HTML parsing and anchor extraction
//!
//! This module turns a fetched body into a document tree and walks that tree
//! for `<a href>` elements, producing one `Link` per href not yet claimed in
//! the crawl session.
//!
//! # Traversal rules
//!
//! The walk is pre-order (node, then its first child subtree, then its next
//! sibling) and iterative, using an explicit stack of pending nodes so deeply
//! nested documents cannot overflow the call stack.
//!
//! - A new anchor is emitted with its collected text; the walk then resumes at
//!   the anchor's next sibling without descending into it again.
//! - An anchor whose href was already claimed is treated like any other
//!   element.
//! - An anchor whose href starts with `#` is skipped *together with every
//!   later sibling in the same branch*. The walk only picks up again at the
//!   next sibling of an ancestor. Downstream link graphs depend on this exact
//!   output, so it is kept as-is.

use crate::crawler::session::CrawlSession;
use crate::link::Link;
use scraper::{Html, Node};
use thiserror::Error;

/// Reasons a fetched body yields no document
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Expected an HTML document, got content type '{0}'")]
    NotHtml(String),
}

/// Parses an HTML body into a document tree
pub fn parse_document(body: &str) -> Html {
    Html::parse_document(body)
}

/// Returns true if a `Content-Type` value can be parsed as HTML
///
/// A missing header is given the benefit of the doubt.
pub fn is_html_content_type(content_type: Option<&str>) -> bool {
    match content_type {
        None => true,
        Some(value) => {
            let mime = value
                .split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase();
            mime.is_empty() || mime == "text/html" || mime == "application/xhtml+xml"
        }
    }
}

/// Parses a fetched body and extracts its links
///
/// The document tree is built and dropped inside this call, so callers can
/// hold the result across await points.
///
/// # Arguments
///
/// * `body` - The response body
/// * `content_type` - The response `Content-Type`, if any
/// * `source_url` - Resolved URL of the page
/// * `session` - The crawl session holding the href dedup set
pub fn extract_from_body(
    body: &str,
    content_type: Option<&str>,
    source_url: &str,
    session: &CrawlSession,
) -> Result<Vec<Link>, ParseError> {
    if !is_html_content_type(content_type) {
        return Err(ParseError::NotHtml(
            content_type.unwrap_or_default().to_string(),
        ));
    }

    let document = parse_document(body);
    Ok(extract_links(&document, source_url, session))
}

/// Extracts anchor links from a parsed document in document order
///
/// # Arguments
///
/// * `document` - The parsed document tree
/// * `source_url` - Resolved URL of the page, recorded on every link
/// * `session` - The crawl session; each href is extracted at most once per session
///
/// # Example
///
/// ```
/// use link_atlas::crawler::{extract_links, parse_document, CrawlSession};
///
/// let html = r#"<a href="/about-us">Hello! <span>Welcome to about us page!</span></a>"#;
/// let session = CrawlSession::new();
/// let links = extract_links(&parse_document(html), "https://example.com", &session);
///
/// assert_eq!(links.len(), 1);
/// assert_eq!(links[0].text, "Hello!, Welcome to about us page!");
/// ```
pub fn extract_links(document: &Html, source_url: &str, session: &CrawlSession) -> Vec<Link> {
    let mut links = Vec::new();
    let mut pending = vec![document.tree.root()];

    while let Some(node) = pending.pop() {
        if let Node::Element(element) = node.value() {
            if element.name() == "a" {
                if let Some(href) = element.attr("href") {
                    // Fragment anchor: abandon this node and its later siblings
                    if href.starts_with('#') {
                        continue;
                    }

                    if session.claim_href(href) {
                        let mut fragments = Vec::new();
                        for descendant in node.descendants() {
                            if let Node::Text(text) = descendant.value() {
                                let cleaned = collapse_whitespace(text);
                                if !cleaned.is_empty() {
                                    fragments.push(cleaned);
                                }
                            }
                        }

                        links.push(Link::discovered(href, fragments.join(", "), source_url));

                        if let Some(next) = node.next_sibling() {
                            pending.push(next);
                        }
                        continue;
                    }
                }
            }
        }

        // Sibling goes on the stack first so the child subtree is walked before it
        if let Some(next) = node.next_sibling() {
            pending.push(next);
        }
        if let Some(child) = node.first_child() {
            pending.push(child);
        }
    }

    links
}

/// Trims a text segment and collapses internal ASCII whitespace runs to one space
///
/// Non-breaking spaces inside the text are kept as-is.
fn collapse_whitespace(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    let mut in_run = false;

    for c in text.trim().chars() {
        if matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0C') {
            if !in_run {
                cleaned.push(' ');
                in_run = true;
            }
        } else {
            cleaned.push(c);
            in_run = false;
        }
    }

    cleaned
}
