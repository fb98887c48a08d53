// src/crawl/links.rs
// =============================================================================
// This module turns an HTML page into (link text, absolute URL) pairs and
// holds them in a LinkMap.
//
// We use the `scraper` crate to find every <a href> element and read its
// visible text, and the `url` crate to resolve relative hrefs against the
// page they appear on.
//
// LinkMap keeps insertion order. Inserting a text that is already present
// replaces the URL but keeps the original position, so merging the results
// of several pages is lossy on purpose: the page visited last wins.
// =============================================================================

use indexmap::IndexMap;
use scraper::{Html, Selector};
use serde::Serialize;
use std::fmt;
use url::Url;

/// Link text longer than this is cut down before it becomes a map key
pub const MAX_LINK_TEXT_CHARS: usize = 100;

// A single <a href> found on a page, already resolved to an absolute URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub text: String,
    pub url: Url,
}

/// Ordered mapping of link text to absolute URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LinkMap {
    entries: IndexMap<String, Url>,
}

impl LinkMap {
    pub fn new() -> Self {
        Self::default()
    }

    // Returns the URL previously stored under this text, if any
    pub fn insert(&mut self, text: impl Into<String>, url: Url) -> Option<Url> {
        self.entries.insert(text.into(), url)
    }

    /// Copies every entry of `other` into `self`; `other` wins on collisions.
    pub fn merge(&mut self, other: &LinkMap) {
        for (text, url) in other.iter() {
            self.entries.insert(text.to_string(), url.clone());
        }
    }

    pub fn get(&self, text: &str) -> Option<&Url> {
        self.entries.get(text)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Url)> {
        self.entries.iter().map(|(text, url)| (text.as_str(), url))
    }

    pub fn urls(&self) -> impl DoubleEndedIterator<Item = &Url> {
        self.entries.values()
    }

    // True when `candidate` is exactly one of the stored URLs
    pub fn contains_url(&self, candidate: &str) -> bool {
        self.entries.values().any(|url| url.as_str() == candidate)
    }

    /// Plain-text listing, one `"text" -> url` pair per line, in map order.
    pub fn to_listing(&self) -> String {
        let mut listing = String::new();
        for (text, url) in self.iter() {
            listing.push_str(&format!("{:?} -> {}\n", text, url));
        }
        listing
    }
}

impl fmt::Display for LinkMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_listing())
    }
}

// Extracts every resolvable <a href> from a page
//
// Parameters:
//   html: the page body
//   page_url: the URL the page was fetched from (base for relative links)
//
// Returns: anchors in document order, text trimmed and truncated
//
// Example:
//   html = "<a href='/docs'> Docs </a>"
//   page_url = "https://example.com/page"
//   result = [Anchor { text: "Docs", url: "https://example.com/docs" }]
pub fn extract_anchors(html: &str, page_url: &Url) -> Vec<Anchor> {
    let document = Html::parse_document(html);

    // Constant selector, known to be valid
    let selector = Selector::parse("a[href]").unwrap();

    let mut anchors = Vec::new();
    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        let Some(url) = resolve_link(page_url, href) else {
            tracing::debug!(page = %page_url, href, "skipping unresolvable link");
            continue;
        };

        let text: String = element.text().collect();
        anchors.push(Anchor {
            text: truncate_text(text.trim()),
            url,
        });
    }

    anchors
}

// Resolves a (possibly relative) href against the page it was found on
//
// In-page anchors ("#contact") resolve to the page URL plus the fragment and
// are kept: on single-page sites they are often the only link to a section.
// Returns None for script links and hrefs that cannot be joined onto the
// base URL.
fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with("javascript:") {
        return None;
    }

    base.join(href).ok()
}

// Keeps at most MAX_LINK_TEXT_CHARS characters (not bytes)
fn truncate_text(text: &str) -> String {
    text.chars().take(MAX_LINK_TEXT_CHARS).collect()
}

/// True when `url` has the same scheme, host and port as `seed`.
pub fn same_authority(url: &Url, seed: &Url) -> bool {
    url.origin() == seed.origin()
}
