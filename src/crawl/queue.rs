// src/crawl/queue.rs
// =============================================================================
// This module implements the bounded, same-authority website crawl.
//
// How it works:
// 1. Push (seed, max_depth) onto a worklist (a Vec used as a stack)
// 2. Pop a task. Skip it if its depth is 0 or its page was already fetched
// 3. Mark the URL visited, fetch it, extract same-authority links that point
//    at URLs we have not visited yet
// 4. Merge those links into the result map
// 5. Push each linked page with depth - 1, in reverse so the first link on
//    the page is explored first
// 6. Repeat until the worklist is empty or the crawl is cancelled
//
// The stack gives the same visit order and the same "later page wins" merge
// order as a recursive depth-first walk, without growing the call stack.
//
// Every crawl gets its own CrawlSession, so repeated crawls of the same site
// never see each other's visited URLs.
// =============================================================================

use reqwest::Client;
use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use super::fetch::{fetch_page, PageOutcome};
use super::links::{extract_anchors, same_authority, LinkMap};
use crate::error::{CrawlError, FetchFailure};

/// Timeout for a single page fetch
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

// Pages already fetched during one crawl.
//
// Two views of the same pages: `visited` holds the exact URLs that were
// crawled, `fetched` holds them with the fragment removed. "/#contact" and
// "/" are different links but the same document, so only one of them is
// ever requested.
//
// Only grows. Built fresh by every top-level crawl call.
#[derive(Debug, Default)]
pub struct CrawlSession {
    visited: HashSet<String>,
    fetched: HashSet<String>,
    order: Vec<Url>,
}

impl CrawlSession {
    pub fn new() -> Self {
        Self::default()
    }

    // Returns false if the page behind this URL was already fetched
    pub fn mark_visited(&mut self, url: &Url) -> bool {
        if !self.fetched.insert(page_key(url)) {
            return false;
        }
        self.visited.insert(url.as_str().to_string());
        self.order.push(url.clone());
        true
    }

    /// True when this exact URL (fragment included) was crawled.
    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(url.as_str())
    }

    /// True when the document behind `url` was already requested.
    pub fn is_fetched(&self, url: &Url) -> bool {
        self.fetched.contains(&page_key(url))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    // Visited URLs in the order they were fetched
    pub fn into_visited(self) -> Vec<Url> {
        self.order
    }
}

// The URL without its fragment, which is what actually goes over the wire
fn page_key(url: &Url) -> String {
    let mut page = url.clone();
    page.set_fragment(None);
    page.into()
}

// One pending page on the worklist
#[derive(Debug, Clone)]
struct CrawlTask {
    url: Url,
    remaining_depth: usize,
}

// A page that could not be read
#[derive(Debug, Clone, Serialize)]
pub struct FailedPage {
    pub url: Url,
    pub failure: FetchFailure,
}

// A page that answered with a non-2xx status. Its links are still used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPage {
    pub url: Url,
    pub status: u16,
}

// Everything one crawl produced
#[derive(Debug, Default, Serialize)]
pub struct CrawlReport {
    pub links: LinkMap,
    pub visited: Vec<Url>,
    pub failed: Vec<FailedPage>,
    pub error_pages: Vec<ErrorPage>,
    pub cancelled: bool,
}

pub struct Crawler {
    client: Client,
    cancel: Option<CancellationToken>,
}

impl Crawler {
    // Creates a crawler whose page fetches time out after `fetch_timeout`
    pub fn new(fetch_timeout: Duration) -> Result<Self, CrawlError> {
        let client = Client::builder().timeout(fetch_timeout).build()?;
        Ok(Self {
            client,
            cancel: None,
        })
    }

    /// Checks `token` between page fetches and stops early once it is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    // Crawls and returns only the link map
    pub async fn crawl(&self, seed: &str, max_depth: usize) -> Result<LinkMap, CrawlError> {
        Ok(self.crawl_with_report(seed, max_depth).await?.links)
    }

    // Crawls a website starting from `seed`
    //
    // Parameters:
    //   seed: absolute http(s) URL to start from
    //   max_depth: 0 = nothing, 1 = links on the seed page,
    //              2 = plus links on the pages it links to, etc.
    //
    // Returns: the report, or CrawlError::InvalidSeed when the seed cannot
    // be used. Depth 0 returns an empty report without looking at the seed.
    pub async fn crawl_with_report(
        &self,
        seed: &str,
        max_depth: usize,
    ) -> Result<CrawlReport, CrawlError> {
        if max_depth == 0 {
            return Ok(CrawlReport::default());
        }

        let seed = parse_seed(seed)?;
        info!(seed = %seed, max_depth, "starting crawl");

        let mut session = CrawlSession::new();
        let mut report = CrawlReport::default();
        let mut worklist = vec![CrawlTask {
            url: seed.clone(),
            remaining_depth: max_depth,
        }];

        while let Some(task) = worklist.pop() {
            if self.is_cancelled() {
                info!(pending = worklist.len() + 1, "crawl cancelled");
                report.cancelled = true;
                break;
            }

            if task.remaining_depth == 0 || !session.mark_visited(&task.url) {
                continue;
            }

            debug!(url = %task.url, depth = task.remaining_depth, "crawling page");

            let page_links = match self.visit_page(&task.url, &seed, &session).await {
                PageOutcome::Links { links, status } => {
                    if !(200..300).contains(&status) {
                        warn!(url = %task.url, status, "page answered with an error status");
                        report.error_pages.push(ErrorPage {
                            url: task.url.clone(),
                            status,
                        });
                    }
                    links
                }
                PageOutcome::Failed(failure) => {
                    warn!(url = %task.url, %failure, "failed to fetch page");
                    report.failed.push(FailedPage {
                        url: task.url,
                        failure,
                    });
                    continue;
                }
            };

            info!(url = %task.url, links = page_links.len(), "crawled page");
            report.links.merge(&page_links);

            if task.remaining_depth > 1 {
                for url in page_links.urls().rev() {
                    if !session.is_fetched(url) {
                        worklist.push(CrawlTask {
                            url: url.clone(),
                            remaining_depth: task.remaining_depth - 1,
                        });
                    }
                }
            }
        }

        info!(
            pages = session.len(),
            links = report.links.len(),
            failed = report.failed.len(),
            error_pages = report.error_pages.len(),
            "crawl finished"
        );
        report.visited = session.into_visited();
        Ok(report)
    }

    // Fetches one page and keeps the links that stay on the seed's
    // authority and point at pages not yet visited
    async fn visit_page(&self, url: &Url, seed: &Url, session: &CrawlSession) -> PageOutcome {
        let page = match fetch_page(&self.client, url).await {
            Ok(page) => page,
            Err(failure) => return PageOutcome::Failed(failure),
        };

        let mut links = LinkMap::new();
        for anchor in extract_anchors(&page.html, url) {
            if !same_authority(&anchor.url, seed) {
                debug!(href = %anchor.url, "skipping off-site link");
                continue;
            }
            if session.is_visited(&anchor.url) {
                continue;
            }
            links.insert(anchor.text, anchor.url);
        }

        PageOutcome::Links {
            links,
            status: page.status,
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|token| token.is_cancelled())
            .unwrap_or(false)
    }
}

// Validates the seed before anything is fetched
pub fn parse_seed(seed: &str) -> Result<Url, CrawlError> {
    let invalid = |reason: String| CrawlError::InvalidSeed {
        url: seed.to_string(),
        reason,
    };

    let url = Url::parse(seed.trim()).map_err(|e| invalid(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(invalid("URL has no host".to_string()));
    }

    Ok(url)
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why a Vec as a stack instead of recursion?
//    - Each pop is one page; memory is the number of pending links, not the
//      depth of nested async calls
//    - Pushing children in reverse makes pop() return them in page order,
//      so merges happen in the same order a recursive walk would produce
//
// 2. Why check the session twice?
//    - Once when extracting links: a link back to an already-visited URL
//      is not part of the result
//    - Once when popping: an earlier sibling's subtree may have fetched the
//      page while this task waited on the stack
//
// 3. Why compare exact URLs for the map but fragment-less URLs for fetching?
//    - "#contact" on the home page is a real link worth reporting, but
//      fetching it again would only download the home page a second time
//
// 4. Why does a depth-1 task push nothing?
//    - Its children would arrive with depth 0, which is the base case
// -----------------------------------------------------------------------------
