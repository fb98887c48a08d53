// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - Depth-first crawling starting from a seed URL
// - Same-authority restriction (scheme, host and port must match the seed)
// - Configurable depth limit
// - Per-crawl visited tracking, so no page is fetched twice in one crawl
// - Failed pages are recorded, never fatal
// - Error-status pages (404, 500) are parsed like any other page
//
// Submodules:
// - links: LinkMap and <a href> extraction
// - fetch: single page fetch with typed failures
// - queue: the crawl loop itself
// =============================================================================

mod fetch;
mod links;
mod queue;

pub use links::LinkMap;
pub use queue::{CrawlReport, Crawler, ErrorPage, FailedPage, DEFAULT_FETCH_TIMEOUT};
