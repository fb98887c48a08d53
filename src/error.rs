// src/error.rs
// =============================================================================
// Typed errors for the crawler, the page fetcher, configuration and the
// intent matcher.
//
// main.rs still works with anyhow::Result; these types convert into
// anyhow::Error automatically through `?`.
// =============================================================================

use serde::Serialize;
use thiserror::Error;

// Errors that stop a crawl before it starts
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The seed URL could not be parsed, or is not an http(s) URL with a host
    #[error("Invalid URL '{url}': {reason}")]
    InvalidSeed { url: String, reason: String },

    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

// Why a single page produced no links.
//
// These never abort a crawl. They are collected in the CrawlReport so a
// caller can tell "page had no links" apart from "page could not be read".
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FetchFailure {
    /// Request timed out
    #[error("request timed out")]
    Timeout,
    /// Response was not HTML
    #[error("not an HTML page ({0})")]
    NotHtml(String),
    /// Could not connect (DNS, refused, TLS handshake)
    #[error("connection failed: {0}")]
    Connect(String),
    /// Body could not be read
    #[error("could not read body: {0}")]
    Body(String),
    /// Anything else reqwest reports
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{var} has an invalid value '{value}'")]
    Invalid { var: &'static str, value: String },
}

// Failures talking to the text-generation service.
// match_intent turns these into "Error: ..." strings.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
