// src/lib.rs
// =============================================================================
// link-intent as a library.
//
// The binary in main.rs is a thin shell over these modules: crawl a site
// into a LinkMap, then ask a language model which link matches each intent.
//
// Modules:
// - cli: clap argument definitions
// - config: environment configuration
// - crawl: bounded same-authority crawler
// - error: typed errors
// - matcher: prompt, chat-completions client, intent matching
// =============================================================================

pub mod cli;
pub mod config;
pub mod crawl;
pub mod error;
pub mod matcher;
