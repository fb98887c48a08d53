// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands:
// - crawl: crawl a site and print the link map
// - match: crawl a site, then ask the model which link fits each label
// =============================================================================

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "link-intent",
    version,
    about = "Crawl a website's internal links and find the page for each intent",
    long_about = "link-intent crawls a website's same-domain links to a bounded depth, \
                  then asks a language model which link best matches labels such as \
                  'Privacy Policy' or 'Contact Us'. Set OPENAI_API_KEY (or put it in .env) \
                  before using the match command."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

// Arguments shared by both subcommands
#[derive(Args, Debug)]
pub struct CrawlArgs {
    /// Website URL to start from (e.g., https://example.com)
    pub website_url: String,

    /// How many link hops to follow (1 = only links on the start page)
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(1..=3))]
    pub max_depth: u8,

    /// Output results in JSON format instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl a website and list the internal links found
    ///
    /// Example: link-intent crawl https://example.com --max-depth 2
    Crawl {
        #[command(flatten)]
        args: CrawlArgs,
    },

    /// Crawl a website and match its links to intent labels
    ///
    /// Example: link-intent match https://example.com --label "Contact Us"
    Match {
        #[command(flatten)]
        args: CrawlArgs,

        /// Intent label to match; repeat for several (default: the five standard labels)
        #[arg(long = "label")]
        labels: Vec<String>,

        /// Chat model to use (overrides LINK_INTENT_MODEL)
        #[arg(long)]
        model: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crawl_defaults() {
        let cli = Cli::try_parse_from(["link-intent", "crawl", "https://example.com"]).unwrap();
        match cli.command {
            Commands::Crawl { args } => {
                assert_eq!(args.website_url, "https://example.com");
                assert_eq!(args.max_depth, 2);
                assert!(!args.json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_match_with_labels() {
        let cli = Cli::try_parse_from([
            "link-intent",
            "match",
            "https://example.com",
            "--max-depth",
            "1",
            "--label",
            "Contact Us",
            "--label",
            "Privacy Policy",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Match { args, labels, model } => {
                assert_eq!(args.max_depth, 1);
                assert!(args.json);
                assert_eq!(labels, vec!["Contact Us", "Privacy Policy"]);
                assert!(model.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_depth_out_of_range_rejected() {
        assert!(Cli::try_parse_from(["link-intent", "crawl", "https://example.com", "--max-depth", "0"]).is_err());
        assert!(Cli::try_parse_from(["link-intent", "crawl", "https://example.com", "--max-depth", "4"]).is_err());
    }
}
