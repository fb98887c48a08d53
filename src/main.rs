// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Load .env and set up logging (stderr, filtered by RUST_LOG)
// 2. Parse command-line arguments using clap
// 3. Crawl the website
// 4. For `match`, ask the model about each intent label
// 5. Print results and exit with a proper code
//    (0 = success, 1 = nothing found / a label failed / interrupted,
//     2 = error)
//
// Ctrl-C: the first press stops the crawl (or the matching) and keeps what
// was found so far. A second press exits immediately with code 130.
// =============================================================================

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use link_intent::cli::{Cli, Commands, CrawlArgs};
use link_intent::config::Config;
use link_intent::crawl::{CrawlReport, Crawler};
use link_intent::matcher::{self, IntentMatch, OpenAIClient, TARGET_LABELS};

#[tokio::main]
async fn main() {
    // Loaded before logging so .env can set RUST_LOG; reported once it is up
    let dotenv_result = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "link_intent=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Some(e) = dotenv_problem(dotenv_result) {
        warn!(error = %e, "failed to load .env file");
    }

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    match cli.command {
        Commands::Crawl { args } => handle_crawl(&args, &config, &cancel).await,
        Commands::Match {
            args,
            labels,
            model,
        } => handle_match(&args, labels, model, &config, &cancel).await,
    }
}

// A missing .env file is fine, an unreadable or malformed one is reported
fn dotenv_problem<T>(result: Result<T, dotenvy::Error>) -> Option<dotenvy::Error> {
    result.err().filter(|e| !e.not_found())
}

// Installs the only SIGINT listener for the whole run.
// First Ctrl-C cancels `cancel`, the second one exits the process.
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        warn!("interrupted, finishing up (press Ctrl-C again to quit now)");
        cancel.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(130);
        }
    });
}

// Handles the 'crawl' subcommand
async fn handle_crawl(
    args: &CrawlArgs,
    config: &Config,
    cancel: &CancellationToken,
) -> Result<i32> {
    let report = run_crawl(args, config, cancel).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_link_table(&report);
    }

    Ok(if report.links.is_empty() { 1 } else { 0 })
}

// Handles the 'match' subcommand
async fn handle_match(
    args: &CrawlArgs,
    labels: Vec<String>,
    model: Option<String>,
    config: &Config,
    cancel: &CancellationToken,
) -> Result<i32> {
    // Fail on a missing key before spending time on the crawl
    let mut config = config.clone();
    if let Some(model) = model {
        config.model = model;
    }
    let client = OpenAIClient::from_config(&config)?;

    let labels = if labels.is_empty() {
        TARGET_LABELS.iter().map(|label| label.to_string()).collect()
    } else {
        labels
    };

    let report = run_crawl(args, &config, cancel).await?;

    if report.cancelled {
        // Matching a partial map would pick from the wrong candidates
        if args.json {
            let output = serde_json::json!({
                "links": report.links,
                "matches": null,
                "cancelled": true,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("⏹️  Crawl interrupted, skipping intent matching");
        }
        return Ok(1);
    }

    if !args.json {
        println!(
            "✅ Crawled {} link(s). Asking {} about {} label(s)...\n",
            report.links.len(),
            client.model(),
            labels.len()
        );
    }
    info!(model = client.model(), labels = labels.len(), "matching intents");

    let Some(matches) =
        matcher::match_labels_cancellable(&client, &report.links, &labels, cancel).await
    else {
        if !args.json {
            println!("⏹️  Intent matching interrupted");
        }
        return Ok(1);
    };

    if args.json {
        let output = serde_json::json!({
            "links": report.links,
            "matches": matches,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_matches(&matches);
    }

    let failed = matches.iter().filter(|m| m.is_error()).count();
    Ok(if failed > 0 { 1 } else { 0 })
}

async fn run_crawl(
    args: &CrawlArgs,
    config: &Config,
    cancel: &CancellationToken,
) -> Result<CrawlReport> {
    if !args.json {
        println!("🔍 Crawling: {}", args.website_url);
        println!("📊 Max crawl depth: {}", args.max_depth);
    }

    // Cancellation stops the crawl at the next page boundary
    let crawler = Crawler::new(config.fetch_timeout)?.with_cancellation(cancel.clone());
    let report = crawler
        .crawl_with_report(&args.website_url, args.max_depth as usize)
        .await?;

    if !args.json {
        println!(
            "📄 Visited {} page(s), {} failed",
            report.visited.len(),
            report.failed.len()
        );
        if report.cancelled {
            println!("   ⚠️  Crawl interrupted, results are partial");
        }
        for page in &report.failed {
            println!("   ⚠️  {}: {}", page.url, page.failure);
        }
        for page in &report.error_pages {
            println!("   ⚠️  {}: HTTP {} (links still used)", page.url, page.status);
        }
        println!();
    }

    Ok(report)
}

// Prints the link map as a two-column table
fn print_link_table(report: &CrawlReport) {
    println!("{:<40} {}", "TEXT", "URL");
    println!("{}", "=".repeat(100));

    for (text, url) in report.links.iter() {
        println!("{:<40} {}", shorten(text, 37), url);
    }

    println!();
    println!("📋 Total: {} link(s)", report.links.len());
}

fn print_matches(matches: &[IntentMatch]) {
    for m in matches {
        let marker = if m.is_error() {
            "❌"
        } else if m.in_candidates {
            "✅"
        } else {
            "❔"
        };
        println!("{} {}:", marker, m.label);
        println!("   {}", m.answer);
    }
}

// Cuts display text on a character boundary
fn shorten(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}
