// src/matcher/intent.rs
// =============================================================================
// Asks the text-generation service which discovered link best matches an
// intent label.
//
// match_intent never fails: any error comes back as a string starting with
// "Error:" so the caller can print it next to the label like any answer.
// =============================================================================

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::openai::TextGenerator;
use super::prompt::build_prompt;
use crate::crawl::LinkMap;

/// Low temperature so repeated runs pick the same link
pub const MATCH_TEMPERATURE: f64 = 0.2;

pub const ERROR_PREFIX: &str = "Error:";

// Returns the service's trimmed answer, or "Error: ..." on any failure
pub async fn match_intent<G>(generator: &G, links: &LinkMap, label: &str) -> String
where
    G: TextGenerator + ?Sized,
{
    let prompt = build_prompt(links, label);

    match generator.generate(&prompt, MATCH_TEMPERATURE).await {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            warn!(label, error = %e, "intent matching failed");
            format!("{} {}", ERROR_PREFIX, e)
        }
    }
}

// One label's outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntentMatch {
    pub label: String,
    /// Exactly what match_intent returned
    pub answer: String,
    /// Whether the answer is one of the crawled URLs
    pub in_candidates: bool,
}

impl IntentMatch {
    pub fn is_error(&self) -> bool {
        self.answer.starts_with(ERROR_PREFIX)
    }
}

// Runs match_intent once per label, in order
pub async fn match_labels<G>(generator: &G, links: &LinkMap, labels: &[String]) -> Vec<IntentMatch>
where
    G: TextGenerator + ?Sized,
{
    let mut matches = Vec::with_capacity(labels.len());

    for label in labels {
        let answer = match_intent(generator, links, label).await;
        let in_candidates = links.contains_url(&answer);

        if in_candidates {
            info!(label = %label, answer = %answer, "matched intent");
        } else if !answer.starts_with(ERROR_PREFIX) {
            warn!(label = %label, answer = %answer, "answer is not one of the crawled links");
        }

        matches.push(IntentMatch {
            label: label.clone(),
            answer,
            in_candidates,
        });
    }

    matches
}

// Like match_labels, but gives up as soon as `cancel` fires.
// Returns None when cancelled; answers already received are dropped.
pub async fn match_labels_cancellable<G>(
    generator: &G,
    links: &LinkMap,
    labels: &[String],
    cancel: &CancellationToken,
) -> Option<Vec<IntentMatch>>
where
    G: TextGenerator + ?Sized,
{
    tokio::select! {
        _ = cancel.cancelled() => {
            info!("intent matching cancelled");
            None
        }
        matches = match_labels(generator, links, labels) => Some(matches),
    }
}
