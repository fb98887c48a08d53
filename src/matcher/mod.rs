// src/matcher/mod.rs
// =============================================================================
// This module matches crawled links to intent labels with a language model.
//
// Submodules:
// - prompt: builds the prompt for one label
// - openai: TextGenerator trait and the OpenAI chat-completions client
// - intent: match_intent and the per-label IntentMatch report
// =============================================================================

mod intent;
mod openai;
mod prompt;

pub use intent::{match_intent, match_labels, match_labels_cancellable, IntentMatch};
pub use openai::{OpenAIClient, TextGenerator};

// Labels matched when the user does not pass --label
pub const TARGET_LABELS: [&str; 5] = [
    "Privacy Policy",
    "Terms and Conditions",
    "Refund or Cancellation Policy",
    "Contact Us",
    "Products or Services Page",
];
