//! Reduce a free-text decision narrative to a single [`DecisionLabel`].
//!
//! Resolution order:
//! 1. The last well-formed `FINAL TRANSACTION PROPOSAL: **LABEL**` marker.
//! 2. If a generator is configured, a constrained classification call whose
//!    reply must be exactly one label.
//! 3. Otherwise, keyword scoring with symmetric buy/sell vocabularies. A tie
//!    is an error, never a default.

use std::sync::Arc;

use tracing::{debug, warn};
use tradeboard_models::DecisionLabel;

use crate::error::AgentError;
use crate::llm::{ChatMessage, TextGenerator};
use crate::prompts::SIGNAL_EXTRACTION_INSTRUCTIONS;

pub const FINAL_PROPOSAL_MARKER: &str = "FINAL TRANSACTION PROPOSAL:";

const BUY_WORDS: &[&str] = &[
    "buy", "buying", "bullish", "accumulate", "overweight", "upside", "outperform",
];
const SELL_WORDS: &[&str] = &[
    "sell", "selling", "bearish", "reduce", "underweight", "downside", "underperform",
];
const HOLD_WORDS: &[&str] = &["hold", "holding", "wait", "neutral", "sidelines"];

/// Extracts the final BUY/SELL/HOLD call from decision text.
#[derive(Clone, Default)]
pub struct SignalProcessor {
    llm: Option<Arc<dyn TextGenerator>>,
}

impl SignalProcessor {
    /// Marker scan with keyword scoring as the only fallback.
    pub fn deterministic() -> Self {
        Self { llm: None }
    }

    /// Marker scan with a classification call as the fallback.
    pub fn with_llm(llm: Arc<dyn TextGenerator>) -> Self {
        Self { llm: Some(llm) }
    }

    pub async fn process_signal(&self, full_signal: &str) -> Result<DecisionLabel, AgentError> {
        if let Some(label) = find_marker(full_signal) {
            debug!(%label, "Decision taken from proposal marker");
            return Ok(label);
        }

        match &self.llm {
            Some(llm) => {
                let messages = [
                    ChatMessage::system(SIGNAL_EXTRACTION_INSTRUCTIONS),
                    ChatMessage::user(full_signal),
                ];
                let raw = llm.generate(&messages).await?;
                let label = parse_extracted_label(&raw)?;
                debug!(%label, model = llm.model(), "Decision extracted by model");
                Ok(label)
            }
            None => {
                let label = score_keywords(full_signal)?;
                debug!(%label, "Decision taken from keyword scoring");
                Ok(label)
            }
        }
    }
}

/// The label of the last well-formed proposal marker, if any.
///
/// Case is ignored, asterisks and whitespace around the label are skipped, and
/// template text such as `BUY/HOLD/SELL` does not count.
pub fn find_marker(text: &str) -> Option<DecisionLabel> {
    // ASCII uppercasing keeps byte offsets aligned with `text`.
    let upper = text.to_ascii_uppercase();
    let positions: Vec<usize> = upper
        .match_indices(FINAL_PROPOSAL_MARKER)
        .map(|(i, _)| i + FINAL_PROPOSAL_MARKER.len())
        .collect();

    positions
        .into_iter()
        .rev()
        .find_map(|start| label_at(&upper[start..]))
}

fn label_at(rest: &str) -> Option<DecisionLabel> {
    let rest = rest.trim_start_matches(|c: char| c == '*' || c.is_whitespace());
    let word_len = rest
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(rest.len());
    let (word, after) = rest.split_at(word_len);
    if after.starts_with('/') {
        return None;
    }
    word.parse().ok()
}

/// Validate the classification call's reply without coercing it.
pub fn parse_extracted_label(raw: &str) -> Result<DecisionLabel, AgentError> {
    let cleaned = raw.trim().trim_matches(|c: char| {
        c == '*' || c == '.' || c == '"' || c == '`' || c.is_whitespace()
    });
    cleaned.parse().map_err(|_| {
        warn!(reply = %raw, "Signal extractor returned a non-label");
        AgentError::ContractViolation(format!("signal extractor returned {raw:?}"))
    })
}

/// Count decision vocabulary and return the strictly dominant label.
pub fn score_keywords(text: &str) -> Result<DecisionLabel, AgentError> {
    let mut scores = [0usize; 3];
    for word in text
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| !w.is_empty())
    {
        let word = word.to_lowercase();
        if BUY_WORDS.contains(&word.as_str()) {
            scores[0] += 1;
        } else if SELL_WORDS.contains(&word.as_str()) {
            scores[1] += 1;
        } else if HOLD_WORDS.contains(&word.as_str()) {
            scores[2] += 1;
        }
    }

    let best = scores.iter().copied().max().unwrap_or(0);
    let leaders: Vec<DecisionLabel> = DecisionLabel::ALL
        .iter()
        .zip(scores)
        .filter(|(_, score)| best > 0 && *score == best)
        .map(|(label, _)| *label)
        .collect();

    match leaders.as_slice() {
        [label] => Ok(*label),
        [] => Err(AgentError::ContractViolation(
            "no decision language found".to_string(),
        )),
        _ => Err(AgentError::ContractViolation(format!(
            "ambiguous decision: buy={} sell={} hold={}",
            scores[0], scores[1], scores[2]
        ))),
    }
}
