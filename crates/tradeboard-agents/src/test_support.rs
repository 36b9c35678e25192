//! Scripted collaborators for exercising the pipeline without a model.
//!
//! `ScriptedGenerator` answers each call from a list of substring rules and
//! records every message it was sent. `StubMemory` returns fixed records and
//! records every lookup. `RateLimitedGenerator` fails a fixed number of
//! times before delegating.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;
use tradeboard_models::{AnalystReports, MemoryRecord, PipelineState};

use crate::error::AgentError;
use crate::llm::{ChatMessage, TextGenerator};
use crate::memory::MemoryLookup;

type ErrorFactory = Box<dyn Fn() -> AgentError + Send + Sync>;

/// A generator that replies from substring rules.
///
/// The first rule whose needle occurs in any message wins; otherwise the
/// default reply is returned.
pub struct ScriptedGenerator {
    rules: Vec<(String, String)>,
    default_reply: String,
    failure: Option<ErrorFactory>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedGenerator {
    pub fn new(default_reply: &str) -> Self {
        Self {
            rules: Vec::new(),
            default_reply: default_reply.to_string(),
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always fail with the error produced by `make_error`.
    pub fn failing(make_error: impl Fn() -> AgentError + Send + Sync + 'static) -> Self {
        let mut generator = Self::new("");
        generator.failure = Some(Box::new(make_error));
        generator
    }

    pub fn reply_when(mut self, needle: &str, reply: &str) -> Self {
        self.rules.push((needle.to_string(), reply.to_string()));
        self
    }

    pub async fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    /// Every call flattened to one string, in call order.
    pub async fn prompts(&self) -> Vec<String> {
        self.calls
            .lock()
            .await
            .iter()
            .map(|messages| {
                messages
                    .iter()
                    .map(|m| m.content.as_str())
                    .collect::<Vec<_>>()
                    .join("\n\n")
            })
            .collect()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn model(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, AgentError> {
        self.calls.lock().await.push(messages.to_vec());

        if let Some(make_error) = &self.failure {
            return Err(make_error());
        }

        let reply = self
            .rules
            .iter()
            .find(|(needle, _)| messages.iter().any(|m| m.content.contains(needle.as_str())))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| self.default_reply.clone());
        Ok(reply)
    }
}

/// Fails with `RateLimited` for the first `failures` calls, then delegates.
pub struct RateLimitedGenerator {
    remaining_failures: AtomicU32,
    inner: Arc<dyn TextGenerator>,
}

impl RateLimitedGenerator {
    pub fn new(failures: u32, inner: Arc<dyn TextGenerator>) -> Self {
        Self {
            remaining_failures: AtomicU32::new(failures),
            inner,
        }
    }
}

#[async_trait]
impl TextGenerator for RateLimitedGenerator {
    fn model(&self) -> &str {
        self.inner.model()
    }

    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, AgentError> {
        let failed = self
            .remaining_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(AgentError::RateLimited(
                "429 rate_limit_error: scripted".to_string(),
            ));
        }
        self.inner.generate(messages).await
    }
}

/// Memory returning fixed records and recording requested match counts.
pub struct StubMemory {
    records: Vec<MemoryRecord>,
    requests: Mutex<Vec<usize>>,
}

impl StubMemory {
    pub fn new(records: Vec<MemoryRecord>) -> Self {
        Self {
            records,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub async fn requests(&self) -> Vec<usize> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl MemoryLookup for StubMemory {
    async fn get_memories(
        &self,
        _situation: &str,
        n_matches: usize,
    ) -> Result<Vec<MemoryRecord>, AgentError> {
        self.requests.lock().await.push(n_matches);
        Ok(self.records.iter().take(n_matches).cloned().collect())
    }
}

/// Fixed analyst reports for SPY.
pub fn sample_reports() -> AnalystReports {
    AnalystReports {
        market_report: "SPY closed above its 50-day moving average; RSI 58.".to_string(),
        sentiment_report: "Social sentiment mildly positive ahead of CPI.".to_string(),
        news_report: "Fed minutes signalled patience on rate cuts.".to_string(),
        fundamentals_report: "Index forward P/E 21.5x, earnings growth 9% YoY.".to_string(),
        alpha_factors_report: None,
    }
}

pub fn sample_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 15).unwrap_or_default()
}

/// A pipeline state for SPY on 2025-01-15 with the sample reports applied.
pub fn sample_state() -> PipelineState {
    let mut state = PipelineState::new("SPY", sample_date());
    state.apply_reports(sample_reports());
    state
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_generator_matches_rules_in_order() {
        let llm = ScriptedGenerator::new("default")
            .reply_when("alpha", "first")
            .reply_when("beta", "second");

        assert_eq!(llm.complete("beta only").await.unwrap(), "second");
        assert_eq!(llm.complete("alpha and beta").await.unwrap(), "first");
        assert_eq!(llm.complete("gamma").await.unwrap(), "default");
        assert_eq!(llm.call_count().await, 3);
        assert_eq!(llm.prompts().await[2], "gamma");
    }

    #[tokio::test]
    async fn rate_limited_generator_recovers() {
        let llm = RateLimitedGenerator::new(2, Arc::new(ScriptedGenerator::new("ok")));
        assert!(llm.complete("a").await.unwrap_err().is_retriable());
        assert!(llm.complete("b").await.unwrap_err().is_retriable());
        assert_eq!(llm.complete("c").await.unwrap(), "ok");
    }
}
