use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level configuration for tradeboard.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TradeboardConfig {
    #[serde(default)]
    pub agents: AgentsConfig,
    #[serde(default)]
    pub debate: DebateConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Models and time limits for the LLM-backed nodes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AgentsConfig {
    /// Model for debaters, the trader and signal extraction.
    pub quick_think_model: String,
    /// Model for the research and risk judges.
    pub deep_think_model: String,
    /// Timeout for a single model call in seconds.
    pub call_timeout_seconds: u64,
    /// Timeout for one whole pipeline attempt in seconds.
    pub total_timeout_seconds: u64,
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            quick_think_model: "claude-3-5-haiku-latest".to_string(),
            deep_think_model: "claude-sonnet-4-5-20250929".to_string(),
            call_timeout_seconds: 120,
            total_timeout_seconds: 1800,
        }
    }
}

/// Debate lengths and memory retrieval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebateConfig {
    /// Full bull/bear rounds before the research manager rules.
    pub max_debate_rounds: u32,
    /// Full risky/safe/neutral rounds before the risk manager rules.
    pub max_risk_discuss_rounds: u32,
    /// Past lessons requested per node.
    pub memory_matches: usize,
}

impl Default for DebateConfig {
    fn default() -> Self {
        Self {
            max_debate_rounds: 1,
            max_risk_discuss_rounds: 1,
            memory_matches: 2,
        }
    }
}

/// Caller-level retry of a whole pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on every further retry.
    pub base_delay_seconds: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Reports land in `<results_dir>/<TICKER>/<DATE>/`.
    pub results_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_dir: "reports".to_string(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be at least 1")]
    Zero(&'static str),

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

impl TradeboardConfig {
    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agents.quick_think_model.trim().is_empty() {
            return Err(ConfigError::Empty("agents.quick_think_model"));
        }
        if self.agents.deep_think_model.trim().is_empty() {
            return Err(ConfigError::Empty("agents.deep_think_model"));
        }
        if self.agents.call_timeout_seconds == 0 {
            return Err(ConfigError::Zero("agents.call_timeout_seconds"));
        }
        if self.agents.total_timeout_seconds == 0 {
            return Err(ConfigError::Zero("agents.total_timeout_seconds"));
        }
        if self.debate.max_debate_rounds == 0 {
            return Err(ConfigError::Zero("debate.max_debate_rounds"));
        }
        if self.debate.max_risk_discuss_rounds == 0 {
            return Err(ConfigError::Zero("debate.max_risk_discuss_rounds"));
        }
        if self.debate.memory_matches == 0 {
            return Err(ConfigError::Zero("debate.memory_matches"));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Zero("retry.max_attempts"));
        }
        if self.output.results_dir.trim().is_empty() {
            return Err(ConfigError::Empty("output.results_dir"));
        }
        Ok(())
    }
}
