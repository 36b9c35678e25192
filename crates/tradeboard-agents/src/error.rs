use thiserror::Error;
use tradeboard_models::ConfigError;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Claude CLI error: {0}")]
    Cli(String),

    #[error("Rate limited by model provider: {0}")]
    RateLimited(String),

    #[error("Agent timed out after {0} seconds")]
    Timeout(u64),

    #[error("Model returned an empty response")]
    EmptyResponse,

    #[error("Decision contract violation: {0}")]
    ContractViolation(String),

    #[error("Memory lookup failed: {0}")]
    Memory(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

impl AgentError {
    /// Whether re-running the whole pipeline may succeed.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_rate_limits_are_retriable() {
        assert!(AgentError::RateLimited("429".to_string()).is_retriable());
        assert!(!AgentError::Timeout(30).is_retriable());
        assert!(!AgentError::Cli("boom".to_string()).is_retriable());
        assert!(!AgentError::ContractViolation("MAYBE".to_string()).is_retriable());
        assert!(!AgentError::from(ConfigError::Zero("retry.max_attempts")).is_retriable());
    }
}
