use std::future::Future;
use std::time::Duration;

use tracing::{info, warn};
use tradeboard_models::{AgentsConfig, RetryConfig};

use crate::error::AgentError;

/// Caller-level retry around a whole pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Delay before the first retry; doubled for each further retry.
    pub base_delay: Duration,
    /// Upper bound for a single attempt.
    pub attempt_timeout: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default(), &AgentsConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(retry: &RetryConfig, agents: &AgentsConfig) -> Self {
        Self {
            max_attempts: retry.max_attempts.max(1),
            base_delay: Duration::from_secs(retry.base_delay_seconds),
            attempt_timeout: Some(Duration::from_secs(agents.total_timeout_seconds)),
        }
    }

    /// Wait before retry number `retry` (0-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(retry))
    }
}

/// Run `operation` until it succeeds, fails with a non-retriable error, or
/// the attempts are used up. `operation` receives the 1-based attempt number.
pub async fn run_with_retry<T, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, AgentError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, AgentError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        info!(attempt, max_attempts, "Starting pipeline attempt");

        let result = match policy.attempt_timeout {
            Some(limit) => tokio::time::timeout(limit, operation(attempt))
                .await
                .unwrap_or_else(|_| Err(AgentError::Timeout(limit.as_secs()))),
            None => operation(attempt).await,
        };

        match result {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retriable() && attempt < max_attempts => {
                let delay = policy.delay_for(attempt - 1);
                warn!(
                    attempt,
                    error = %e,
                    delay_secs = delay.as_secs(),
                    "Retriable failure, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                warn!(attempt, error = %e, "Pipeline attempt failed");
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_secs(30),
            attempt_timeout: None,
        }
    }

    #[test]
    fn backoff_doubles() {
        let p = policy(5);
        assert_eq!(p.delay_for(0), Duration::from_secs(30));
        assert_eq!(p.delay_for(1), Duration::from_secs(60));
        assert_eq!(p.delay_for(2), Duration::from_secs(120));
    }

    #[test]
    fn from_config_uses_total_timeout() {
        let p = RetryPolicy::default();
        assert_eq!(p.max_attempts, 3);
        assert_eq!(p.base_delay, Duration::from_secs(30));
        assert_eq!(p.attempt_timeout, Some(Duration::from_secs(1800)));
    }

    #[tokio::test(start_paused = true)]
    async fn retries_rate_limits_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let started = tokio::time::Instant::now();

        let result = run_with_retry(&policy(3), |attempt| {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                if attempt < 3 {
                    Err(AgentError::RateLimited("429".to_string()))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 30s after the first failure, 60s after the second.
        assert!(started.elapsed() >= Duration::from_secs(90));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let result: Result<(), _> = run_with_retry(&policy(2), |_| {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(AgentError::RateLimited("429".to_string()))
            }
        })
        .await;

        assert!(matches!(result, Err(AgentError::RateLimited(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn non_retriable_errors_abort_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let result: Result<(), _> = run_with_retry(&policy(5), |_| {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(AgentError::ContractViolation("MAYBE".to_string()))
            }
        })
        .await;

        assert!(matches!(result, Err(AgentError::ContractViolation(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn attempt_timeout_is_enforced() {
        let p = RetryPolicy {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            attempt_timeout: Some(Duration::from_secs(5)),
        };
        let result: Result<(), _> = run_with_retry(&p, |_| async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(AgentError::Timeout(5))));
    }
}
