use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::AgentError;
use crate::llm::{ChatMessage, ChatRole, TextGenerator};

/// Configuration for a Claude CLI invocation.
#[derive(Debug, Clone)]
pub struct ClaudeCliConfig {
    pub model: String,
    pub timeout: Duration,
    /// Executable to run; resolved through `PATH` when not absolute.
    pub program: PathBuf,
}

impl Default for ClaudeCliConfig {
    fn default() -> Self {
        Self {
            model: "claude-3-5-haiku-latest".to_string(),
            timeout: Duration::from_secs(120),
            program: PathBuf::from("claude"),
        }
    }
}

/// Invoke the `claude` CLI with a system prompt and user prompt.
/// Returns the raw stdout text.
pub async fn invoke_claude(
    system_prompt: &str,
    user_prompt: &str,
    config: &ClaudeCliConfig,
) -> Result<String, AgentError> {
    debug!(model = %config.model, prompt_len = user_prompt.len(), "Invoking claude CLI");

    let mut args = vec!["-p", user_prompt];
    if !system_prompt.is_empty() {
        args.extend(["--system-prompt", system_prompt]);
    }
    args.extend(["--model", config.model.as_str(), "--output-format", "text"]);

    let result = tokio::time::timeout(config.timeout, async {
        Command::new(&config.program)
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await
    })
    .await
    .map_err(|_| AgentError::Timeout(config.timeout.as_secs()))?
    .map_err(|e| AgentError::Cli(format!("Failed to spawn claude: {e}")))?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        warn!(status = %result.status, stderr = %stderr, "Claude CLI failed");
        return Err(classify_failure(&result.status.to_string(), &stderr));
    }

    let stdout = String::from_utf8_lossy(&result.stdout).to_string();
    if stdout.trim().is_empty() {
        return Err(AgentError::EmptyResponse);
    }

    Ok(stdout)
}

/// Map a failed invocation to a typed error. Quota and rate-limit failures
/// are kept apart so callers can back off and retry.
pub fn classify_failure(status: &str, stderr: &str) -> AgentError {
    let lowered = stderr.to_ascii_lowercase();
    let rate_limited = ["rate_limit", "rate limit", "429", "quota"]
        .iter()
        .any(|needle| lowered.contains(needle));

    if rate_limited {
        AgentError::RateLimited(stderr.trim().to_string())
    } else {
        AgentError::Cli(format!("claude exited {status}: {stderr}"))
    }
}

/// Check if the `claude` CLI is available on the system.
pub async fn check_cli_available() -> bool {
    match Command::new("claude").arg("--version").output().await {
        Ok(output) => output.status.success(),
        Err(_) => false,
    }
}

/// Flatten chat messages into the CLI's system prompt and user prompt.
///
/// System messages are joined into the system prompt. A lone user message is
/// passed through; longer conversations are rendered as a labelled transcript.
pub fn render_messages(messages: &[ChatMessage]) -> (String, String) {
    let system: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == ChatRole::System)
        .map(|m| m.content.as_str())
        .collect();
    let turns: Vec<&ChatMessage> = messages
        .iter()
        .filter(|m| m.role != ChatRole::System)
        .collect();

    let user = match turns.as_slice() {
        [only] if only.role == ChatRole::User => only.content.clone(),
        _ => turns
            .iter()
            .map(|m| match m.role {
                ChatRole::Assistant => format!("Assistant: {}", m.content),
                _ => format!("User: {}", m.content),
            })
            .collect::<Vec<_>>()
            .join("\n\n"),
    };

    (system.join("\n\n"), user)
}

/// A text generator backed by the Claude CLI.
pub struct ClaudeCliGenerator {
    pub cli_config: ClaudeCliConfig,
}

impl ClaudeCliGenerator {
    pub fn new(model: String, timeout: Duration) -> Self {
        Self {
            cli_config: ClaudeCliConfig {
                model,
                timeout,
                ..ClaudeCliConfig::default()
            },
        }
    }
}

#[async_trait]
impl TextGenerator for ClaudeCliGenerator {
    fn model(&self) -> &str {
        &self.cli_config.model
    }

    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, AgentError> {
        let (system_prompt, user_prompt) = render_messages(messages);
        let raw = invoke_claude(&system_prompt, &user_prompt, &self.cli_config).await?;
        Ok(raw.trim().to_string())
    }
}
