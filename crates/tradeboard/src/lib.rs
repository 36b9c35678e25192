//! Tradeboard - multi-agent trading decision board
//!
//! Turns a set of analyst reports for one ticker and date into a BUY, SELL or
//! HOLD call. Bull and bear researchers debate, a research manager writes the
//! investment plan, a trader proposes a trade, three risk analysts debate it,
//! and a risk manager issues the final decision, all via the Claude CLI.
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use tradeboard::models::{AnalystReports, TradeboardConfig};
//! use tradeboard::agents::Memories;
//!
//! # async fn run(reports: AnalystReports) -> Result<(), Box<dyn std::error::Error>> {
//! let config = TradeboardConfig::default();
//! let pipeline = tradeboard::build_pipeline(&config, Memories::none())?;
//! let date = chrono::NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
//! let record = tradeboard::run(&pipeline, &tradeboard::retry_policy(&config), "SPY", date, reports).await?;
//! println!("{}", record.decision);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod report;

pub use tradeboard_agents as agents;
pub use tradeboard_models as models;

pub use error::ReportError;
pub use report::{load_run, normalize_ticker, render_report, write_run, ReportFormat, WrittenRun};

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use tracing::info;
use tradeboard_agents::{
    run_with_retry, AgentError, ClaudeCliGenerator, Memories, Pipeline, RetryPolicy, TextGenerator,
};
use tradeboard_models::{AnalystReports, RunRecord, TradeboardConfig, RUN_SCHEMA_VERSION};

/// Config file read when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "config/tradeboard.toml";

/// Load configuration from `explicit`, or from [`DEFAULT_CONFIG_PATH`].
///
/// An explicit path must exist. Only a missing default file falls back to
/// built-in defaults.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<TradeboardConfig> {
    let path = match explicit {
        Some(path) => path,
        None => {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            if !default.exists() {
                info!(path = DEFAULT_CONFIG_PATH, "Config file not found, using defaults");
                return Ok(TradeboardConfig::default());
            }
            default
        }
    };
    let config_str = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    toml::from_str(&config_str)
        .with_context(|| format!("Failed to parse config: {}", path.display()))
}

/// Build a Pipeline from configuration.
///
/// Fails with [`AgentError::InvalidConfig`] before any model is contacted.
pub fn build_pipeline(config: &TradeboardConfig, memories: Memories) -> Result<Pipeline, AgentError> {
    config.validate()?;

    let timeout = Duration::from_secs(config.agents.call_timeout_seconds);
    let quick: Arc<dyn TextGenerator> = Arc::new(ClaudeCliGenerator::new(
        config.agents.quick_think_model.clone(),
        timeout,
    ));
    let deep: Arc<dyn TextGenerator> = Arc::new(ClaudeCliGenerator::new(
        config.agents.deep_think_model.clone(),
        timeout,
    ));

    Ok(Pipeline::new(quick, deep, memories, config.debate.clone()))
}

pub fn retry_policy(config: &TradeboardConfig) -> RetryPolicy {
    RetryPolicy::from_config(&config.retry, &config.agents)
}

/// Run the pipeline under `policy` and package the outcome as a [`RunRecord`].
pub async fn run(
    pipeline: &Pipeline,
    policy: &RetryPolicy,
    ticker: &str,
    trade_date: NaiveDate,
    reports: AnalystReports,
) -> Result<RunRecord, AgentError> {
    let start = Instant::now();
    let outcome = run_with_retry(policy, |_| {
        pipeline.propagate(ticker, trade_date, reports.clone())
    })
    .await?;

    Ok(RunRecord {
        run_id: outcome.run_id,
        schema_version: RUN_SCHEMA_VERSION,
        ticker: ticker.to_string(),
        trade_date,
        generated_at: Utc::now(),
        decision: outcome.decision,
        state: outcome.state,
        processing_time_ms: start.elapsed().as_millis() as u64,
    })
}
