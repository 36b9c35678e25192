//! Runs the scripted pipeline through the facade and checks what lands on disk.

use std::sync::Arc;
use std::time::Duration;

use tradeboard::agents::test_support::{sample_date, sample_reports, ScriptedGenerator};
use tradeboard::agents::{AgentError, Memories, Pipeline, RetryPolicy};
use tradeboard::models::{ConfigError, DecisionLabel, TradeboardConfig};
use tradeboard::{load_run, render_report, write_run, ReportFormat};

fn scripted_pipeline() -> Pipeline {
    let llm = Arc::new(
        ScriptedGenerator::new("Neutral on balance.")
            .reply_when(
                "As the Risk Management Judge",
                "Volatility into CPI argues for patience; stay put (±2%).\n\n\
                 FINAL TRANSACTION PROPOSAL: **HOLD**",
            )
            .reply_when("You are a Bull Analyst", "Breadth is improving.\nNew highs expand.")
            .reply_when("You are a trading agent", "Hold current exposure. FINAL TRANSACTION PROPOSAL: **HOLD**"),
    );
    Pipeline::new(
        llm.clone(),
        llm,
        Memories::none(),
        TradeboardConfig::default().debate,
    )
}

fn no_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 1,
        base_delay: Duration::ZERO,
        attempt_timeout: None,
    }
}

#[tokio::test]
async fn run_writes_report_and_state() {
    let dir = tempfile::tempdir().unwrap();
    let record = tradeboard::run(&scripted_pipeline(), &no_retry(), "SPY", sample_date(), sample_reports())
        .await
        .unwrap();
    assert_eq!(record.decision, DecisionLabel::Hold);
    assert_eq!(record.ticker, "SPY");

    let written = write_run(dir.path(), &record, ReportFormat::Markdown).unwrap();
    let run_dir = dir.path().join("SPY").join("2025-01-15");
    assert_eq!(written.report_path, run_dir.join("SPY_2025-01-15_full_report.md"));
    assert_eq!(written.state_path, run_dir.join("SPY_2025-01-15_state.json"));

    let report = std::fs::read_to_string(&written.report_path).unwrap();
    assert_eq!(report, render_report(&record));

    let loaded = load_run(&written.state_path).unwrap();
    assert_eq!(loaded, record);
    // Multi-line and non-ASCII text survive unchanged.
    assert_eq!(
        loaded.state.final_trade_decision,
        "Volatility into CPI argues for patience; stay put (±2%).\n\n\
         FINAL TRANSACTION PROPOSAL: **HOLD**"
    );
    assert_eq!(
        loaded.state.investment_debate_state.bull_history,
        "Bull Analyst: Breadth is improving.\nNew highs expand."
    );
}

#[tokio::test]
async fn txt_format_changes_only_the_extension() {
    let dir = tempfile::tempdir().unwrap();
    let record = tradeboard::run(&scripted_pipeline(), &no_retry(), "SPY", sample_date(), sample_reports())
        .await
        .unwrap();

    let written = write_run(dir.path(), &record, ReportFormat::Txt).unwrap();
    assert!(written
        .report_path
        .to_string_lossy()
        .ends_with("SPY_2025-01-15_full_report.txt"));
    assert_eq!(
        std::fs::read_to_string(&written.report_path).unwrap(),
        render_report(&record)
    );
}

#[tokio::test]
async fn report_sections_follow_pipeline_order() {
    let record = tradeboard::run(&scripted_pipeline(), &no_retry(), "SPY", sample_date(), sample_reports())
        .await
        .unwrap();
    let report = render_report(&record);

    let headings = [
        "# FINAL TRADING DECISION",
        "# I. ANALYST TEAM REPORTS",
        "## Market Analysis",
        "## Social Sentiment Analysis",
        "## News Analysis",
        "## Fundamentals Analysis",
        "# II. RESEARCH TEAM DECISION",
        "## Bull Researcher Analysis",
        "## Bear Researcher Analysis",
        "## Research Manager Decision",
        "# III. TRADING TEAM PLAN",
        "# IV. RISK MANAGEMENT TEAM",
        "## Aggressive Analyst",
        "## Conservative Analyst",
        "## Neutral Analyst",
        "## Portfolio Manager Decision",
        "# V. FINAL TRADE DECISION",
    ];
    let positions: Vec<usize> = headings
        .iter()
        .map(|h| report.find(h).unwrap_or_else(|| panic!("missing {h}")))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(report.contains("**Decision: HOLD**"));
    assert!(!report.contains("## Alpha Factors Analysis"));
}

#[test]
fn load_run_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_run(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, tradeboard::ReportError::Io { .. }));
}

#[test]
fn invalid_config_is_rejected_before_any_call() {
    let mut config = TradeboardConfig::default();
    config.debate.max_debate_rounds = 0;

    let err = tradeboard::build_pipeline(&config, Memories::none()).err().unwrap();
    assert!(matches!(
        err,
        AgentError::InvalidConfig(ConfigError::Zero("debate.max_debate_rounds"))
    ));
}

#[test]
fn retry_policy_follows_config() {
    let config: TradeboardConfig = toml::from_str(
        r#"
        [retry]
        max_attempts = 5
        base_delay_seconds = 10

        [agents]
        total_timeout_seconds = 600
        "#,
    )
    .unwrap();
    let policy = tradeboard::retry_policy(&config);
    assert_eq!(policy.max_attempts, 5);
    assert_eq!(policy.base_delay, Duration::from_secs(10));
    assert_eq!(policy.attempt_timeout, Some(Duration::from_secs(600)));
}

#[test]
fn demo_inputs_parse() {
    let reports: tradeboard::models::AnalystReports =
        serde_json::from_str(include_str!("../../../demos/analyst_reports.json")).unwrap();
    assert!(reports.market_report.starts_with("SPY closed"));
    assert!(reports.alpha_factors_report.is_some());

    let memories: Vec<tradeboard::models::MemoryRecord> =
        serde_json::from_str(include_str!("../../../demos/memories.json")).unwrap();
    assert_eq!(memories.len(), 2);
}

#[test]
fn explicit_missing_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let typo = dir.path().join("tradebord.toml");

    let err = tradeboard::load_config(Some(&typo)).unwrap_err();
    assert!(err.to_string().contains("tradebord.toml"), "{err:#}");
}

#[test]
fn explicit_config_is_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tradeboard.toml");
    std::fs::write(&path, "[debate]\nmax_debate_rounds = 3\n").unwrap();

    let config = tradeboard::load_config(Some(&path)).unwrap();
    assert_eq!(config.debate.max_debate_rounds, 3);
    assert_eq!(config.debate.max_risk_discuss_rounds, TradeboardConfig::default().debate.max_risk_discuss_rounds);
}

#[tokio::test]
async fn lowercase_ticker_is_written_under_its_symbol() {
    let dir = tempfile::tempdir().unwrap();
    let ticker = tradeboard::normalize_ticker("spy").unwrap();
    let record = tradeboard::run(&scripted_pipeline(), &no_retry(), &ticker, sample_date(), sample_reports())
        .await
        .unwrap();

    let written = write_run(dir.path(), &record, ReportFormat::Markdown).unwrap();
    assert_eq!(
        written.state_path,
        dir.path().join("SPY").join("2025-01-15").join("SPY_2025-01-15_state.json")
    );
}

#[test]
fn ticker_with_path_separators_is_rejected() {
    for bad in ["../x", "x/../../etc", "..\\x"] {
        assert!(matches!(
            tradeboard::normalize_ticker(bad),
            Err(tradeboard::ReportError::InvalidTicker(_))
        ));
    }
}
