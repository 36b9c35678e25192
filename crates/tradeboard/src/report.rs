//! Consolidated run reports and run-record persistence.
//!
//! A run is stored under `<results_dir>/<TICKER>/<YYYY-MM-DD>/` as two files:
//! the human-readable report and the pretty-printed [`RunRecord`] JSON.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::info;
use tradeboard_models::RunRecord;

use crate::error::ReportError;

const RULE_WIDTH: usize = 80;
const SECTION_BREAK: &str = "---";

/// File flavour of the consolidated report. The content is identical; only
/// the extension differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Markdown,
    Txt,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Txt => "txt",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Markdown => "markdown",
            Self::Txt => "txt",
        })
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "txt" | "text" => Ok(Self::Txt),
            other => Err(format!("unknown report format {other:?} (expected markdown or txt)")),
        }
    }
}

/// Accumulates report lines; sections with blank bodies are skipped.
struct ReportBuilder {
    lines: Vec<String>,
}

impl ReportBuilder {
    fn new() -> Self {
        Self { lines: Vec::new() }
    }

    fn line(&mut self, text: impl Into<String>) {
        self.lines.push(text.into());
    }

    fn heading(&mut self, text: &str) {
        self.line(text);
        self.line("");
    }

    /// `## title`, the body, and a section break. Nothing when `body` is blank.
    fn subsection(&mut self, title: &str, body: &str) {
        if body.trim().is_empty() {
            return;
        }
        self.heading(&format!("## {title}"));
        self.line(body);
        self.line("");
        self.line(SECTION_BREAK);
        self.line("");
    }

    fn finish(self) -> String {
        self.lines.join("\n")
    }
}

fn any_present(bodies: &[&str]) -> bool {
    bodies.iter().any(|body| !body.trim().is_empty())
}

/// Render the consolidated report for a completed run.
pub fn render_report(record: &RunRecord) -> String {
    let state = &record.state;
    let research = &state.investment_debate_state;
    let risk = &state.risk_debate_state;
    let rule = "=".repeat(RULE_WIDTH);

    let mut out = ReportBuilder::new();
    out.line(rule.as_str());
    out.line("TRADEBOARD ANALYSIS REPORT");
    out.line(rule.as_str());
    out.line(format!("Ticker: {}", record.ticker));
    out.line(format!("Analysis Date: {}", record.trade_date));
    out.line(format!(
        "Generated: {}",
        record.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.line(format!("Run ID: {}", record.run_id));
    out.line(rule.as_str());
    out.line("");

    out.heading("# FINAL TRADING DECISION");
    out.line(format!("**Decision: {}**", record.decision));
    out.line("");
    out.line(SECTION_BREAK);
    out.line("");

    out.heading("# I. ANALYST TEAM REPORTS");
    out.subsection("Market Analysis", &state.market_report);
    out.subsection("Social Sentiment Analysis", &state.sentiment_report);
    out.subsection("News Analysis", &state.news_report);
    out.subsection("Fundamentals Analysis", &state.fundamentals_report);
    if let Some(alpha) = &state.alpha_factors_report {
        out.subsection("Alpha Factors Analysis", alpha);
    }

    if any_present(&[&research.bull_history, &research.bear_history, &research.judge_decision]) {
        out.heading("# II. RESEARCH TEAM DECISION");
        out.subsection("Bull Researcher Analysis", &research.bull_history);
        out.subsection("Bear Researcher Analysis", &research.bear_history);
        out.subsection("Research Manager Decision", &research.judge_decision);
    }

    if any_present(&[&state.trader_investment_plan]) {
        out.heading("# III. TRADING TEAM PLAN");
        out.line(state.trader_investment_plan.as_str());
        out.line("");
        out.line(SECTION_BREAK);
        out.line("");
    }

    if any_present(&[
        &risk.risky_history,
        &risk.safe_history,
        &risk.neutral_history,
        &risk.judge_decision,
    ]) {
        out.heading("# IV. RISK MANAGEMENT TEAM");
        out.subsection("Aggressive Analyst", &risk.risky_history);
        out.subsection("Conservative Analyst", &risk.safe_history);
        out.subsection("Neutral Analyst", &risk.neutral_history);
        out.subsection("Portfolio Manager Decision", &risk.judge_decision);
    }

    if any_present(&[&state.final_trade_decision]) {
        out.heading("# V. FINAL TRADE DECISION");
        out.line(state.final_trade_decision.as_str());
        out.line("");
    }

    out.finish()
}

/// Uppercase `raw` and check it is safe to use as a single path component.
pub fn normalize_ticker(raw: &str) -> Result<String, ReportError> {
    let ticker = raw.trim().to_ascii_uppercase();
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=');
    if ticker.is_empty() || ticker.starts_with('.') || !ticker.chars().all(allowed) {
        return Err(ReportError::InvalidTicker(raw.to_string()));
    }
    Ok(ticker)
}

/// `<results_dir>/<TICKER>/<DATE>` for a record.
pub fn run_dir(results_dir: &Path, record: &RunRecord) -> Result<PathBuf, ReportError> {
    let ticker = normalize_ticker(&record.ticker)?;
    Ok(results_dir
        .join(ticker)
        .join(record.trade_date.to_string()))
}

/// Paths written by [`write_run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenRun {
    pub report_path: PathBuf,
    pub state_path: PathBuf,
}

/// Write the consolidated report and the JSON run record, creating
/// directories as needed.
pub fn write_run(
    results_dir: &Path,
    record: &RunRecord,
    format: ReportFormat,
) -> Result<WrittenRun, ReportError> {
    let ticker = normalize_ticker(&record.ticker)?;
    let dir = run_dir(results_dir, record)?;
    fs::create_dir_all(&dir).map_err(ReportError::io(&dir))?;

    let stem = format!("{ticker}_{}", record.trade_date);
    let report_path = dir.join(format!("{stem}_full_report.{}", format.extension()));
    let state_path = dir.join(format!("{stem}_state.json"));

    let report = render_report(record);
    fs::write(&report_path, &report).map_err(ReportError::io(&report_path))?;

    let json = serde_json::to_string_pretty(record)?;
    fs::write(&state_path, json).map_err(ReportError::io(&state_path))?;

    info!(
        report = %report_path.display(),
        state = %state_path.display(),
        report_chars = report.len(),
        "Run written"
    );

    Ok(WrittenRun {
        report_path,
        state_path,
    })
}

/// Read a run record previously written by [`write_run`].
pub fn load_run(path: &Path) -> Result<RunRecord, ReportError> {
    let json = fs::read_to_string(path).map_err(ReportError::io(path))?;
    Ok(serde_json::from_str(&json)?)
}
