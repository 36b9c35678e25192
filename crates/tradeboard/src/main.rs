use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tradeboard::agents::claude_cli::check_cli_available;
use tradeboard::agents::{Memories, StaticMemory};
use tradeboard::models::{AnalystReports, MemoryRecord};
use tradeboard::ReportFormat;

#[derive(Parser, Debug)]
#[command(name = "tradeboard", about = "Multi-agent BUY/SELL/HOLD decision board")]
struct Cli {
    /// Path to configuration file [default: config/tradeboard.toml]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Ticker symbol, e.g. SPY
    #[arg(short, long)]
    ticker: String,

    /// Trade date (YYYY-MM-DD)
    #[arg(short, long)]
    date: NaiveDate,

    /// Read AnalystReports JSON from a file instead of stdin
    #[arg(short, long)]
    reports: Option<PathBuf>,

    /// JSON array of past-lesson records shared by every role
    #[arg(short, long)]
    memories: Option<PathBuf>,

    /// Report file format: markdown or txt
    #[arg(long, default_value_t = ReportFormat::Markdown)]
    format: ReportFormat,

    /// Pretty-print the output JSON
    #[arg(long)]
    pretty: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn read_reports(path: Option<&Path>) -> Result<AnalystReports> {
    let reports_json = if let Some(path) = path {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read reports: {}", path.display()))?
    } else {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read from stdin")?;
        buf
    };
    serde_json::from_str(&reports_json).context("Failed to parse AnalystReports JSON")
}

fn load_memories(path: Option<&Path>) -> Result<Memories> {
    let Some(path) = path else {
        return Ok(Memories::none());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read memories: {}", path.display()))?;
    let records: Vec<MemoryRecord> =
        serde_json::from_str(&json).context("Failed to parse memory records JSON")?;
    info!(records = records.len(), "Loaded past lessons");
    Ok(Memories::shared(Arc::new(StaticMemory::new(records))))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let ticker = tradeboard::normalize_ticker(&cli.ticker).context("Bad --ticker")?;
    let config = tradeboard::load_config(cli.config.as_deref())?;
    let memories = load_memories(cli.memories.as_deref())?;
    let pipeline =
        tradeboard::build_pipeline(&config, memories).context("Failed to build pipeline")?;

    if !check_cli_available().await {
        bail!("claude CLI not found on PATH");
    }

    let reports = read_reports(cli.reports.as_deref())?;

    let record = tradeboard::run(
        &pipeline,
        &tradeboard::retry_policy(&config),
        &ticker,
        cli.date,
        reports,
    )
    .await
    .map_err(|e| anyhow::anyhow!("Pipeline run failed: {e}"))?;

    tradeboard::write_run(Path::new(&config.output.results_dir), &record, cli.format)
        .context("Failed to write run outputs")?;

    // Output the run record as JSON to stdout
    let output = if cli.pretty {
        serde_json::to_string_pretty(&record)?
    } else {
        serde_json::to_string(&record)?
    };
    println!("{output}");

    Ok(())
}
