use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::debate::{ResearchDebateState, RiskDebateState};

/// Analyst team output, produced upstream of the pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AnalystReports {
    pub market_report: String,
    pub sentiment_report: String,
    pub news_report: String,
    pub fundamentals_report: String,
    pub alpha_factors_report: Option<String>,
}

/// One entry of the pipeline's conversation log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationEntry {
    pub sender: String,
    pub content: String,
}

/// Everything the pipeline knows about one ticker on one date.
///
/// Fields are only ever added or overwritten, never removed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PipelineState {
    pub company_of_interest: String,
    pub trade_date: NaiveDate,
    #[serde(default)]
    pub market_report: String,
    #[serde(default)]
    pub sentiment_report: String,
    #[serde(default)]
    pub news_report: String,
    #[serde(default)]
    pub fundamentals_report: String,
    #[serde(default)]
    pub alpha_factors_report: Option<String>,
    #[serde(default)]
    pub investment_debate_state: ResearchDebateState,
    #[serde(default)]
    pub investment_plan: String,
    #[serde(default)]
    pub trader_investment_plan: String,
    #[serde(default)]
    pub risk_debate_state: RiskDebateState,
    #[serde(default)]
    pub final_trade_decision: String,
    #[serde(default)]
    pub messages: Vec<ConversationEntry>,
    #[serde(default)]
    pub sender: String,
}

/// Partial update returned by a pipeline node. `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateUpdate {
    pub investment_debate_state: Option<ResearchDebateState>,
    pub risk_debate_state: Option<RiskDebateState>,
    pub investment_plan: Option<String>,
    pub trader_investment_plan: Option<String>,
    pub final_trade_decision: Option<String>,
    pub message: Option<ConversationEntry>,
    pub sender: Option<String>,
}

impl PipelineState {
    /// Empty state with empty debates.
    pub fn new(company_of_interest: impl Into<String>, trade_date: NaiveDate) -> Self {
        Self {
            company_of_interest: company_of_interest.into(),
            trade_date,
            market_report: String::new(),
            sentiment_report: String::new(),
            news_report: String::new(),
            fundamentals_report: String::new(),
            alpha_factors_report: None,
            investment_debate_state: ResearchDebateState::default(),
            investment_plan: String::new(),
            trader_investment_plan: String::new(),
            risk_debate_state: RiskDebateState::default(),
            final_trade_decision: String::new(),
            messages: Vec::new(),
            sender: String::new(),
        }
    }

    /// Merge the analyst team's reports. Blank alpha factors count as absent.
    pub fn apply_reports(&mut self, reports: AnalystReports) {
        self.market_report = reports.market_report;
        self.sentiment_report = reports.sentiment_report;
        self.news_report = reports.news_report;
        self.fundamentals_report = reports.fundamentals_report;
        self.alpha_factors_report = reports
            .alpha_factors_report
            .filter(|a| !a.trim().is_empty());
    }

    /// Merge a node's partial update.
    pub fn apply(&mut self, update: StateUpdate) {
        if let Some(debate) = update.investment_debate_state {
            self.investment_debate_state = debate;
        }
        if let Some(debate) = update.risk_debate_state {
            self.risk_debate_state = debate;
        }
        if let Some(plan) = update.investment_plan {
            self.investment_plan = plan;
        }
        if let Some(plan) = update.trader_investment_plan {
            self.trader_investment_plan = plan;
        }
        if let Some(decision) = update.final_trade_decision {
            self.final_trade_decision = decision;
        }
        if let Some(message) = update.message {
            self.messages.push(message);
        }
        if let Some(sender) = update.sender {
            self.sender = sender;
        }
    }

    pub fn alpha_factors(&self) -> &str {
        self.alpha_factors_report.as_deref().unwrap_or_default()
    }

    /// The "current situation" summary used for memory lookups.
    pub fn situation(&self) -> String {
        format!(
            "{}\n\n{}\n\n{}\n\n{}\n\n{}",
            self.market_report,
            self.sentiment_report,
            self.news_report,
            self.fundamentals_report,
            self.alpha_factors()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debate::{Debate, ResearchRole};

    fn state() -> PipelineState {
        let mut state =
            PipelineState::new("SPY", NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        state.apply_reports(AnalystReports {
            market_report: "market".to_string(),
            sentiment_report: "sentiment".to_string(),
            news_report: "news".to_string(),
            fundamentals_report: "fundamentals".to_string(),
            alpha_factors_report: None,
        });
        state
    }

    #[test]
    fn situation_joins_reports() {
        assert_eq!(
            state().situation(),
            "market\n\nsentiment\n\nnews\n\nfundamentals\n\n"
        );
    }

    #[test]
    fn blank_alpha_factors_are_absent() {
        let mut s = state();
        s.apply_reports(AnalystReports {
            alpha_factors_report: Some("   ".to_string()),
            ..AnalystReports::default()
        });
        assert_eq!(s.alpha_factors_report, None);
        assert_eq!(s.alpha_factors(), "");
    }

    #[test]
    fn apply_merges_only_present_fields() {
        let mut s = state();
        s.apply(StateUpdate {
            investment_plan: Some("plan".to_string()),
            ..StateUpdate::default()
        });
        s.apply(StateUpdate {
            trader_investment_plan: Some("trade".to_string()),
            message: Some(ConversationEntry {
                sender: "Trader".to_string(),
                content: "trade".to_string(),
            }),
            sender: Some("Trader".to_string()),
            ..StateUpdate::default()
        });

        assert_eq!(s.investment_plan, "plan");
        assert_eq!(s.trader_investment_plan, "trade");
        assert_eq!(s.market_report, "market");
        assert_eq!(s.messages.len(), 1);
        assert_eq!(s.sender, "Trader");
    }

    #[test]
    fn apply_replaces_debate_state() {
        let mut s = state();
        let debate = s
            .investment_debate_state
            .advance_round(ResearchRole::Bull, "Bull Analyst: up");
        s.apply(StateUpdate {
            investment_debate_state: Some(debate.clone()),
            ..StateUpdate::default()
        });
        assert_eq!(s.investment_debate_state, debate);
    }

    #[test]
    fn json_roundtrip_preserves_text() {
        let mut s = state();
        s.final_trade_decision = "Line one\n\n  **bold** \"quoted\" ✓\ttab".to_string();
        let json = serde_json::to_string_pretty(&s).unwrap();
        let back: PipelineState = serde_json::from_str(&json).unwrap();
        assert_eq!(s, back);
        assert!(json.contains("\"trade_date\": \"2025-01-15\""));
    }
}
