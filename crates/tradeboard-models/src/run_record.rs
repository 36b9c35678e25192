use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decision::DecisionLabel;
use crate::pipeline_state::PipelineState;

pub const RUN_SCHEMA_VERSION: u32 = 1;

/// The persisted outcome of one completed pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunRecord {
    pub run_id: Uuid,
    pub schema_version: u32,
    pub ticker: String,
    pub trade_date: NaiveDate,
    pub generated_at: DateTime<Utc>,
    pub decision: DecisionLabel,
    pub state: PipelineState,
    pub processing_time_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_run_record() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let mut state = PipelineState::new("SPY", date);
        state.final_trade_decision = "FINAL TRANSACTION PROPOSAL: **HOLD**".to_string();

        let record = RunRecord {
            run_id: Uuid::new_v4(),
            schema_version: RUN_SCHEMA_VERSION,
            ticker: "SPY".to_string(),
            trade_date: date,
            generated_at: Utc::now(),
            decision: DecisionLabel::Hold,
            state,
            processing_time_ms: 1200,
        };

        let json = serde_json::to_string(&record).unwrap();
        let back: RunRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
        assert!(json.contains("\"decision\":\"HOLD\""));
    }
}
