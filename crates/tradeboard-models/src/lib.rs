pub mod config;
pub mod debate;
pub mod decision;
pub mod memory;
pub mod pipeline_state;
pub mod run_record;

pub use config::{
    AgentsConfig, ConfigError, DebateConfig, OutputConfig, RetryConfig, TradeboardConfig,
};
pub use debate::{Debate, ResearchDebateState, ResearchRole, RiskDebateState, RiskRole, Speaker};
pub use decision::{DecisionLabel, ParseDecisionError};
pub use memory::MemoryRecord;
pub use pipeline_state::{AnalystReports, ConversationEntry, PipelineState, StateUpdate};
pub use run_record::{RunRecord, RUN_SCHEMA_VERSION};
