use async_trait::async_trait;
use tracing::debug;
use tradeboard_models::{MemoryRecord, PipelineState};

use crate::error::AgentError;

/// Past-lessons text used when a lookup finds nothing.
pub const NO_PAST_MEMORIES: &str = "No past memories found.";

/// Similarity lookup over previously recorded situations. Mockable for testing.
#[async_trait]
pub trait MemoryLookup: Send + Sync {
    /// Up to `n_matches` records, best match first. May be empty.
    async fn get_memories(
        &self,
        situation: &str,
        n_matches: usize,
    ) -> Result<Vec<MemoryRecord>, AgentError>;
}

/// A memory that never remembers anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMemory;

#[async_trait]
impl MemoryLookup for NoMemory {
    async fn get_memories(
        &self,
        _situation: &str,
        _n_matches: usize,
    ) -> Result<Vec<MemoryRecord>, AgentError> {
        Ok(Vec::new())
    }
}

/// A fixed list of records, returned in order regardless of the situation.
#[derive(Debug, Clone, Default)]
pub struct StaticMemory {
    records: Vec<MemoryRecord>,
}

impl StaticMemory {
    pub fn new(records: Vec<MemoryRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl MemoryLookup for StaticMemory {
    async fn get_memories(
        &self,
        _situation: &str,
        n_matches: usize,
    ) -> Result<Vec<MemoryRecord>, AgentError> {
        Ok(self.records.iter().take(n_matches).cloned().collect())
    }
}

/// Format retrieved records into the past-lessons block.
pub fn format_past_lessons(records: &[MemoryRecord]) -> String {
    if records.is_empty() {
        return NO_PAST_MEMORIES.to_string();
    }
    records
        .iter()
        .map(|rec| format!("{}\n\n", rec.recommendation))
        .collect()
}

/// The situation summary and past lessons a role node builds its prompt from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recollection {
    pub situation: String,
    pub past_lessons: String,
}

/// Summarize the reports in `state` and look up lessons for that situation.
pub async fn recall(
    state: &PipelineState,
    memory: &dyn MemoryLookup,
    n_matches: usize,
) -> Result<Recollection, AgentError> {
    let situation = state.situation();
    let records = memory.get_memories(&situation, n_matches).await?;
    debug!(matches = records.len(), requested = n_matches, "Recalled past lessons");

    Ok(Recollection {
        past_lessons: format_past_lessons(&records),
        situation,
    })
}
