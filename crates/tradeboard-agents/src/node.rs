use std::sync::Arc;

use async_trait::async_trait;
use tradeboard_models::{PipelineState, StateUpdate};

use crate::error::AgentError;
use crate::llm::TextGenerator;
use crate::memory::{recall, MemoryLookup, Recollection};

/// One LLM-backed step of the pipeline. Mockable for testing.
///
/// A node reads the pipeline state and returns a partial update; it never
/// catches generator failures and never retries.
#[async_trait]
pub trait RoleNode: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self, state: &PipelineState) -> Result<StateUpdate, AgentError>;
}

/// Collaborators shared by every role node.
#[derive(Clone)]
pub struct NodeResources {
    pub llm: Arc<dyn TextGenerator>,
    pub memory: Arc<dyn MemoryLookup>,
    pub memory_matches: usize,
}

impl NodeResources {
    pub fn new(
        llm: Arc<dyn TextGenerator>,
        memory: Arc<dyn MemoryLookup>,
        memory_matches: usize,
    ) -> Self {
        Self {
            llm,
            memory,
            memory_matches,
        }
    }

    pub async fn recall(&self, state: &PipelineState) -> Result<Recollection, AgentError> {
        recall(state, self.memory.as_ref(), self.memory_matches).await
    }
}
