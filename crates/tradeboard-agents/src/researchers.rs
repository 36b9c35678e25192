use async_trait::async_trait;
use tracing::info;
use tradeboard_models::{Debate, PipelineState, ResearchRole, StateUpdate};

use crate::error::AgentError;
use crate::node::{NodeResources, RoleNode};
use crate::prompts::researcher_prompt;

/// Bull or bear participant of the research debate.
pub struct Researcher {
    role: ResearchRole,
    resources: NodeResources,
}

impl Researcher {
    pub fn new(role: ResearchRole, resources: NodeResources) -> Self {
        Self { role, resources }
    }

    pub fn bull(resources: NodeResources) -> Self {
        Self::new(ResearchRole::Bull, resources)
    }

    pub fn bear(resources: NodeResources) -> Self {
        Self::new(ResearchRole::Bear, resources)
    }

    pub fn role(&self) -> ResearchRole {
        self.role
    }
}

#[async_trait]
impl RoleNode for Researcher {
    fn name(&self) -> &str {
        match self.role {
            ResearchRole::Bull => "Bull Researcher",
            ResearchRole::Bear => "Bear Researcher",
        }
    }

    async fn run(&self, state: &PipelineState) -> Result<StateUpdate, AgentError> {
        let recollection = self.resources.recall(state).await?;
        let prompt = researcher_prompt(self.role, state, &recollection.past_lessons);
        let response = self.resources.llm.complete(&prompt).await?;

        let argument = format!("{}: {}", self.role.label(), response.trim());
        let debate = state.investment_debate_state.advance_round(self.role, &argument);
        info!(speaker = ?self.role, count = debate.count, "Research debate turn");

        Ok(StateUpdate {
            investment_debate_state: Some(debate),
            ..StateUpdate::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::NO_PAST_MEMORIES;
    use crate::test_support::{sample_state, ScriptedGenerator, StubMemory};
    use std::sync::Arc;

    #[tokio::test]
    async fn bull_turn_advances_debate() {
        let llm = Arc::new(ScriptedGenerator::new("Growth is accelerating."));
        let memory = Arc::new(StubMemory::empty());
        let node = Researcher::bull(NodeResources::new(llm.clone(), memory.clone(), 2));

        let update = node.run(&sample_state()).await.unwrap();
        let debate = update.investment_debate_state.unwrap();

        assert_eq!(debate.count, 1);
        assert_eq!(debate.history, "Bull Analyst: Growth is accelerating.");
        assert_eq!(debate.bull_history, debate.history);
        assert!(debate.bear_history.is_empty());
        assert!(update.investment_plan.is_none());

        let prompts = llm.prompts().await;
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains(NO_PAST_MEMORIES));
        assert_eq!(memory.requests().await, vec![2]);
    }

    #[tokio::test]
    async fn bear_sees_bull_argument() {
        let llm = Arc::new(ScriptedGenerator::new("Valuation is stretched."));
        let node = Researcher::bear(NodeResources::new(llm.clone(), Arc::new(StubMemory::empty()), 2));

        let mut state = sample_state();
        state.investment_debate_state = state
            .investment_debate_state
            .advance_round(ResearchRole::Bull, "Bull Analyst: buy the dip");

        let update = node.run(&state).await.unwrap();
        let debate = update.investment_debate_state.unwrap();
        assert_eq!(
            debate.history,
            "Bull Analyst: buy the dip\nBear Analyst: Valuation is stretched."
        );
        assert_eq!(debate.count, 2);
        assert!(llm.prompts().await[0].contains("Last bull argument: Bull Analyst: buy the dip"));
    }

    #[tokio::test]
    async fn generator_failure_propagates() {
        let llm = Arc::new(ScriptedGenerator::failing(|| {
            AgentError::RateLimited("429".to_string())
        }));
        let node = Researcher::bull(NodeResources::new(llm, Arc::new(StubMemory::empty()), 2));
        let err = node.run(&sample_state()).await.unwrap_err();
        assert!(err.is_retriable());
    }
}
