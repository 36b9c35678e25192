use async_trait::async_trait;
use tracing::info;
use tradeboard_models::{Debate, PipelineState, RiskRole, StateUpdate};

use crate::error::AgentError;
use crate::node::{NodeResources, RoleNode};
use crate::prompts::risk_analyst_prompt;

/// Risky, safe or neutral participant of the risk debate.
pub struct RiskAnalyst {
    role: RiskRole,
    resources: NodeResources,
}

impl RiskAnalyst {
    pub fn new(role: RiskRole, resources: NodeResources) -> Self {
        Self { role, resources }
    }

    pub fn role(&self) -> RiskRole {
        self.role
    }
}

#[async_trait]
impl RoleNode for RiskAnalyst {
    fn name(&self) -> &str {
        self.role.label()
    }

    async fn run(&self, state: &PipelineState) -> Result<StateUpdate, AgentError> {
        let recollection = self.resources.recall(state).await?;
        let prompt = risk_analyst_prompt(self.role, state, &recollection.past_lessons);
        let response = self.resources.llm.complete(&prompt).await?;

        let argument = format!("{}: {}", self.role.label(), response.trim());
        let debate = state.risk_debate_state.advance_round(self.role, &argument);
        info!(speaker = ?self.role, count = debate.count, "Risk debate turn");

        Ok(StateUpdate {
            risk_debate_state: Some(debate),
            ..StateUpdate::default()
        })
    }
}
