//! The two judges: the research manager rules on the bull/bear debate and
//! writes the investment plan; the risk manager rules on the risk debate and
//! writes the final trade decision.

use async_trait::async_trait;
use tracing::info;
use tradeboard_models::{Debate, PipelineState, StateUpdate};

use crate::error::AgentError;
use crate::node::{NodeResources, RoleNode};
use crate::prompts::{research_manager_prompt, risk_manager_prompt};

pub struct ResearchManager {
    resources: NodeResources,
}

impl ResearchManager {
    pub fn new(resources: NodeResources) -> Self {
        Self { resources }
    }
}

#[async_trait]
impl RoleNode for ResearchManager {
    fn name(&self) -> &str {
        "Research Manager"
    }

    async fn run(&self, state: &PipelineState) -> Result<StateUpdate, AgentError> {
        let recollection = self.resources.recall(state).await?;
        let prompt = research_manager_prompt(state, &recollection.past_lessons);
        let ruling = self.resources.llm.complete(&prompt).await?;
        info!(turns = state.investment_debate_state.count, "Research manager ruled");

        Ok(StateUpdate {
            investment_debate_state: Some(state.investment_debate_state.with_judge_decision(&ruling)),
            investment_plan: Some(ruling),
            ..StateUpdate::default()
        })
    }
}

pub struct RiskManager {
    resources: NodeResources,
}

impl RiskManager {
    pub fn new(resources: NodeResources) -> Self {
        Self { resources }
    }
}

#[async_trait]
impl RoleNode for RiskManager {
    fn name(&self) -> &str {
        "Risk Manager"
    }

    async fn run(&self, state: &PipelineState) -> Result<StateUpdate, AgentError> {
        let recollection = self.resources.recall(state).await?;
        let prompt = risk_manager_prompt(state, &recollection.past_lessons);
        let ruling = self.resources.llm.complete(&prompt).await?;
        info!(turns = state.risk_debate_state.count, "Risk manager ruled");

        Ok(StateUpdate {
            risk_debate_state: Some(state.risk_debate_state.with_judge_decision(&ruling)),
            final_trade_decision: Some(ruling),
            ..StateUpdate::default()
        })
    }
}
