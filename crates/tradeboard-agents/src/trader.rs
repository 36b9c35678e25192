use async_trait::async_trait;
use tracing::info;
use tradeboard_models::{ConversationEntry, PipelineState, StateUpdate};

use crate::error::AgentError;
use crate::node::{NodeResources, RoleNode};
use crate::prompts::trader_messages;

/// Sender name recorded in the conversation log.
pub const TRADER_SENDER: &str = "Trader";

/// Turns the research manager's plan into a concrete transaction proposal.
pub struct Trader {
    resources: NodeResources,
}

impl Trader {
    pub fn new(resources: NodeResources) -> Self {
        Self { resources }
    }
}

#[async_trait]
impl RoleNode for Trader {
    fn name(&self) -> &str {
        TRADER_SENDER
    }

    async fn run(&self, state: &PipelineState) -> Result<StateUpdate, AgentError> {
        let recollection = self.resources.recall(state).await?;
        let messages = trader_messages(state, &recollection.past_lessons);
        let plan = self.resources.llm.generate(&messages).await?;
        info!(plan_len = plan.len(), "Trader proposal ready");

        Ok(StateUpdate {
            trader_investment_plan: Some(plan.clone()),
            message: Some(ConversationEntry {
                sender: TRADER_SENDER.to_string(),
                content: plan,
            }),
            sender: Some(TRADER_SENDER.to_string()),
            ..StateUpdate::default()
        })
    }
}
