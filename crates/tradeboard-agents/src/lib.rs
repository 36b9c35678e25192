pub mod claude_cli;
pub mod error;
pub mod llm;
pub mod managers;
pub mod memory;
pub mod node;
pub mod orchestrator;
pub mod prompts;
pub mod researchers;
pub mod retry;
pub mod risk_analysts;
pub mod signal;
pub mod trader;

pub mod test_support;

pub use claude_cli::{ClaudeCliConfig, ClaudeCliGenerator};
pub use error::AgentError;
pub use llm::{ChatMessage, ChatRole, TextGenerator};
pub use memory::{MemoryLookup, NoMemory, StaticMemory, NO_PAST_MEMORIES};
pub use node::{NodeResources, RoleNode};
pub use orchestrator::{next_phase, Memories, Phase, Pipeline, PipelineOutcome};
pub use retry::{run_with_retry, RetryPolicy};
pub use signal::SignalProcessor;
