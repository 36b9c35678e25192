use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use tracing::{debug, info, info_span, Instrument};
use tradeboard_models::{
    AnalystReports, DebateConfig, DecisionLabel, Debate, PipelineState, ResearchRole, RiskRole,
};
use uuid::Uuid;

use crate::error::AgentError;
use crate::llm::TextGenerator;
use crate::managers::{ResearchManager, RiskManager};
use crate::memory::{MemoryLookup, NoMemory};
use crate::node::{NodeResources, RoleNode};
use crate::researchers::Researcher;
use crate::risk_analysts::RiskAnalyst;
use crate::signal::SignalProcessor;
use crate::trader::Trader;

/// Pipeline phases in execution order.
///
/// ```text
/// ResearchDebate ⟲ (until count reaches 2 × max_debate_rounds)
///   → ResearchJudge → Trader
///   → RiskDebate ⟲ (until count reaches 3 × max_risk_discuss_rounds)
///   → RiskJudge → Signal → Done
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    ResearchDebate,
    ResearchJudge,
    Trader,
    RiskDebate,
    RiskJudge,
    Signal,
    Done,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        self == Self::Done
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ResearchDebate => "ResearchDebate",
            Self::ResearchJudge => "ResearchJudge",
            Self::Trader => "Trader",
            Self::RiskDebate => "RiskDebate",
            Self::RiskJudge => "RiskJudge",
            Self::Signal => "Signal",
            Self::Done => "Done",
        };
        f.write_str(name)
    }
}

/// The phase that follows `phase`, given the state after it ran.
///
/// Debate phases loop on themselves until their turn counter reaches the
/// configured limit; every other phase has a single forward edge.
pub fn next_phase(phase: Phase, state: &PipelineState, limits: &DebateConfig) -> Phase {
    match phase {
        Phase::ResearchDebate => {
            if state
                .investment_debate_state
                .is_concluded(limits.max_debate_rounds)
            {
                Phase::ResearchJudge
            } else {
                Phase::ResearchDebate
            }
        }
        Phase::ResearchJudge => Phase::Trader,
        Phase::Trader => Phase::RiskDebate,
        Phase::RiskDebate => {
            if state
                .risk_debate_state
                .is_concluded(limits.max_risk_discuss_rounds)
            {
                Phase::RiskJudge
            } else {
                Phase::RiskDebate
            }
        }
        Phase::RiskJudge => Phase::Signal,
        Phase::Signal | Phase::Done => Phase::Done,
    }
}

/// Per-role memory lookups.
#[derive(Clone)]
pub struct Memories {
    pub bull: Arc<dyn MemoryLookup>,
    pub bear: Arc<dyn MemoryLookup>,
    pub trader: Arc<dyn MemoryLookup>,
    pub invest_judge: Arc<dyn MemoryLookup>,
    /// Shared by the risk manager and the three risk analysts.
    pub risk_manager: Arc<dyn MemoryLookup>,
}

impl Memories {
    /// The same lookup for every role.
    pub fn shared(memory: Arc<dyn MemoryLookup>) -> Self {
        Self {
            bull: Arc::clone(&memory),
            bear: Arc::clone(&memory),
            trader: Arc::clone(&memory),
            invest_judge: Arc::clone(&memory),
            risk_manager: memory,
        }
    }

    pub fn none() -> Self {
        Self::shared(Arc::new(NoMemory))
    }
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub run_id: Uuid,
    pub state: PipelineState,
    pub decision: DecisionLabel,
    /// Every phase executed, in order.
    pub phases: Vec<Phase>,
}

/// Sequences the role nodes into the full decision pipeline.
pub struct Pipeline {
    bull: Researcher,
    bear: Researcher,
    research_manager: ResearchManager,
    trader: Trader,
    risky: RiskAnalyst,
    safe: RiskAnalyst,
    neutral: RiskAnalyst,
    risk_manager: RiskManager,
    signal: SignalProcessor,
    limits: DebateConfig,
}

impl Pipeline {
    /// `quick` serves debaters, the trader and signal extraction; `deep`
    /// serves the two judges.
    pub fn new(
        quick: Arc<dyn TextGenerator>,
        deep: Arc<dyn TextGenerator>,
        memories: Memories,
        limits: DebateConfig,
    ) -> Self {
        let n = limits.memory_matches;
        let quick_with = |memory: &Arc<dyn MemoryLookup>| {
            NodeResources::new(Arc::clone(&quick), Arc::clone(memory), n)
        };
        let deep_with = |memory: &Arc<dyn MemoryLookup>| {
            NodeResources::new(Arc::clone(&deep), Arc::clone(memory), n)
        };

        Self {
            bull: Researcher::bull(quick_with(&memories.bull)),
            bear: Researcher::bear(quick_with(&memories.bear)),
            research_manager: ResearchManager::new(deep_with(&memories.invest_judge)),
            trader: Trader::new(quick_with(&memories.trader)),
            risky: RiskAnalyst::new(RiskRole::Risky, quick_with(&memories.risk_manager)),
            safe: RiskAnalyst::new(RiskRole::Safe, quick_with(&memories.risk_manager)),
            neutral: RiskAnalyst::new(RiskRole::Neutral, quick_with(&memories.risk_manager)),
            risk_manager: RiskManager::new(deep_with(&memories.risk_manager)),
            signal: SignalProcessor::with_llm(Arc::clone(&quick)),
            limits,
        }
    }

    /// Replace the signal processor, e.g. with [`SignalProcessor::deterministic`].
    pub fn with_signal_processor(mut self, signal: SignalProcessor) -> Self {
        self.signal = signal;
        self
    }

    pub fn limits(&self) -> &DebateConfig {
        &self.limits
    }

    fn node_for(&self, phase: Phase, state: &PipelineState) -> Option<&dyn RoleNode> {
        match phase {
            Phase::ResearchDebate => Some(match state.investment_debate_state.next_speaker() {
                ResearchRole::Bull => &self.bull,
                ResearchRole::Bear => &self.bear,
            }),
            Phase::ResearchJudge => Some(&self.research_manager),
            Phase::Trader => Some(&self.trader),
            Phase::RiskDebate => Some(match state.risk_debate_state.next_speaker() {
                RiskRole::Risky => &self.risky,
                RiskRole::Safe => &self.safe,
                RiskRole::Neutral => &self.neutral,
            }),
            Phase::RiskJudge => Some(&self.risk_manager),
            Phase::Signal | Phase::Done => None,
        }
    }

    /// Run every phase for `ticker` on `trade_date`, starting from the
    /// analyst team's reports. Any node failure aborts the run.
    pub async fn propagate(
        &self,
        ticker: &str,
        trade_date: NaiveDate,
        reports: AnalystReports,
    ) -> Result<PipelineOutcome, AgentError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("pipeline", %run_id, ticker, %trade_date);
        self.run_phases(run_id, ticker, trade_date, reports)
            .instrument(span)
            .await
    }

    async fn run_phases(
        &self,
        run_id: Uuid,
        ticker: &str,
        trade_date: NaiveDate,
        reports: AnalystReports,
    ) -> Result<PipelineOutcome, AgentError> {
        let start = Instant::now();
        info!("Starting pipeline");

        let mut state = PipelineState::new(ticker, trade_date);
        state.apply_reports(reports);

        let mut phase = Phase::ResearchDebate;
        let mut phases = Vec::new();
        let mut decision = None;

        while !phase.is_terminal() {
            let phase_start = Instant::now();

            match self.node_for(phase, &state) {
                Some(node) => {
                    debug!(%phase, node = node.name(), "Running node");
                    let update = node.run(&state).await?;
                    state.apply(update);
                }
                None => {
                    decision = Some(self.signal.process_signal(&state.final_trade_decision).await?);
                }
            }

            let next = next_phase(phase, &state, &self.limits);
            debug!(
                from = %phase,
                to = %next,
                elapsed_ms = phase_start.elapsed().as_millis() as u64,
                "Phase transition"
            );
            phases.push(phase);
            phase = next;
        }

        if state.final_trade_decision.trim().is_empty() {
            return Err(AgentError::ContractViolation(
                "risk manager produced an empty final decision".to_string(),
            ));
        }
        let decision = decision.ok_or_else(|| {
            AgentError::ContractViolation("pipeline finished without a decision".to_string())
        })?;

        info!(
            %decision,
            research_turns = state.investment_debate_state.count,
            risk_turns = state.risk_debate_state.count,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Pipeline complete"
        );

        Ok(PipelineOutcome {
            run_id,
            state,
            decision,
            phases,
        })
    }
}
