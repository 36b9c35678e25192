//! Debate transcripts for the research and risk panels.
//!
//! A debate state is never patched in place: every turn produces a new value
//! via [`Debate::advance_round`], and the judge produces a final value via
//! [`Debate::with_judge_decision`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Anyone who can hold the floor in either debate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Speaker {
    Bull,
    Bear,
    Risky,
    Safe,
    Neutral,
    Judge,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bull => "Bull",
            Self::Bear => "Bear",
            Self::Risky => "Risky",
            Self::Safe => "Safe",
            Self::Neutral => "Neutral",
            Self::Judge => "Judge",
        };
        f.write_str(name)
    }
}

/// Participants of the bull/bear research debate, in speaking order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ResearchRole {
    Bull,
    Bear,
}

impl ResearchRole {
    /// Prefix placed in front of every utterance in the transcript.
    pub fn label(self) -> &'static str {
        match self {
            Self::Bull => "Bull Analyst",
            Self::Bear => "Bear Analyst",
        }
    }
}

impl From<ResearchRole> for Speaker {
    fn from(role: ResearchRole) -> Self {
        match role {
            ResearchRole::Bull => Speaker::Bull,
            ResearchRole::Bear => Speaker::Bear,
        }
    }
}

/// Participants of the risk debate, in speaking order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RiskRole {
    Risky,
    Safe,
    Neutral,
}

impl RiskRole {
    pub fn label(self) -> &'static str {
        match self {
            Self::Risky => "Risky Analyst",
            Self::Safe => "Safe Analyst",
            Self::Neutral => "Neutral Analyst",
        }
    }
}

impl From<RiskRole> for Speaker {
    fn from(role: RiskRole) -> Self {
        match role {
            RiskRole::Risky => Speaker::Risky,
            RiskRole::Safe => Speaker::Safe,
            RiskRole::Neutral => Speaker::Neutral,
        }
    }
}

/// Shared behaviour of the two debate records.
pub trait Debate: Clone {
    type Role: Copy + Into<Speaker> + fmt::Debug + 'static;

    /// Fixed speaking order for one round.
    const ROLES: &'static [Self::Role];

    fn count(&self) -> u32;
    fn history(&self) -> &str;
    fn latest_speaker(&self) -> Option<Speaker>;
    fn judge_decision(&self) -> &str;

    /// Who speaks after `latest_speaker`.
    fn next_speaker(&self) -> Self::Role;

    /// Record one utterance. Returns the replacement record.
    fn advance_round(&self, role: Self::Role, utterance: &str) -> Self;

    /// Record the judge's ruling. Returns the replacement record.
    fn with_judge_decision(&self, decision: &str) -> Self;

    /// Number of turns allowed for `rounds` full rounds.
    fn turn_limit(rounds: u32) -> u32 {
        rounds.saturating_mul(Self::ROLES.len() as u32)
    }

    /// True once the turn counter has reached the limit for `rounds`.
    fn is_concluded(&self, rounds: u32) -> bool {
        self.count() >= Self::turn_limit(rounds)
    }
}

fn append_line(transcript: &str, utterance: &str) -> String {
    if transcript.is_empty() {
        utterance.to_string()
    } else {
        format!("{transcript}\n{utterance}")
    }
}

/// State of the bull/bear research debate.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ResearchDebateState {
    pub history: String,
    pub bull_history: String,
    pub bear_history: String,
    pub current_bull_response: String,
    pub current_bear_response: String,
    pub latest_speaker: Option<Speaker>,
    pub judge_decision: String,
    pub count: u32,
}

impl ResearchDebateState {
    pub fn role_history(&self, role: ResearchRole) -> &str {
        match role {
            ResearchRole::Bull => &self.bull_history,
            ResearchRole::Bear => &self.bear_history,
        }
    }

    /// The most recent utterance of the other side, empty before they spoke.
    pub fn opponent_response(&self, role: ResearchRole) -> &str {
        match role {
            ResearchRole::Bull => &self.current_bear_response,
            ResearchRole::Bear => &self.current_bull_response,
        }
    }
}

impl Debate for ResearchDebateState {
    type Role = ResearchRole;

    const ROLES: &'static [ResearchRole] = &[ResearchRole::Bull, ResearchRole::Bear];

    fn count(&self) -> u32 {
        self.count
    }

    fn history(&self) -> &str {
        &self.history
    }

    fn latest_speaker(&self) -> Option<Speaker> {
        self.latest_speaker
    }

    fn judge_decision(&self) -> &str {
        &self.judge_decision
    }

    fn next_speaker(&self) -> ResearchRole {
        match self.latest_speaker {
            Some(Speaker::Bull) => ResearchRole::Bear,
            _ => ResearchRole::Bull,
        }
    }

    fn advance_round(&self, role: ResearchRole, utterance: &str) -> Self {
        let mut next = self.clone();
        next.history = append_line(&self.history, utterance);
        match role {
            ResearchRole::Bull => {
                next.bull_history = append_line(&self.bull_history, utterance);
                next.current_bull_response = utterance.to_string();
            }
            ResearchRole::Bear => {
                next.bear_history = append_line(&self.bear_history, utterance);
                next.current_bear_response = utterance.to_string();
            }
        }
        next.latest_speaker = Some(role.into());
        next.count = self.count + 1;
        next
    }

    fn with_judge_decision(&self, decision: &str) -> Self {
        Self {
            judge_decision: decision.to_string(),
            latest_speaker: Some(Speaker::Judge),
            ..self.clone()
        }
    }
}

/// State of the risky/safe/neutral risk debate.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RiskDebateState {
    pub history: String,
    pub risky_history: String,
    pub safe_history: String,
    pub neutral_history: String,
    pub current_risky_response: String,
    pub current_safe_response: String,
    pub current_neutral_response: String,
    pub latest_speaker: Option<Speaker>,
    pub judge_decision: String,
    pub count: u32,
}

impl RiskDebateState {
    pub fn role_history(&self, role: RiskRole) -> &str {
        match role {
            RiskRole::Risky => &self.risky_history,
            RiskRole::Safe => &self.safe_history,
            RiskRole::Neutral => &self.neutral_history,
        }
    }

    pub fn current_response(&self, role: RiskRole) -> &str {
        match role {
            RiskRole::Risky => &self.current_risky_response,
            RiskRole::Safe => &self.current_safe_response,
            RiskRole::Neutral => &self.current_neutral_response,
        }
    }

    /// Latest utterances of the two roles other than `role`, in speaking order.
    pub fn other_responses(&self, role: RiskRole) -> Vec<(RiskRole, &str)> {
        <Self as Debate>::ROLES
            .iter()
            .copied()
            .filter(|r| *r != role)
            .map(|r| (r, self.current_response(r)))
            .collect()
    }
}

impl Debate for RiskDebateState {
    type Role = RiskRole;

    const ROLES: &'static [RiskRole] = &[RiskRole::Risky, RiskRole::Safe, RiskRole::Neutral];

    fn count(&self) -> u32 {
        self.count
    }

    fn history(&self) -> &str {
        &self.history
    }

    fn latest_speaker(&self) -> Option<Speaker> {
        self.latest_speaker
    }

    fn judge_decision(&self) -> &str {
        &self.judge_decision
    }

    fn next_speaker(&self) -> RiskRole {
        match self.latest_speaker {
            Some(Speaker::Risky) => RiskRole::Safe,
            Some(Speaker::Safe) => RiskRole::Neutral,
            _ => RiskRole::Risky,
        }
    }

    fn advance_round(&self, role: RiskRole, utterance: &str) -> Self {
        let mut next = self.clone();
        next.history = append_line(&self.history, utterance);
        match role {
            RiskRole::Risky => {
                next.risky_history = append_line(&self.risky_history, utterance);
                next.current_risky_response = utterance.to_string();
            }
            RiskRole::Safe => {
                next.safe_history = append_line(&self.safe_history, utterance);
                next.current_safe_response = utterance.to_string();
            }
            RiskRole::Neutral => {
                next.neutral_history = append_line(&self.neutral_history, utterance);
                next.current_neutral_response = utterance.to_string();
            }
        }
        next.latest_speaker = Some(role.into());
        next.count = self.count + 1;
        next
    }

    fn with_judge_decision(&self, decision: &str) -> Self {
        Self {
            judge_decision: decision.to_string(),
            latest_speaker: Some(Speaker::Judge),
            ..self.clone()
        }
    }
}
