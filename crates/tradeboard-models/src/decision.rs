use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The closed set of trade signals the pipeline can emit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum DecisionLabel {
    Buy,
    Sell,
    Hold,
}

impl DecisionLabel {
    pub const ALL: [DecisionLabel; 3] = [DecisionLabel::Buy, DecisionLabel::Sell, DecisionLabel::Hold];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
            Self::Hold => "HOLD",
        }
    }
}

impl fmt::Display for DecisionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("not a decision label: {0:?}")]
pub struct ParseDecisionError(pub String);

/// Parses exactly one label. Case is ignored, surrounding whitespace is
/// trimmed, anything else is rejected.
impl FromStr for DecisionLabel {
    type Err = ParseDecisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(Self::Buy),
            "SELL" => Ok(Self::Sell),
            "HOLD" => Ok(Self::Hold),
            _ => Err(ParseDecisionError(s.to_string())),
        }
    }
}
