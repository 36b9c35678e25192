use serde::{Deserialize, Serialize};

/// A prior situation and the lesson recorded for it.
///
/// The pipeline only ever reads `recommendation`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemoryRecord {
    #[serde(default)]
    pub situation: String,
    pub recommendation: String,
}
