use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentCategory {
    Emergency,
    Contact,
    Navigation,
    Action,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl IntentCategory {
    /// Urgency is fixed per category, not inferred from wording.
    pub fn urgency(&self) -> Urgency {
        match self {
            IntentCategory::Emergency => Urgency::High,
            IntentCategory::Contact => Urgency::Medium,
            IntentCategory::Navigation | IntentCategory::Action | IntentCategory::Unknown => {
                Urgency::Low
            }
        }
    }
}

/// What the classifier distilled from one finalized transcript.
/// Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentAnalysis {
    pub category: IntentCategory,
    /// Normalized content words of the transcript.
    pub keywords: Vec<String>,
    pub urgency: Urgency,
    /// Words the resolver scores entity labels against.
    pub target_words: Vec<String>,
}
