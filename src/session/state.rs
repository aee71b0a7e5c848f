use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::event::ActionPlan;

/// The listening/processing lifecycle. Transitions are owned exclusively by
/// the `SessionController`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Fully silent. No recognizer active.
    Idle,
    /// Continuous recognition, waiting for a wake phrase.
    WakeListening,
    /// Single-shot recognition capturing one command.
    CommandListening,
    /// Interpreting a finalized transcript; no recognizer active.
    Processing,
    /// A destructive action is held pending an explicit yes/no.
    AwaitingConfirmation,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::Idle
    }
}

/// The held action while awaiting confirmation. Exists iff the session state
/// is `AwaitingConfirmation`.
#[derive(Debug, Clone)]
pub struct PendingAction {
    pub plan: ActionPlan,
    pub description: String,
}

/// Fixed-capacity history of processed command transcripts; the oldest entry
/// is evicted on overflow.
#[derive(Debug, Clone)]
pub struct CommandHistory {
    entries: VecDeque<String>,
    capacity: usize,
}

impl CommandHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, transcript: String) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(transcript);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&String> {
        self.entries.back()
    }
}
