use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UtteranceId(pub Uuid);

impl UtteranceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UtteranceId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    High,
}

/// One unit of synthesized speech. At most one is audibly in flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackUtterance {
    pub id: UtteranceId,
    pub text: String,
    pub rate: f32,
    pub volume: f32,
    pub priority: Priority,
    /// May this be spoken while the introduction window is open?
    pub allowed_during_intro: bool,
}

impl FeedbackUtterance {
    pub fn low(text: impl Into<String>) -> Self {
        Self {
            id: UtteranceId::new(),
            text: text.into(),
            rate: 1.0,
            volume: 1.0,
            priority: Priority::Low,
            allowed_during_intro: false,
        }
    }

    pub fn high(text: impl Into<String>) -> Self {
        Self {
            id: UtteranceId::new(),
            text: text.into(),
            rate: 1.0,
            volume: 1.0,
            priority: Priority::High,
            allowed_during_intro: true,
        }
    }
}

/// What the synthesizer should do for an accepted request.
#[derive(Debug, Clone)]
pub enum SpeechCmd {
    Speak(FeedbackUtterance),
    /// Cancel whatever is in flight first, then speak. Never both audible.
    CancelAndSpeak(FeedbackUtterance),
}

/// Single-channel arbiter over the spoken-output collaborator.
///
/// There is no backlog: a later utterance preempts or replaces an earlier
/// one. Low-priority speech is dropped outright while the introduction
/// window is open, so a page welcome is never interrupted by incidental
/// hover or status chatter.
#[derive(Debug, Default)]
pub struct FeedbackArbiter {
    speaking: Option<UtteranceId>,
    intro: Option<UtteranceId>,
}

impl FeedbackArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decides the fate of one utterance. `None` means dropped.
    pub fn request(&mut self, utterance: FeedbackUtterance) -> Option<SpeechCmd> {
        if self.intro.is_some()
            && utterance.priority == Priority::Low
            && !utterance.allowed_during_intro
        {
            debug!(text = %utterance.text, "dropped low-priority speech during intro window");
            return None;
        }

        let preempting = self.speaking.take();
        if let Some(cancelled) = preempting {
            // Preempting the welcome itself closes the window; its end
            // event will never arrive once cancelled.
            if self.intro == Some(cancelled) {
                self.intro = None;
            }
            self.speaking = Some(utterance.id);
            return Some(SpeechCmd::CancelAndSpeak(utterance));
        }

        self.speaking = Some(utterance.id);
        Some(SpeechCmd::Speak(utterance))
    }

    /// Opens the protected introduction window and speaks the welcome. The
    /// window stays open until that exact utterance completes.
    pub fn begin_intro(&mut self, mut utterance: FeedbackUtterance) -> SpeechCmd {
        utterance.allowed_during_intro = true;
        self.intro = Some(utterance.id);
        match self.request(utterance) {
            Some(cmd) => cmd,
            // Unreachable: intro utterances are always allowed through.
            None => unreachable!("intro utterance cannot be dropped"),
        }
    }

    /// Completion event from the synthesizer.
    pub fn synthesis_ended(&mut self, id: UtteranceId) {
        if self.speaking == Some(id) {
            self.speaking = None;
        }
        if self.intro == Some(id) {
            self.intro = None;
            debug!("intro window closed");
        }
    }

    pub fn intro_active(&self) -> bool {
        self.intro.is_some()
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking.is_some()
    }
}
