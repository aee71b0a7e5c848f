use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::feedback::FeedbackUtterance;

/// One recognized span of user speech.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    pub is_final: bool,
    /// Recognizer confidence in [0, 1].
    pub confidence: f32,
}

/// Which listening session a recognizer event belongs to. Wake listening is
/// continuous; command listening is single-shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognizerMode {
    Wake,
    Command,
}

/// Speech-to-text collaborator. Implementations deliver results, end, and
/// error events over the engine's event channel; this trait only covers the
/// start/stop authority the session controller holds.
pub trait SpeechRecognizer: Send + Sync {
    fn available(&self) -> bool;
    fn start(&self, mode: RecognizerMode) -> Result<(), EngineError>;
    fn stop(&self, mode: RecognizerMode);
}

/// Speech-synthesis collaborator. A `SynthesisEnded` event must follow every
/// spoken or cancelled utterance.
pub trait SpeechSynthesizer: Send + Sync {
    fn available(&self) -> bool;
    fn speak(&self, utterance: &FeedbackUtterance) -> Result<(), EngineError>;
    /// Global cancel of whatever is in flight.
    fn cancel(&self);
}
