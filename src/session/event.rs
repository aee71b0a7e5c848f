use crate::error::RecognitionErrorKind;
use crate::exec::ActionRequest;
use crate::feedback::{FeedbackUtterance, UtteranceId};
use crate::speech::{RecognizerMode, Transcript};

/// Scheduled-callback identities. Delays are side effects executed by the
/// driver; the elapsed event carries the kind back so the controller can
/// decide whether the delay still matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayKind {
    /// Pause between wake detection and command listening.
    WakeToCommand,
    /// Pause after processing before passive listening resumes.
    Settle,
    /// Recognizer restart after end-of-session or a transient error.
    RecognizerRestart(RecognizerMode),
}

/// A fully-specified effect the session decided on: what to invoke and what
/// to announce about it.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionPlan {
    pub request: ActionRequest,
    pub announce: String,
}

/// What the processing pipeline concluded for one finalized transcript.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessingOutcome {
    Resolved {
        plan: ActionPlan,
        /// 0-100 resolver certainty; command-table hits report 100.
        confidence: u8,
        description: String,
        requires_confirmation: bool,
    },
    NoIntentMatch {
        transcript: String,
    },
    NoTargetFound {
        reasons: String,
    },
}

/// Everything the session controller reacts to. Every suspension point of
/// the async collaborators arrives here as an explicit event.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// User switched the assistant on.
    Activated,
    /// User toggle force-stopping whichever recognizer is active.
    ManualStop,
    Fragment {
        mode: RecognizerMode,
        transcript: Transcript,
    },
    RecognizerEnded {
        mode: RecognizerMode,
    },
    RecognizerError {
        mode: RecognizerMode,
        kind: RecognitionErrorKind,
    },
    DelayElapsed(DelayKind),
    ProcessingFinished(ProcessingOutcome),
    ExecutionFinished {
        success: bool,
    },
    SynthesisEnded {
        id: UtteranceId,
    },
}

/// What the controller asks the driver to do. The controller never touches
/// a collaborator directly.
#[derive(Debug, Clone)]
pub enum Effect {
    StartRecognizer(RecognizerMode),
    StopRecognizer(RecognizerMode),
    /// Routed through the feedback arbiter; may be dropped there.
    Speak(FeedbackUtterance),
    CancelSpeech,
    ScheduleDelay { kind: DelayKind, after_ms: u64 },
    /// Run the interpretation pipeline on a finalized transcript.
    Process { transcript: String },
    Execute { plan: ActionPlan },
    /// Live display of concatenated interim + final fragments.
    ShowTranscript(String),
}
