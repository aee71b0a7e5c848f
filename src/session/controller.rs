use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::RecognitionErrorKind;
use crate::feedback::FeedbackUtterance;
use crate::speech::{RecognizerMode, Transcript};

use super::event::{DelayKind, Effect, ProcessingOutcome, SessionEvent};
use super::state::{CommandHistory, PendingAction, SessionState};

const POSITIVE_LEXICON: &[&str] = &["yes", "confirm", "do it", "proceed", "ok", "okay"];
const NEGATIVE_LEXICON: &[&str] = &["no", "cancel", "never mind", "stop", "abort"];

/// The session state machine. Pure: consumes one event, mutates owned state,
/// returns the effects the driver must execute. Never awaits, never touches
/// a collaborator. Sole authority over starting and stopping recognizers,
/// so at most one listening session exists at a time.
pub struct SessionController {
    config: EngineConfig,
    state: SessionState,
    pending: Option<PendingAction>,
    history: CommandHistory,
    last_command: Option<String>,
    /// Finalized command fragments accumulated during one listening session.
    final_text: String,
    wake_error_streak: u32,
    command_error_streak: u32,
}

impl SessionController {
    pub fn new(config: EngineConfig) -> Self {
        let history = CommandHistory::new(config.history_capacity);
        Self {
            config,
            state: SessionState::Idle,
            pending: None,
            history,
            last_command: None,
            final_text: String::new(),
            wake_error_streak: 0,
            command_error_streak: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn pending(&self) -> Option<&PendingAction> {
        self.pending.as_ref()
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn last_command(&self) -> Option<&str> {
        self.last_command.as_deref()
    }

    /// One step of the machine.
    pub fn handle(&mut self, event: SessionEvent) -> Vec<Effect> {
        let effects = match event {
            SessionEvent::Activated => self.on_activated(),
            SessionEvent::ManualStop => self.on_manual_stop(),
            SessionEvent::Fragment { mode, transcript } => self.on_fragment(mode, transcript),
            SessionEvent::RecognizerEnded { mode } => self.on_recognizer_ended(mode),
            SessionEvent::RecognizerError { mode, kind } => self.on_recognizer_error(mode, kind),
            SessionEvent::DelayElapsed(kind) => self.on_delay_elapsed(kind),
            SessionEvent::ProcessingFinished(outcome) => self.on_processing_finished(outcome),
            SessionEvent::ExecutionFinished { success } => self.on_execution_finished(success),
            // Synthesis completion only matters to the feedback arbiter.
            SessionEvent::SynthesisEnded { .. } => vec![],
        };

        debug_assert_eq!(
            self.state == SessionState::AwaitingConfirmation,
            self.pending.is_some(),
            "pending action exists iff awaiting confirmation"
        );
        effects
    }

    fn on_activated(&mut self) -> Vec<Effect> {
        if self.state != SessionState::Idle {
            return vec![];
        }
        info!("session activated, wake listening");
        self.state = SessionState::WakeListening;
        vec![Effect::StartRecognizer(RecognizerMode::Wake)]
    }

    /// User toggle. Stopping wake listening goes fully silent rather than
    /// looping back.
    fn on_manual_stop(&mut self) -> Vec<Effect> {
        let effects = match self.state {
            SessionState::Idle => vec![],
            SessionState::WakeListening => vec![
                Effect::StopRecognizer(RecognizerMode::Wake),
                Effect::CancelSpeech,
            ],
            SessionState::CommandListening | SessionState::AwaitingConfirmation => vec![
                Effect::StopRecognizer(RecognizerMode::Command),
                Effect::CancelSpeech,
            ],
            SessionState::Processing => vec![Effect::CancelSpeech],
        };
        if self.state != SessionState::Idle {
            info!(from = ?self.state, "manual stop, going silent");
        }
        self.state = SessionState::Idle;
        self.pending = None;
        self.final_text.clear();
        effects
    }

    fn on_fragment(&mut self, mode: RecognizerMode, transcript: Transcript) -> Vec<Effect> {
        match mode {
            RecognizerMode::Wake => {
                self.wake_error_streak = 0;
                self.on_wake_fragment(&transcript)
            }
            RecognizerMode::Command => {
                self.command_error_streak = 0;
                self.on_command_fragment(transcript)
            }
        }
    }

    /// Interim and final fragments both count for wake detection.
    fn on_wake_fragment(&mut self, transcript: &Transcript) -> Vec<Effect> {
        if self.state != SessionState::WakeListening {
            return vec![];
        }
        let text = transcript.text.to_lowercase();
        if !self.config.wake_phrases.iter().any(|p| text.contains(p)) {
            return vec![];
        }

        info!("wake phrase detected");
        self.state = SessionState::CommandListening;
        self.final_text.clear();
        vec![
            Effect::StopRecognizer(RecognizerMode::Wake),
            Effect::ScheduleDelay {
                kind: DelayKind::WakeToCommand,
                after_ms: self.config.wake_pause_ms,
            },
        ]
    }

    fn on_command_fragment(&mut self, transcript: Transcript) -> Vec<Effect> {
        match self.state {
            SessionState::CommandListening => {
                let display = if transcript.is_final {
                    if !self.final_text.is_empty() {
                        self.final_text.push(' ');
                    }
                    self.final_text.push_str(transcript.text.trim());
                    self.final_text.clone()
                } else if self.final_text.is_empty() {
                    transcript.text.clone()
                } else {
                    format!("{} {}", self.final_text, transcript.text)
                };
                vec![Effect::ShowTranscript(display)]
            }
            SessionState::AwaitingConfirmation if transcript.is_final => {
                self.on_confirmation_reply(&transcript.text)
            }
            _ => vec![],
        }
    }

    fn on_confirmation_reply(&mut self, text: &str) -> Vec<Effect> {
        let text = text.trim().to_lowercase();

        if lexicon_match(&text, POSITIVE_LEXICON) {
            // Invariant: pending must exist in this state.
            let Some(pending) = self.pending.take() else {
                warn!("awaiting confirmation with no pending action");
                self.state = SessionState::WakeListening;
                return vec![Effect::StartRecognizer(RecognizerMode::Wake)];
            };
            info!(action = %pending.description, "confirmed, executing");
            self.state = SessionState::WakeListening;
            return vec![
                Effect::StopRecognizer(RecognizerMode::Command),
                Effect::Speak(FeedbackUtterance::high(format!(
                    "Okay. {}",
                    pending.plan.announce
                ))),
                Effect::Execute { plan: pending.plan },
                Effect::StartRecognizer(RecognizerMode::Wake),
            ];
        }

        if lexicon_match(&text, NEGATIVE_LEXICON) {
            info!("confirmation declined, discarding pending action");
            self.pending = None;
            self.state = SessionState::WakeListening;
            return vec![
                Effect::StopRecognizer(RecognizerMode::Command),
                Effect::Speak(FeedbackUtterance::high("Cancelled.")),
                Effect::StartRecognizer(RecognizerMode::Wake),
            ];
        }

        // Anything else re-prompts without changing state; the recognizer
        // restart rides on its end-of-session event.
        vec![Effect::Speak(FeedbackUtterance::high(
            "Please say yes to confirm, or no to cancel.",
        ))]
    }

    fn on_recognizer_ended(&mut self, mode: RecognizerMode) -> Vec<Effect> {
        match (mode, self.state) {
            // Continuous wake recognition ends periodically; restart it via a
            // short delayed callback rather than immediately.
            (RecognizerMode::Wake, SessionState::WakeListening) => vec![Effect::ScheduleDelay {
                kind: DelayKind::RecognizerRestart(RecognizerMode::Wake),
                after_ms: self.config.restart_delay_ms,
            }],
            (RecognizerMode::Command, SessionState::CommandListening) => {
                let transcript = std::mem::take(&mut self.final_text).trim().to_string();
                if transcript.is_empty() {
                    debug!("command listening ended with nothing, back to wake");
                    self.state = SessionState::WakeListening;
                    vec![Effect::StartRecognizer(RecognizerMode::Wake)]
                } else {
                    info!(%transcript, "command captured");
                    self.state = SessionState::Processing;
                    self.last_command = Some(transcript.clone());
                    self.history.push(transcript.clone());
                    vec![Effect::Process { transcript }]
                }
            }
            // Still waiting for a yes/no; keep listening. There is no
            // timeout on confirmation, deliberately.
            (RecognizerMode::Command, SessionState::AwaitingConfirmation) => {
                vec![Effect::ScheduleDelay {
                    kind: DelayKind::RecognizerRestart(RecognizerMode::Command),
                    after_ms: self.config.restart_delay_ms,
                }]
            }
            _ => vec![],
        }
    }

    fn on_recognizer_error(
        &mut self,
        mode: RecognizerMode,
        kind: RecognitionErrorKind,
    ) -> Vec<Effect> {
        if !kind.is_transient() {
            warn!(?mode, ?kind, "fatal recognition error, session silenced");
            self.state = SessionState::Idle;
            self.pending = None;
            self.final_text.clear();
            let message = match kind {
                RecognitionErrorKind::PermissionDenied => {
                    "Microphone access was denied. Voice control is paused until access is restored."
                }
                _ => "Speech recognition is not available right now.",
            };
            return vec![Effect::Speak(FeedbackUtterance::high(message))];
        }

        if !self.mode_matches_state(mode) {
            return vec![];
        }

        let streak = match mode {
            RecognizerMode::Wake => {
                self.wake_error_streak += 1;
                self.wake_error_streak
            }
            RecognizerMode::Command => {
                self.command_error_streak += 1;
                self.command_error_streak
            }
        };
        let backoff = self.config.backoff_base_ms * (1 << (streak - 1).min(4));
        warn!(?mode, ?kind, backoff_ms = backoff, "transient recognition error, restarting");
        vec![Effect::ScheduleDelay {
            kind: DelayKind::RecognizerRestart(mode),
            after_ms: backoff,
        }]
    }

    fn on_delay_elapsed(&mut self, kind: DelayKind) -> Vec<Effect> {
        match kind {
            DelayKind::WakeToCommand => {
                if self.state == SessionState::CommandListening {
                    vec![Effect::StartRecognizer(RecognizerMode::Command)]
                } else {
                    vec![]
                }
            }
            DelayKind::Settle => {
                // Only Processing settles back to passive listening. An
                // AwaitingConfirmation session waits indefinitely.
                if self.state == SessionState::Processing {
                    self.state = SessionState::WakeListening;
                    vec![Effect::StartRecognizer(RecognizerMode::Wake)]
                } else {
                    vec![]
                }
            }
            DelayKind::RecognizerRestart(mode) => {
                if self.mode_matches_state(mode) {
                    vec![Effect::StartRecognizer(mode)]
                } else {
                    vec![]
                }
            }
        }
    }

    fn on_processing_finished(&mut self, outcome: ProcessingOutcome) -> Vec<Effect> {
        if self.state != SessionState::Processing {
            return vec![];
        }

        let settle = Effect::ScheduleDelay {
            kind: DelayKind::Settle,
            after_ms: self.config.settle_delay_ms,
        };

        match outcome {
            ProcessingOutcome::Resolved {
                plan,
                confidence,
                description,
                requires_confirmation,
            } => {
                if requires_confirmation {
                    info!(%description, confidence, "holding action for confirmation");
                    self.state = SessionState::AwaitingConfirmation;
                    let prompt = format!("Did you want to {}? Say yes or no.", description);
                    self.pending = Some(PendingAction { plan, description });
                    vec![
                        Effect::Speak(FeedbackUtterance::high(prompt)),
                        Effect::StartRecognizer(RecognizerMode::Command),
                    ]
                } else {
                    info!(%description, confidence, "executing");
                    vec![
                        Effect::Speak(FeedbackUtterance::high(plan.announce.clone())),
                        Effect::Execute { plan },
                        settle,
                    ]
                }
            }
            ProcessingOutcome::NoIntentMatch { transcript } => {
                warn!(%transcript, "no intent matched");
                vec![
                    Effect::Speak(FeedbackUtterance::high(
                        "Sorry, I didn't catch a command. Please try again.",
                    )),
                    settle,
                ]
            }
            ProcessingOutcome::NoTargetFound { reasons } => {
                info!(%reasons, "no target found");
                vec![
                    Effect::Speak(FeedbackUtterance::high(format!(
                        "I couldn't find that on the screen. {}",
                        reasons
                    ))),
                    settle,
                ]
            }
        }
    }

    fn on_execution_finished(&mut self, success: bool) -> Vec<Effect> {
        if success {
            vec![]
        } else {
            vec![Effect::Speak(FeedbackUtterance::high(
                "Sorry, I wasn't able to do that.",
            ))]
        }
    }

    fn mode_matches_state(&self, mode: RecognizerMode) -> bool {
        match mode {
            RecognizerMode::Wake => self.state == SessionState::WakeListening,
            RecognizerMode::Command => matches!(
                self.state,
                SessionState::CommandListening | SessionState::AwaitingConfirmation
            ),
        }
    }
}

/// Single-word lexemes match whole tokens; multi-word phrases match as
/// substrings. Plain containment would let "no" hide inside "know".
fn lexicon_match(text: &str, lexicon: &[&str]) -> bool {
    let tokens: Vec<&str> = text
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .collect();
    lexicon.iter().any(|phrase| {
        if phrase.contains(' ') {
            text.contains(phrase)
        } else {
            tokens.contains(phrase)
        }
    })
}
