use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::command::{CommandAction, CommandMatch, CommandRegistry};
use crate::config::EngineConfig;
use crate::error::{EngineError, RecognitionErrorKind};
use crate::exec::{direct_from_params, ActionDispatcher, ActionExecutor, ActionRequest};
use crate::feedback::{FeedbackArbiter, FeedbackUtterance, SpeechCmd};
use crate::intent::IntentClassifier;
use crate::resolver::TargetResolver;
use crate::session::event::{ActionPlan, Effect, ProcessingOutcome, SessionEvent};
use crate::session::SessionController;
use crate::speech::{RecognizerMode, SpeechRecognizer, SpeechSynthesizer};
use crate::surface::{EntityRef, SurfaceProvider, SurfaceScanner};

pub const EVENT_CHANNEL_CAPACITY: usize = 100;

/// The async driver. Owns the event channel and every collaborator; runs the
/// pure session controller and executes the effects it emits. Delayed
/// callbacks, processing results, and execution outcomes all come back
/// through the same channel, so the controller sees a single ordered stream.
pub struct Engine {
    rx: mpsc::Receiver<SessionEvent>,
    tx: mpsc::Sender<SessionEvent>,
    controller: SessionController,
    classifier: IntentClassifier,
    scanner: SurfaceScanner,
    resolver: TargetResolver,
    registry: CommandRegistry,
    arbiter: FeedbackArbiter,
    executor: ActionExecutor,
    recognizer: Arc<dyn SpeechRecognizer>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    surface: Arc<dyn SurfaceProvider>,
    config: EngineConfig,
}

impl Engine {
    /// The channel is created by the caller so collaborators can hold the
    /// sender before the engine exists.
    pub fn new(
        rx: mpsc::Receiver<SessionEvent>,
        tx: mpsc::Sender<SessionEvent>,
        config: EngineConfig,
        registry: CommandRegistry,
        recognizer: Arc<dyn SpeechRecognizer>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        surface: Arc<dyn SurfaceProvider>,
        dispatcher: Arc<dyn ActionDispatcher>,
    ) -> Self {
        let scanner = SurfaceScanner::new(config.min_target_dim);
        let resolver = TargetResolver::new(
            config.weights.clone(),
            config.assistant_markers.clone(),
        );
        let executor = ActionExecutor::new(
            dispatcher,
            Duration::from_millis(config.highlight_delay_ms),
        );
        let controller = SessionController::new(config.clone());
        Self {
            rx,
            tx,
            controller,
            classifier: IntentClassifier::new(),
            scanner,
            resolver,
            registry,
            arbiter: FeedbackArbiter::new(),
            executor,
            recognizer,
            synthesizer,
            surface,
            config,
        }
    }

    /// Collaborators and the surrounding application send events here.
    pub fn sender(&self) -> mpsc::Sender<SessionEvent> {
        self.tx.clone()
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    pub fn arbiter(&self) -> &FeedbackArbiter {
        &self.arbiter
    }

    /// Speaks a page-level welcome under the protected introduction window.
    pub fn announce_intro(&mut self, text: impl Into<String>) {
        let cmd = self.arbiter.begin_intro(FeedbackUtterance::high(text));
        self.run_speech_cmd(cmd);
    }

    pub async fn run(mut self, shutdown: CancellationToken) {
        info!("engine running");
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("engine shutting down");
                    self.synthesizer.cancel();
                    break;
                }
                event = self.rx.recv() => match event {
                    Some(event) => self.dispatch(event).await,
                    None => break,
                },
            }
        }
    }

    /// One event through the controller, then its effects.
    pub async fn dispatch(&mut self, event: SessionEvent) {
        if let SessionEvent::SynthesisEnded { id } = &event {
            self.arbiter.synthesis_ended(*id);
        }
        let effects = self.controller.handle(event);
        self.run_effects(effects).await;
    }

    async fn run_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartRecognizer(mode) => self.start_recognizer(mode),
                Effect::StopRecognizer(mode) => self.recognizer.stop(mode),
                Effect::Speak(utterance) => self.speak(utterance),
                Effect::CancelSpeech => self.synthesizer.cancel(),
                Effect::ScheduleDelay { kind, after_ms } => {
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(Duration::from_millis(after_ms)).await;
                        let _ = tx.send(SessionEvent::DelayElapsed(kind)).await;
                    });
                }
                Effect::Process { transcript } => {
                    let outcome = self.interpret(&transcript);
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        let _ = tx.send(SessionEvent::ProcessingFinished(outcome)).await;
                    });
                }
                Effect::Execute { plan } => {
                    let executor = self.executor.clone();
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        let result = executor.execute(&plan.request).await;
                        if let Err(e) = &result {
                            warn!(error = %e, "action execution failed");
                        }
                        let _ = tx
                            .send(SessionEvent::ExecutionFinished {
                                success: result.is_ok(),
                            })
                            .await;
                    });
                }
                Effect::ShowTranscript(text) => {
                    debug!(%text, "live transcript");
                }
            }
        }
    }

    fn start_recognizer(&mut self, mode: RecognizerMode) {
        if !self.recognizer.available() {
            warn!("speech recognition unavailable, voice control disabled");
            self.report_recognizer_error(mode, RecognitionErrorKind::ServiceUnavailable);
            return;
        }
        if let Err(e) = self.recognizer.start(mode) {
            warn!(?mode, error = %e, "recognizer failed to start");
            let kind = match e {
                EngineError::Recognition(kind) => kind,
                _ => RecognitionErrorKind::Audio,
            };
            self.report_recognizer_error(mode, kind);
        }
    }

    fn report_recognizer_error(&self, mode: RecognizerMode, kind: RecognitionErrorKind) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(SessionEvent::RecognizerError { mode, kind }).await;
        });
    }

    fn speak(&mut self, utterance: FeedbackUtterance) {
        if let Some(cmd) = self.arbiter.request(utterance) {
            self.run_speech_cmd(cmd);
        }
    }

    fn run_speech_cmd(&mut self, cmd: SpeechCmd) {
        let utterance = match cmd {
            SpeechCmd::CancelAndSpeak(u) => {
                self.synthesizer.cancel();
                u
            }
            SpeechCmd::Speak(u) => u,
        };
        if let Err(e) = self.synthesizer.speak(&utterance) {
            warn!(error = %e, "synthesis failed");
            self.arbiter.synthesis_ended(utterance.id);
        }
    }

    /// The interpretation pipeline for one finalized transcript: command
    /// table first, intent classification plus target resolution otherwise.
    pub fn interpret(&self, raw: &str) -> ProcessingOutcome {
        let normalized = self.classifier.normalize(raw);
        if normalized.is_empty() {
            return ProcessingOutcome::NoIntentMatch {
                transcript: raw.to_string(),
            };
        }

        if let Some(matched) = self.registry.lookup(&normalized) {
            return self.plan_from_command(matched);
        }

        let analysis = self.classifier.classify(raw);
        if analysis.target_words.is_empty() {
            return ProcessingOutcome::NoIntentMatch {
                transcript: normalized,
            };
        }

        // Fresh scan per attempt: the surface may have changed since the
        // last command.
        let snapshot = self.scanner.scan(self.surface.as_ref());
        match self.resolver.resolve(&analysis, &normalized, &snapshot) {
            Ok(resolution) => {
                let label = resolution.candidate.entity.text.clone();
                ProcessingOutcome::Resolved {
                    plan: ActionPlan {
                        request: ActionRequest::ActivateTarget {
                            target: resolution.candidate.entity.reference,
                        },
                        announce: format!("Selecting {}.", label),
                    },
                    confidence: resolution.confidence,
                    description: format!("select {}", label),
                    requires_confirmation: false,
                }
            }
            Err(EngineError::NoTargetFound { reasons }) => {
                ProcessingOutcome::NoTargetFound { reasons }
            }
            Err(_) => ProcessingOutcome::NoIntentMatch {
                transcript: normalized,
            },
        }
    }

    fn plan_from_command(&self, matched: CommandMatch) -> ProcessingOutcome {
        let definition = &matched.definition;
        let request = match definition.action {
            CommandAction::Activate => {
                let query = match self.slot_value(&matched) {
                    Some(q) => q,
                    None => {
                        return ProcessingOutcome::NoIntentMatch {
                            transcript: definition.description.clone(),
                        }
                    }
                };
                match self.find_by_text(&query) {
                    Some(target) => ActionRequest::ActivateTarget { target },
                    None => {
                        return ProcessingOutcome::NoTargetFound {
                            reasons: format!("nothing on screen is labeled \"{}\"", query),
                        }
                    }
                }
            }
            CommandAction::Focus => {
                let query = match self.slot_value(&matched) {
                    Some(q) => q,
                    None => {
                        return ProcessingOutcome::NoIntentMatch {
                            transcript: definition.description.clone(),
                        }
                    }
                };
                let target = match self.find_by_text(&query) {
                    Some(t) => t,
                    None => {
                        return ProcessingOutcome::NoTargetFound {
                            reasons: format!("nothing on screen is labeled \"{}\"", query),
                        }
                    }
                };
                match direct_from_params(definition.action, &matched.params, Some(target)) {
                    Some(direct) => ActionRequest::Direct(direct),
                    None => {
                        return ProcessingOutcome::NoIntentMatch {
                            transcript: definition.description.clone(),
                        }
                    }
                }
            }
            _ => match direct_from_params(definition.action, &matched.params, None) {
                Some(direct) => ActionRequest::Direct(direct),
                None => {
                    return ProcessingOutcome::NoIntentMatch {
                        transcript: definition.description.clone(),
                    }
                }
            },
        };

        ProcessingOutcome::Resolved {
            plan: ActionPlan {
                request,
                announce: format!("Okay, I'll {}.", definition.description),
            },
            confidence: 100,
            description: definition.description.clone(),
            requires_confirmation: definition.requires_confirmation
                && self.config.confirmation_required,
        }
    }

    fn slot_value(&self, matched: &CommandMatch) -> Option<String> {
        matched
            .definition
            .slots
            .first()
            .and_then(|slot| matched.params.get(slot))
            .cloned()
    }

    /// First clickable entity whose label contains the query. Used by the
    /// command-table variant, which skips full scoring.
    fn find_by_text(&self, query: &str) -> Option<EntityRef> {
        let query = query.to_lowercase();
        let snapshot = self.scanner.scan(self.surface.as_ref());
        snapshot
            .entities
            .iter()
            .find(|e| e.clickable && e.text.to_lowercase().contains(&query))
            .map(|e| e.reference)
    }
}
