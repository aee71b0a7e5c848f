use nullistant::config::EngineConfig;
use nullistant::error::RecognitionErrorKind;
use nullistant::exec::{ActionRequest, DirectAction};
use nullistant::session::event::{ActionPlan, DelayKind, Effect, ProcessingOutcome, SessionEvent};
use nullistant::session::{CommandHistory, SessionController, SessionState};
use nullistant::speech::{RecognizerMode, Transcript};

fn controller() -> SessionController {
    SessionController::new(EngineConfig::default())
}

fn fragment(mode: RecognizerMode, text: &str, is_final: bool) -> SessionEvent {
    SessionEvent::Fragment {
        mode,
        transcript: Transcript {
            text: text.to_string(),
            is_final,
            confidence: 0.9,
        },
    }
}

fn plan(announce: &str) -> ActionPlan {
    ActionPlan {
        request: ActionRequest::Direct(DirectAction::Navigate {
            destination: "home".to_string(),
        }),
        announce: announce.to_string(),
    }
}

/// Drives an activated controller through wake → command capture.
fn capture_command(ctl: &mut SessionController, text: &str) {
    ctl.handle(fragment(RecognizerMode::Wake, "hey nullistant", false));
    ctl.handle(SessionEvent::DelayElapsed(DelayKind::WakeToCommand));
    ctl.handle(fragment(RecognizerMode::Command, text, true));
    ctl.handle(SessionEvent::RecognizerEnded {
        mode: RecognizerMode::Command,
    });
}

#[test]
fn activation_starts_wake_listening() {
    let mut ctl = controller();
    let effects = ctl.handle(SessionEvent::Activated);
    assert_eq!(ctl.state(), SessionState::WakeListening);
    assert!(matches!(
        effects[..],
        [Effect::StartRecognizer(RecognizerMode::Wake)]
    ));
}

#[test]
fn activation_is_idempotent_outside_idle() {
    let mut ctl = controller();
    ctl.handle(SessionEvent::Activated);
    let effects = ctl.handle(SessionEvent::Activated);
    assert!(effects.is_empty());
}

#[test]
fn interim_wake_fragment_triggers_command_listening_after_pause() {
    let mut ctl = controller();
    ctl.handle(SessionEvent::Activated);

    let effects = ctl.handle(fragment(RecognizerMode::Wake, "hey nullistant please", false));
    assert_eq!(ctl.state(), SessionState::CommandListening);
    assert!(matches!(effects[0], Effect::StopRecognizer(RecognizerMode::Wake)));
    assert!(matches!(
        effects[1],
        Effect::ScheduleDelay {
            kind: DelayKind::WakeToCommand,
            after_ms: 500
        }
    ));

    // The command recognizer only starts once the pause elapses.
    let effects = ctl.handle(SessionEvent::DelayElapsed(DelayKind::WakeToCommand));
    assert!(matches!(
        effects[..],
        [Effect::StartRecognizer(RecognizerMode::Command)]
    ));
}

#[test]
fn non_wake_speech_is_ignored() {
    let mut ctl = controller();
    ctl.handle(SessionEvent::Activated);
    let effects = ctl.handle(fragment(RecognizerMode::Wake, "just chatting", true));
    assert!(effects.is_empty());
    assert_eq!(ctl.state(), SessionState::WakeListening);
}

#[test]
fn captured_command_moves_to_processing() {
    let mut ctl = controller();
    ctl.handle(SessionEvent::Activated);
    capture_command(&mut ctl, "go back");

    assert_eq!(ctl.state(), SessionState::Processing);
    assert_eq!(ctl.last_command(), Some("go back"));
    assert_eq!(ctl.history().len(), 1);
}

#[test]
fn empty_capture_returns_to_wake_listening() {
    let mut ctl = controller();
    ctl.handle(SessionEvent::Activated);
    ctl.handle(fragment(RecognizerMode::Wake, "hey nullistant", false));
    ctl.handle(SessionEvent::DelayElapsed(DelayKind::WakeToCommand));
    let effects = ctl.handle(SessionEvent::RecognizerEnded {
        mode: RecognizerMode::Command,
    });

    assert_eq!(ctl.state(), SessionState::WakeListening);
    assert!(matches!(
        effects[..],
        [Effect::StartRecognizer(RecognizerMode::Wake)]
    ));
}

#[test]
fn fragments_concatenate_for_live_display() {
    let mut ctl = controller();
    ctl.handle(SessionEvent::Activated);
    ctl.handle(fragment(RecognizerMode::Wake, "hey nullistant", false));
    ctl.handle(SessionEvent::DelayElapsed(DelayKind::WakeToCommand));

    ctl.handle(fragment(RecognizerMode::Command, "go", true));
    let effects = ctl.handle(fragment(RecognizerMode::Command, "back", false));
    match &effects[..] {
        [Effect::ShowTranscript(text)] => assert_eq!(text, "go back"),
        other => panic!("expected live transcript, got {other:?}"),
    }
}

#[test]
fn successful_processing_executes_and_settles_back() {
    let mut ctl = controller();
    ctl.handle(SessionEvent::Activated);
    capture_command(&mut ctl, "go home");

    let effects = ctl.handle(SessionEvent::ProcessingFinished(
        ProcessingOutcome::Resolved {
            plan: plan("Going home."),
            confidence: 90,
            description: "go home".to_string(),
            requires_confirmation: false,
        },
    ));
    assert_eq!(ctl.state(), SessionState::Processing);
    assert!(effects.iter().any(|e| matches!(e, Effect::Execute { .. })));
    assert!(effects.iter().any(|e| matches!(
        e,
        Effect::ScheduleDelay {
            kind: DelayKind::Settle,
            after_ms: 2000
        }
    )));

    let effects = ctl.handle(SessionEvent::DelayElapsed(DelayKind::Settle));
    assert_eq!(ctl.state(), SessionState::WakeListening);
    assert!(matches!(
        effects[..],
        [Effect::StartRecognizer(RecognizerMode::Wake)]
    ));
}

#[test]
fn failed_resolution_speaks_and_settles_back() {
    let mut ctl = controller();
    ctl.handle(SessionEvent::Activated);
    capture_command(&mut ctl, "nonsense");

    let effects = ctl.handle(SessionEvent::ProcessingFinished(
        ProcessingOutcome::NoTargetFound {
            reasons: "nothing matched".to_string(),
        },
    ));
    assert!(effects.iter().any(|e| matches!(e, Effect::Speak(_))));
    assert!(!effects.iter().any(|e| matches!(e, Effect::Execute { .. })));

    ctl.handle(SessionEvent::DelayElapsed(DelayKind::Settle));
    assert_eq!(ctl.state(), SessionState::WakeListening);
}

#[test]
fn manual_stop_of_wake_listening_goes_fully_silent() {
    let mut ctl = controller();
    ctl.handle(SessionEvent::Activated);
    let effects = ctl.handle(SessionEvent::ManualStop);

    assert_eq!(ctl.state(), SessionState::Idle);
    assert!(matches!(
        effects[..],
        [
            Effect::StopRecognizer(RecognizerMode::Wake),
            Effect::CancelSpeech
        ]
    ));

    // A stale restart callback must not revive listening.
    let effects = ctl.handle(SessionEvent::DelayElapsed(DelayKind::RecognizerRestart(
        RecognizerMode::Wake,
    )));
    assert!(effects.is_empty());
    assert_eq!(ctl.state(), SessionState::Idle);
}

#[test]
fn wake_end_of_session_restarts_with_short_delay() {
    let mut ctl = controller();
    ctl.handle(SessionEvent::Activated);
    let effects = ctl.handle(SessionEvent::RecognizerEnded {
        mode: RecognizerMode::Wake,
    });
    assert!(matches!(
        effects[..],
        [Effect::ScheduleDelay {
            kind: DelayKind::RecognizerRestart(RecognizerMode::Wake),
            after_ms: 250
        }]
    ));
}

#[test]
fn transient_errors_back_off_exponentially() {
    let mut ctl = controller();
    ctl.handle(SessionEvent::Activated);

    let effects = ctl.handle(SessionEvent::RecognizerError {
        mode: RecognizerMode::Wake,
        kind: RecognitionErrorKind::Network,
    });
    assert!(matches!(
        effects[..],
        [Effect::ScheduleDelay { after_ms: 300, .. }]
    ));

    let effects = ctl.handle(SessionEvent::RecognizerError {
        mode: RecognizerMode::Wake,
        kind: RecognitionErrorKind::Audio,
    });
    assert!(matches!(
        effects[..],
        [Effect::ScheduleDelay { after_ms: 600, .. }]
    ));

    // A successful fragment resets the streak.
    ctl.handle(fragment(RecognizerMode::Wake, "anything", false));
    let effects = ctl.handle(SessionEvent::RecognizerError {
        mode: RecognizerMode::Wake,
        kind: RecognitionErrorKind::Audio,
    });
    assert!(matches!(
        effects[..],
        [Effect::ScheduleDelay { after_ms: 300, .. }]
    ));
}

#[test]
fn permission_denied_silences_the_session() {
    let mut ctl = controller();
    ctl.handle(SessionEvent::Activated);
    let effects = ctl.handle(SessionEvent::RecognizerError {
        mode: RecognizerMode::Wake,
        kind: RecognitionErrorKind::PermissionDenied,
    });

    assert_eq!(ctl.state(), SessionState::Idle);
    assert!(effects.iter().any(|e| matches!(e, Effect::Speak(_))));
    assert!(!effects
        .iter()
        .any(|e| matches!(e, Effect::ScheduleDelay { .. })));
}

#[test]
fn failed_execution_apologizes_but_continues() {
    let mut ctl = controller();
    ctl.handle(SessionEvent::Activated);
    let effects = ctl.handle(SessionEvent::ExecutionFinished { success: false });
    assert!(effects.iter().any(|e| matches!(e, Effect::Speak(_))));
    // The session keeps functioning; no state disruption.
    assert_eq!(ctl.state(), SessionState::WakeListening);
}

#[test]
fn history_never_exceeds_capacity() {
    let config = EngineConfig {
        history_capacity: 3,
        ..EngineConfig::default()
    };
    let mut ctl = SessionController::new(config);
    ctl.handle(SessionEvent::Activated);

    for i in 0..10 {
        capture_command(&mut ctl, &format!("command {i}"));
        ctl.handle(SessionEvent::ProcessingFinished(
            ProcessingOutcome::NoIntentMatch {
                transcript: format!("command {i}"),
            },
        ));
        ctl.handle(SessionEvent::DelayElapsed(DelayKind::Settle));
    }

    assert_eq!(ctl.history().len(), 3);
    assert_eq!(ctl.last_command(), Some("command 9"));
    assert_eq!(ctl.history().latest().map(String::as_str), Some("command 9"));
}

#[test]
fn history_evicts_oldest_first() {
    let mut history = CommandHistory::new(2);
    history.push("a".into());
    history.push("b".into());
    history.push("c".into());
    let entries: Vec<&String> = history.iter().collect();
    assert_eq!(entries, [&"b".to_string(), &"c".to_string()]);
}
