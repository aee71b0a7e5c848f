//! Demo harness: drives the engine with stdin lines standing in for
//! recognized speech. Type a wake phrase ("hey nullistant"), then a command
//! ("go back", "scroll down", ...). Actions and speech are printed.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use nullistant::command::CommandRegistry;
use nullistant::config::EngineConfig;
use nullistant::error::EngineError;
use nullistant::exec::{ActionDispatcher, DispatchError, ScrollDirection};
use nullistant::feedback::FeedbackUtterance;
use nullistant::session::SessionEvent;
use nullistant::speech::{RecognizerMode, SpeechRecognizer, SpeechSynthesizer, Transcript};
use nullistant::surface::{EntityRef, RawEntity, Rect, Role, SurfaceProvider, Viewport};
use nullistant::Engine;

/// Stdin-backed recognizer: one line is one finalized transcript for
/// whichever mode is currently active.
struct StdinRecognizer {
    events: mpsc::Sender<SessionEvent>,
    lines: Arc<tokio::sync::Mutex<mpsc::Receiver<String>>>,
    active: Arc<Mutex<Option<RecognizerMode>>>,
}

impl SpeechRecognizer for StdinRecognizer {
    fn available(&self) -> bool {
        true
    }

    fn start(&self, mode: RecognizerMode) -> Result<(), EngineError> {
        *self.active.lock().unwrap() = Some(mode);
        let events = self.events.clone();
        let lines = self.lines.clone();
        let active = self.active.clone();
        tokio::spawn(async move {
            let line = { lines.lock().await.recv().await };
            let Some(line) = line else { return };
            if *active.lock().unwrap() != Some(mode) {
                return;
            }
            *active.lock().unwrap() = None;
            let _ = events
                .send(SessionEvent::Fragment {
                    mode,
                    transcript: Transcript {
                        text: line,
                        is_final: true,
                        confidence: 0.92,
                    },
                })
                .await;
            let _ = events.send(SessionEvent::RecognizerEnded { mode }).await;
        });
        Ok(())
    }

    fn stop(&self, mode: RecognizerMode) {
        let mut active = self.active.lock().unwrap();
        if *active == Some(mode) {
            *active = None;
        }
    }
}

/// Prints utterances and reports completion after a short simulated
/// speaking time.
struct PrintSynthesizer {
    events: mpsc::Sender<SessionEvent>,
}

impl SpeechSynthesizer for PrintSynthesizer {
    fn available(&self) -> bool {
        true
    }

    fn speak(&self, utterance: &FeedbackUtterance) -> Result<(), EngineError> {
        println!("[speak {:?}] {}", utterance.priority, utterance.text);
        let events = self.events.clone();
        let id = utterance.id;
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            let _ = events.send(SessionEvent::SynthesisEnded { id }).await;
        });
        Ok(())
    }

    fn cancel(&self) {
        println!("[speak] (cancelled)");
    }
}

/// A fixed demo page plus the assistant's own bottom strip.
struct DemoSurface;

impl SurfaceProvider for DemoSurface {
    fn viewport(&self) -> Viewport {
        Viewport {
            width: 1280.0,
            height: 800.0,
        }
    }

    fn scan(&self) -> Vec<RawEntity> {
        let button = |id: u64, text: &str, x: f32, y: f32| RawEntity {
            reference: EntityRef(id),
            text: text.to_string(),
            role: Role::Button,
            interactive_role_attr: false,
            has_click_handler: true,
            pointer_cursor: true,
            hoverable: false,
            visible: true,
            bounds: Rect {
                x,
                y,
                width: 180.0,
                height: 48.0,
            },
            emergency_styled: false,
            assistant_owned: false,
        };

        let mut emergency = button(3, "Emergency – Call 911", 20.0, 200.0);
        emergency.emergency_styled = true;

        let mut assistant_strip = button(6, "Nullistant is listening…", 400.0, 740.0);
        assistant_strip.assistant_owned = true;

        vec![
            button(1, "← Back to Menu", 20.0, 20.0),
            button(2, "Call Doctor", 20.0, 120.0),
            emergency,
            RawEntity {
                reference: EntityRef(4),
                text: "Read Article".to_string(),
                role: Role::Link,
                interactive_role_attr: false,
                has_click_handler: false,
                pointer_cursor: true,
                hoverable: false,
                visible: true,
                bounds: Rect {
                    x: 300.0,
                    y: 120.0,
                    width: 140.0,
                    height: 24.0,
                },
                emergency_styled: false,
                assistant_owned: false,
            },
            RawEntity {
                reference: EntityRef(5),
                text: "Search".to_string(),
                role: Role::Input,
                interactive_role_attr: false,
                has_click_handler: false,
                pointer_cursor: false,
                hoverable: false,
                visible: true,
                bounds: Rect {
                    x: 300.0,
                    y: 20.0,
                    width: 240.0,
                    height: 36.0,
                },
                emergency_styled: false,
                assistant_owned: false,
            },
            assistant_strip,
        ]
    }
}

struct PrintDispatcher;

impl ActionDispatcher for PrintDispatcher {
    fn highlight(&self, target: EntityRef) -> Result<(), DispatchError> {
        println!("[ui] highlight {:?}", target);
        Ok(())
    }
    fn clear_highlight(&self, target: EntityRef) -> Result<(), DispatchError> {
        println!("[ui] clear highlight {:?}", target);
        Ok(())
    }
    fn scroll_into_view(&self, target: EntityRef) -> Result<(), DispatchError> {
        println!("[ui] scroll {:?} into view", target);
        Ok(())
    }
    fn click(&self, target: EntityRef) -> Result<(), DispatchError> {
        println!("[ui] click {:?}", target);
        Ok(())
    }
    fn focus(&self, target: EntityRef) -> Result<(), DispatchError> {
        println!("[ui] focus {:?}", target);
        Ok(())
    }
    fn scroll(&self, direction: ScrollDirection, amount: f32) -> Result<(), DispatchError> {
        println!("[ui] scroll {:?} by {}", direction, amount);
        Ok(())
    }
    fn navigate(&self, destination: &str) -> Result<(), DispatchError> {
        println!("[ui] navigate to {}", destination);
        Ok(())
    }
    fn keypress(&self, key: &str) -> Result<(), DispatchError> {
        println!("[ui] keypress {}", key);
        Ok(())
    }
    fn type_text(&self, text: &str) -> Result<(), DispatchError> {
        println!("[ui] type \"{}\"", text);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let (line_tx, line_rx) = mpsc::channel::<String>(16);

    // Stdin pump: every line becomes one recognized utterance.
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if line_tx.send(line).await.is_err() {
                break;
            }
        }
    });

    let (events, rx) = mpsc::channel(nullistant::engine::EVENT_CHANNEL_CAPACITY);
    let recognizer = Arc::new(StdinRecognizer {
        events: events.clone(),
        lines: Arc::new(tokio::sync::Mutex::new(line_rx)),
        active: Arc::new(Mutex::new(None)),
    });
    let synthesizer = Arc::new(PrintSynthesizer {
        events: events.clone(),
    });

    let mut engine = Engine::new(
        rx,
        events.clone(),
        EngineConfig::default(),
        CommandRegistry::with_defaults(),
        recognizer,
        synthesizer,
        Arc::new(DemoSurface),
        Arc::new(PrintDispatcher),
    );

    engine.announce_intro("Welcome. Say hey nullistant, then a command.");
    events.send(SessionEvent::Activated).await?;

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        signal_token.cancel();
    });

    engine.run(shutdown).await;
    Ok(())
}
