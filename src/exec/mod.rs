use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::surface::EntityRef;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// The target vanished between scan and dispatch. The surface is live
    /// and unlocked, so this is expected; the executor no-ops.
    #[error("target no longer present")]
    Gone,
    #[error("dispatch failed: {0}")]
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollDirection {
    Up,
    Down,
}

/// The UI layer's effect-invocation capability.
pub trait ActionDispatcher: Send + Sync {
    fn highlight(&self, target: EntityRef) -> Result<(), DispatchError>;
    fn clear_highlight(&self, target: EntityRef) -> Result<(), DispatchError>;
    fn scroll_into_view(&self, target: EntityRef) -> Result<(), DispatchError>;
    fn click(&self, target: EntityRef) -> Result<(), DispatchError>;
    fn focus(&self, target: EntityRef) -> Result<(), DispatchError>;
    fn scroll(&self, direction: ScrollDirection, amount: f32) -> Result<(), DispatchError>;
    fn navigate(&self, destination: &str) -> Result<(), DispatchError>;
    fn keypress(&self, key: &str) -> Result<(), DispatchError>;
    fn type_text(&self, text: &str) -> Result<(), DispatchError>;
}

/// An effect that runs immediately, with no highlight phase.
#[derive(Debug, Clone, PartialEq)]
pub enum DirectAction {
    Scroll { direction: ScrollDirection, amount: f32 },
    Navigate { destination: String },
    Focus { target: EntityRef },
    Type { text: String },
    Keypress { key: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionRequest {
    /// Resolved on-screen target: highlight, wait, then activate.
    ActivateTarget { target: EntityRef },
    Direct(DirectAction),
}

/// Executes accepted actions against the dispatcher.
#[derive(Clone)]
pub struct ActionExecutor {
    dispatcher: Arc<dyn ActionDispatcher>,
    highlight_delay: Duration,
}

impl ActionExecutor {
    pub fn new(dispatcher: Arc<dyn ActionDispatcher>, highlight_delay: Duration) -> Self {
        Self {
            dispatcher,
            highlight_delay,
        }
    }

    /// Runs one action. A vanished target is a graceful no-op; any other
    /// dispatch failure surfaces to the caller.
    pub async fn execute(&self, request: &ActionRequest) -> Result<(), DispatchError> {
        match request {
            ActionRequest::ActivateTarget { target } => self.activate(*target).await,
            ActionRequest::Direct(action) => self.direct(action),
        }
    }

    /// Highlight, bring into view, hold so the user sees what is about to
    /// happen, then invoke and clear. The hold is a usability affordance,
    /// not incidental latency.
    async fn activate(&self, target: EntityRef) -> Result<(), DispatchError> {
        match self.dispatcher.highlight(target) {
            Ok(()) => {}
            Err(DispatchError::Gone) => {
                warn!(?target, "target vanished before highlight");
                return Ok(());
            }
            Err(e) => return Err(e),
        }
        if let Err(e) = self.dispatcher.scroll_into_view(target) {
            debug!(?target, error = %e, "scroll_into_view failed, continuing");
        }

        tokio::time::sleep(self.highlight_delay).await;

        let result = self.dispatcher.click(target);
        let _ = self.dispatcher.clear_highlight(target);

        match result {
            Err(DispatchError::Gone) => {
                warn!(?target, "target vanished before click");
                Ok(())
            }
            other => other,
        }
    }

    fn direct(&self, action: &DirectAction) -> Result<(), DispatchError> {
        let result = match action {
            DirectAction::Scroll { direction, amount } => {
                self.dispatcher.scroll(*direction, *amount)
            }
            DirectAction::Navigate { destination } => self.dispatcher.navigate(destination),
            DirectAction::Focus { target } => self.dispatcher.focus(*target),
            DirectAction::Type { text } => self.dispatcher.type_text(text),
            DirectAction::Keypress { key } => self.dispatcher.keypress(key),
        };
        match result {
            Err(DispatchError::Gone) => {
                warn!(?action, "direct action target vanished");
                Ok(())
            }
            other => other,
        }
    }
}

/// Builds a direct action from a command-table match's parameters.
pub fn direct_from_params(
    action: crate::command::CommandAction,
    params: &HashMap<String, String>,
    resolved_target: Option<EntityRef>,
) -> Option<DirectAction> {
    use crate::command::CommandAction as A;
    match action {
        A::Scroll => {
            let direction = match params.get("direction").map(String::as_str) {
                Some("up") => ScrollDirection::Up,
                _ => ScrollDirection::Down,
            };
            let amount = params
                .get("amount")
                .and_then(|a| a.parse().ok())
                .unwrap_or(400.0);
            Some(DirectAction::Scroll { direction, amount })
        }
        A::Navigate => Some(DirectAction::Navigate {
            destination: params.get("destination")?.clone(),
        }),
        A::Focus => Some(DirectAction::Focus {
            target: resolved_target?,
        }),
        A::Type => Some(DirectAction::Type {
            text: params.get("text")?.clone(),
        }),
        A::Keypress => Some(DirectAction::Keypress {
            key: params.get("key")?.clone(),
        }),
        A::Activate => None,
    }
}
