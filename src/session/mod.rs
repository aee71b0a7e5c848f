pub mod controller;
pub mod event;
pub mod state;

pub use controller::SessionController;
pub use event::{ActionPlan, DelayKind, Effect, ProcessingOutcome, SessionEvent};
pub use state::{CommandHistory, PendingAction, SessionState};
