//! Hands-free driving of an on-screen application: wake-phrase listening,
//! command capture, intent classification, target resolution over the live
//! surface, confirmation-gated execution, and spoken feedback.
//!
//! The core is split the same way throughout: pure decision logic
//! (`SessionController`, `IntentClassifier`, `TargetResolver`,
//! `FeedbackArbiter`) and an async driver (`Engine`) that owns the
//! collaborators and executes effects.

pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod exec;
pub mod feedback;
pub mod intent;
pub mod resolver;
pub mod session;
pub mod speech;
pub mod surface;

pub use engine::Engine;
pub use session::SessionController;
