use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::exec::DispatchError;

/// Why a recognition session failed. Everything except `PermissionDenied`
/// and `ServiceUnavailable` is transient and restarted with backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecognitionErrorKind {
    Audio,
    Network,
    NoSpeech,
    Aborted,
    /// The user revoked microphone access. Fatal until re-granted.
    PermissionDenied,
    /// The platform has no speech recognition at all. Never retried.
    ServiceUnavailable,
}

impl RecognitionErrorKind {
    /// Transient errors get an automatic restart; fatal ones silence the
    /// session until the user intervenes.
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::PermissionDenied | Self::ServiceUnavailable)
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("speech capability unavailable")]
    CapabilityUnavailable,

    #[error("recognition failed: {0:?}")]
    Recognition(RecognitionErrorKind),

    #[error("no command matched the utterance")]
    NoIntentMatch,

    #[error("no target found: {reasons}")]
    NoTargetFound { reasons: String },

    #[error("action dispatch failed: {0}")]
    ActionExecution(#[from] DispatchError),
}
