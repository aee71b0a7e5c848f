use serde::{Deserialize, Serialize};

/// Scoring table for the target resolver.
///
/// The values are empirically tuned. They are loadable data rather than
/// hardcoded constants so deployments can adjust them, but the defaults are
/// the reference behavior and the integration tests pin them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Per target word contained (either direction) in the entity text.
    pub target_word: f32,
    /// Emergency intent: entity text mentions "emergency" or "911".
    pub emergency_text: f32,
    /// Emergency intent: entity is visually flagged as emergency-styled.
    pub emergency_style: f32,
    /// Contact intent: entity text mentions "call" or "doctor".
    pub contact_text: f32,
    /// Contact intent: explicit doctor/physician phrase.
    pub doctor_phrase: f32,
    pub nav_back_to_menu: f32,
    /// Bare close glyph ("x", "×", ...) as the whole label.
    pub nav_close_glyph: f32,
    pub nav_back: f32,
    pub nav_close_exit: f32,
    pub nav_menu: f32,
    /// Navigation: entity sits above the bottom strip of the screen, where
    /// real page controls live rather than the assistant's floating UI.
    pub nav_not_near_bottom: f32,
    /// Multiplier on the word-overlap ratio between transcript and label.
    pub fuzzy_weight: f32,
    /// Overlap ratios at or below this contribute nothing.
    pub fuzzy_min_ratio: f32,
    pub button_role: f32,
    pub large_area: f32,
    /// Area in px^2 above which a target counts as large.
    pub large_area_threshold: f32,
    /// Maximum score that still reports resolution failure.
    pub accept_threshold: f32,
    /// Height in px of the bottom strip considered "near the bottom edge".
    pub bottom_margin: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            target_word: 0.8,
            emergency_text: 1.0,
            emergency_style: 0.6,
            contact_text: 0.8,
            doctor_phrase: 0.9,
            nav_back_to_menu: 1.5,
            nav_close_glyph: 1.3,
            nav_back: 1.2,
            nav_close_exit: 1.1,
            nav_menu: 1.0,
            nav_not_near_bottom: 0.3,
            fuzzy_weight: 0.5,
            fuzzy_min_ratio: 0.3,
            button_role: 0.3,
            large_area: 0.2,
            large_area_threshold: 10_000.0,
            accept_threshold: 0.4,
            bottom_margin: 120.0,
        }
    }
}

/// Top-level engine configuration. Everything has a serde default so a
/// partial JSON document (or none at all) yields the reference behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Phrases that move the session from passive to active listening.
    pub wake_phrases: Vec<String>,
    /// Pause between wake detection and starting the command recognizer.
    pub wake_pause_ms: u64,
    /// Perceptual delay between highlighting a target and invoking it.
    pub highlight_delay_ms: u64,
    /// Pause after processing before resuming passive listening.
    pub settle_delay_ms: u64,
    /// Delay before restarting a recognizer after a normal end-of-session.
    pub restart_delay_ms: u64,
    /// Base for the exponential backoff after recognition errors.
    pub backoff_base_ms: u64,
    pub history_capacity: usize,
    /// Global switch: destructive commands ask before executing.
    pub confirmation_required: bool,
    /// BCP 47 language tag handed to the recognizer.
    pub language: String,
    /// Text/ancestry markers identifying the assistant's own UI. Entities
    /// carrying one of these are never navigation targets.
    pub assistant_markers: Vec<String>,
    /// Elements smaller than this in either dimension are not targetable.
    pub min_target_dim: f32,
    pub weights: ScoringWeights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            wake_phrases: vec![
                "hey nullistant".to_string(),
                "okay nullistant".to_string(),
                "nullistant".to_string(),
            ],
            wake_pause_ms: 500,
            highlight_delay_ms: 800,
            settle_delay_ms: 2000,
            restart_delay_ms: 250,
            backoff_base_ms: 300,
            history_capacity: 10,
            confirmation_required: true,
            language: "en-US".to_string(),
            assistant_markers: vec!["nullistant".to_string()],
            min_target_dim: 10.0,
            weights: ScoringWeights::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
