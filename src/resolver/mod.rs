use tracing::{debug, trace};

use crate::config::ScoringWeights;
use crate::error::EngineError;
use crate::intent::{IntentAnalysis, IntentCategory};
use crate::surface::{Role, SurfaceSnapshot, TargetableEntity, Viewport};

/// Labels that are nothing but a close glyph.
const CLOSE_GLYPHS: &[&str] = &["x", "×", "✕", "✖"];

const DOCTOR_PHRASES: &[&str] = &["contact doctor", "call doctor", "physician", "dr."];

/// An entity paired with its additive score and the human-readable trail of
/// how it got there. Ephemeral, computed per resolution.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub entity: TargetableEntity,
    pub score: f32,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Resolution {
    pub candidate: ScoredCandidate,
    /// round(score × 100), capped at 100.
    pub confidence: u8,
}

pub struct TargetResolver {
    weights: ScoringWeights,
    assistant_markers: Vec<String>,
}

impl TargetResolver {
    pub fn new(weights: ScoringWeights, assistant_markers: Vec<String>) -> Self {
        Self {
            weights,
            assistant_markers,
        }
    }

    /// Scores every eligible entity in the snapshot against the analysis and
    /// picks the winner. Ties break by scan order: the fold keeps the first
    /// maximum it sees.
    pub fn resolve(
        &self,
        analysis: &IntentAnalysis,
        transcript: &str,
        snapshot: &SurfaceSnapshot,
    ) -> Result<Resolution, EngineError> {
        let transcript = transcript.to_lowercase();
        let mut best: Option<ScoredCandidate> = None;
        let mut scored = 0usize;

        for entity in &snapshot.entities {
            if !entity.clickable {
                continue;
            }
            if analysis.category == IntentCategory::Navigation && self.is_assistant_ui(entity) {
                trace!(text = %entity.text, "excluded assistant's own UI from navigation scoring");
                continue;
            }

            let candidate = self.score(analysis, &transcript, entity, snapshot.viewport);
            scored += 1;
            trace!(text = %entity.text, score = candidate.score, "scored candidate");

            match &best {
                Some(current) if candidate.score <= current.score => {}
                _ => best = Some(candidate),
            }
        }

        let best = match best {
            Some(b) => b,
            None => {
                return Err(EngineError::NoTargetFound {
                    reasons: "no clickable elements on screen".to_string(),
                })
            }
        };

        if best.score <= self.weights.accept_threshold {
            let reasons = format!(
                "best of {} candidates was \"{}\" at {:.2}, below the acceptance bar ({})",
                scored,
                best.entity.text,
                best.score,
                best.reasons.join("; "),
            );
            debug!(%reasons, "resolution failed");
            return Err(EngineError::NoTargetFound { reasons });
        }

        let confidence = ((best.score * 100.0).round() as u32).min(100) as u8;
        debug!(text = %best.entity.text, score = best.score, confidence, "target resolved");
        Ok(Resolution {
            candidate: best,
            confidence,
        })
    }

    /// The entity is part of the assistant's own floating UI, by flag or by
    /// a name marker in its text. Asked to navigate away, the assistant must
    /// never target itself.
    fn is_assistant_ui(&self, entity: &TargetableEntity) -> bool {
        if entity.assistant_owned {
            return true;
        }
        let text = entity.text.to_lowercase();
        self.assistant_markers.iter().any(|m| text.contains(m))
    }

    fn score(
        &self,
        analysis: &IntentAnalysis,
        transcript: &str,
        entity: &TargetableEntity,
        viewport: Viewport,
    ) -> ScoredCandidate {
        let w = &self.weights;
        let text = entity.text.to_lowercase();
        let mut score = 0.0f32;
        let mut reasons = Vec::new();

        for word in &analysis.target_words {
            if contains_either(&text, word) {
                score += w.target_word;
                reasons.push(format!("target word '{}' (+{:.1})", word, w.target_word));
            }
        }

        match analysis.category {
            IntentCategory::Emergency => {
                if text.contains("emergency") || text.contains("911") {
                    score += w.emergency_text;
                    reasons.push(format!("emergency label (+{:.1})", w.emergency_text));
                }
                if entity.emergency_styled {
                    score += w.emergency_style;
                    reasons.push(format!("emergency styling (+{:.1})", w.emergency_style));
                }
            }
            IntentCategory::Contact => {
                if text.contains("call") || text.contains("doctor") {
                    score += w.contact_text;
                    reasons.push(format!("contact label (+{:.1})", w.contact_text));
                }
                if DOCTOR_PHRASES.iter().any(|p| text.contains(p)) {
                    score += w.doctor_phrase;
                    reasons.push(format!("doctor phrase (+{:.1})", w.doctor_phrase));
                }
            }
            IntentCategory::Navigation => {
                if text.contains("back to menu") {
                    score += w.nav_back_to_menu;
                    reasons.push(format!("'back to menu' (+{:.1})", w.nav_back_to_menu));
                }
                if CLOSE_GLYPHS.contains(&text.trim()) {
                    score += w.nav_close_glyph;
                    reasons.push(format!("close glyph (+{:.1})", w.nav_close_glyph));
                }
                if text.contains("back") {
                    score += w.nav_back;
                    reasons.push(format!("'back' (+{:.1})", w.nav_back));
                }
                if text.contains("close") || text.contains("exit") {
                    score += w.nav_close_exit;
                    reasons.push(format!("close/exit (+{:.1})", w.nav_close_exit));
                }
                if text.contains("menu") {
                    score += w.nav_menu;
                    reasons.push(format!("'menu' (+{:.1})", w.nav_menu));
                }
                // Real page controls live above the assistant's bottom strip.
                if entity.bounds.bottom() < viewport.height - w.bottom_margin {
                    score += w.nav_not_near_bottom;
                    reasons.push(format!("above bottom strip (+{:.1})", w.nav_not_near_bottom));
                }
            }
            IntentCategory::Action | IntentCategory::Unknown => {}
        }

        let ratio = word_overlap(transcript, &text);
        if ratio > w.fuzzy_min_ratio {
            let bonus = ratio * w.fuzzy_weight;
            score += bonus;
            reasons.push(format!("fuzzy overlap {:.2} (+{:.2})", ratio, bonus));
        }

        if entity.role == Role::Button {
            score += w.button_role;
            reasons.push(format!("button role (+{:.1})", w.button_role));
        }

        if entity.bounds.area() > w.large_area_threshold {
            score += w.large_area;
            reasons.push(format!("large target (+{:.1})", w.large_area));
        }

        ScoredCandidate {
            entity: entity.clone(),
            score,
            reasons,
        }
    }
}

/// Substring containment in either direction, on lowercased text.
fn contains_either(text: &str, word: &str) -> bool {
    !word.is_empty() && !text.is_empty() && (text.contains(word) || word.contains(text))
}

/// Word-overlap ratio between two phrases: words match by substring
/// containment either direction, ratio = matches / max(word count).
fn word_overlap(a: &str, b: &str) -> f32 {
    let a_words: Vec<&str> = a.split_whitespace().collect();
    let b_words: Vec<&str> = b.split_whitespace().collect();
    if a_words.is_empty() || b_words.is_empty() {
        return 0.0;
    }
    let matches = a_words
        .iter()
        .filter(|w| b_words.iter().any(|x| x.contains(*w) || w.contains(x)))
        .count();
    matches as f32 / a_words.len().max(b_words.len()) as f32
}
