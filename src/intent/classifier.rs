use tracing::debug;

use super::types::{IntentAnalysis, IntentCategory};

/// Speech-recognition filler artifacts stripped before matching.
const FILLERS: &[&str] = &["uh", "um", "er"];

/// Phrases the recognizer is known to hallucinate on silence or noise.
const GARBAGE_PHRASES: &[&str] = &[
    "thank you for watching",
    "thanks for watching",
    "subscribe to my channel",
    "[music]",
    "[applause]",
];

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "to", "of", "on", "in", "at", "is", "it", "this", "that", "please", "can",
    "could", "would", "you", "i", "me", "my", "do", "for", "with", "and",
];

/// Words that re-label an unknown utterance as navigation.
const NAV_FALLBACK: &[&str] = &["back", "exit", "close", "return", "leave", "quit"];

/// Pattern groups tested in this exact order; the first group with any
/// matching pattern wins. The ordering is contract, not an implementation
/// detail: an utterance matching both navigation and action patterns must
/// classify as navigation.
const PATTERN_GROUPS: &[(IntentCategory, &[&str])] = &[
    (
        IntentCategory::Emergency,
        &["emergency", "911", "help me", "urgent", "ambulance"],
    ),
    (
        IntentCategory::Contact,
        &["call", "contact", "phone", "doctor", "nurse", "reach"],
    ),
    (
        IntentCategory::Navigation,
        &[
            "go back", "back", "menu", "return", "exit", "close", "home", "main", "navigate",
            "leave",
        ],
    ),
    (
        IntentCategory::Action,
        &[
            "click", "press", "select", "choose", "open", "start", "tap", "activate", "scroll",
            "type",
        ],
    ),
];

/// Canonical target-word set per category, used by the resolver.
fn target_words_for(category: IntentCategory) -> Vec<String> {
    let words: &[&str] = match category {
        IntentCategory::Emergency => &["emergency", "911", "help", "urgent"],
        IntentCategory::Contact => &["call", "doctor", "contact", "phone", "nurse"],
        IntentCategory::Navigation => &["back", "menu", "return", "exit", "close", "main", "home"],
        IntentCategory::Action => &["click", "press", "select", "open", "start", "choose"],
        IntentCategory::Unknown => &[],
    };
    words.iter().map(|w| w.to_string()).collect()
}

pub struct IntentClassifier;

impl IntentClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Lowercase, trim, strip fillers and known garbage, collapse whitespace.
    pub fn normalize(&self, raw: &str) -> String {
        let mut text = raw.to_lowercase();
        for phrase in GARBAGE_PHRASES {
            if text.contains(phrase) {
                text = text.replace(phrase, " ");
            }
        }
        text.split_whitespace()
            .filter(|w| {
                let bare = w.trim_matches(|c: char| !c.is_alphanumeric());
                !FILLERS.contains(&bare)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Ordered-priority classification of one finalized transcript.
    pub fn classify(&self, raw: &str) -> IntentAnalysis {
        let text = self.normalize(raw);
        let keywords: Vec<String> = text
            .split_whitespace()
            .filter(|w| !STOP_WORDS.contains(w))
            .map(|w| w.to_string())
            .collect();

        for (category, patterns) in PATTERN_GROUPS {
            if patterns.iter().any(|p| text.contains(p)) {
                debug!(?category, transcript = %text, "intent classified");
                return IntentAnalysis {
                    category: *category,
                    keywords,
                    urgency: category.urgency(),
                    target_words: target_words_for(*category),
                };
            }
        }

        // No group matched. If any word overlaps the back/exit/close lexicon
        // this is still a navigation request phrased oddly; otherwise score
        // against the transcript's own content words.
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.iter().any(|w| NAV_FALLBACK.contains(w)) {
            debug!(transcript = %text, "unknown re-labeled as navigation");
            return IntentAnalysis {
                category: IntentCategory::Navigation,
                keywords,
                urgency: IntentCategory::Navigation.urgency(),
                target_words: target_words_for(IntentCategory::Navigation),
            };
        }

        let target_words = keywords.clone();
        IntentAnalysis {
            category: IntentCategory::Unknown,
            keywords,
            urgency: IntentCategory::Unknown.urgency(),
            target_words,
        }
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}
