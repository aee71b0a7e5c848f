use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::intent::IntentCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandAction {
    Activate,
    Scroll,
    Navigate,
    Focus,
    Type,
    Keypress,
}

/// One entry in the data-driven command table. Patterns may contain at most
/// one `*` wildcard; the captured span fills the first named slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandDefinition {
    pub patterns: Vec<String>,
    pub action: CommandAction,
    pub description: String,
    pub category: IntentCategory,
    #[serde(default)]
    pub requires_confirmation: bool,
    /// Names for captured parameters, in wildcard order.
    #[serde(default)]
    pub slots: Vec<String>,
    /// Fixed parameters this definition always carries (e.g. a scroll
    /// direction baked into the pattern). Captured slots override these.
    #[serde(default)]
    pub preset_params: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct CommandMatch {
    pub definition: CommandDefinition,
    pub params: HashMap<String, String>,
}

/// The static command table. Loaded once; mutable only through explicit
/// registration and removal.
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    definitions: Vec<CommandDefinition>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in table of direct commands.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(CommandDefinition {
            patterns: vec!["scroll down".into(), "scroll down the page".into()],
            action: CommandAction::Scroll,
            description: "scroll the page down".into(),
            category: IntentCategory::Action,
            requires_confirmation: false,
            slots: vec![],
            preset_params: HashMap::from([("direction".into(), "down".into())]),
        });
        registry.register(CommandDefinition {
            patterns: vec!["scroll up".into(), "scroll up the page".into()],
            action: CommandAction::Scroll,
            description: "scroll the page up".into(),
            category: IntentCategory::Action,
            requires_confirmation: false,
            slots: vec![],
            preset_params: HashMap::from([("direction".into(), "up".into())]),
        });
        registry.register(CommandDefinition {
            patterns: vec!["go to *".into(), "navigate to *".into()],
            action: CommandAction::Navigate,
            description: "navigate".into(),
            category: IntentCategory::Navigation,
            requires_confirmation: false,
            slots: vec!["destination".into()],
            preset_params: HashMap::new(),
        });
        registry.register(CommandDefinition {
            patterns: vec!["type *".into(), "enter *".into()],
            action: CommandAction::Type,
            description: "type text".into(),
            category: IntentCategory::Action,
            requires_confirmation: false,
            slots: vec!["text".into()],
            preset_params: HashMap::new(),
        });
        registry.register(CommandDefinition {
            patterns: vec!["press enter".into(), "hit enter".into()],
            action: CommandAction::Keypress,
            description: "press the enter key".into(),
            category: IntentCategory::Action,
            requires_confirmation: false,
            slots: vec![],
            preset_params: HashMap::from([("key".into(), "Enter".into())]),
        });
        registry.register(CommandDefinition {
            patterns: vec!["focus on *".into(), "focus *".into()],
            action: CommandAction::Focus,
            description: "focus an element".into(),
            category: IntentCategory::Action,
            requires_confirmation: false,
            slots: vec!["query".into()],
            preset_params: HashMap::new(),
        });
        registry
    }

    pub fn register(&mut self, definition: CommandDefinition) {
        self.definitions.push(definition);
    }

    /// Removes every definition with the given description. Returns whether
    /// anything was removed.
    pub fn remove(&mut self, description: &str) -> bool {
        let before = self.definitions.len();
        self.definitions.retain(|d| d.description != description);
        self.definitions.len() != before
    }

    pub fn definitions(&self) -> &[CommandDefinition] {
        &self.definitions
    }

    /// Matches a normalized utterance against the table. Exact patterns win
    /// over wildcard patterns so "scroll down" never captures into
    /// "scroll *"-style entries.
    pub fn lookup(&self, utterance: &str) -> Option<CommandMatch> {
        let utterance = utterance.trim();

        for definition in &self.definitions {
            for pattern in &definition.patterns {
                if !pattern.contains('*') && pattern == utterance {
                    debug!(pattern = %pattern, "exact command match");
                    return Some(CommandMatch {
                        definition: definition.clone(),
                        params: definition.preset_params.clone(),
                    });
                }
            }
        }

        for definition in &self.definitions {
            for pattern in &definition.patterns {
                if let Some(captured) = match_wildcard(pattern, utterance) {
                    debug!(pattern = %pattern, captured = %captured, "wildcard command match");
                    let mut params = definition.preset_params.clone();
                    let slot = definition
                        .slots
                        .first()
                        .cloned()
                        .unwrap_or_else(|| "arg".to_string());
                    params.insert(slot, captured);
                    return Some(CommandMatch {
                        definition: definition.clone(),
                        params,
                    });
                }
            }
        }

        None
    }
}

/// Matches `pattern` containing exactly one `*` against `utterance`,
/// returning the captured span. The capture must be non-empty.
fn match_wildcard(pattern: &str, utterance: &str) -> Option<String> {
    let star = pattern.find('*')?;
    let (prefix, rest) = pattern.split_at(star);
    let suffix = &rest[1..];

    if !utterance.starts_with(prefix) || !utterance.ends_with(suffix) {
        return None;
    }
    if utterance.len() < prefix.len() + suffix.len() {
        return None;
    }

    let captured = utterance[prefix.len()..utterance.len() - suffix.len()].trim();
    if captured.is_empty() {
        None
    } else {
        Some(captured.to_string())
    }
}
