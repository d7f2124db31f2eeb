/// Names of the inputs the engine treats as control requests.
use serde::{Deserialize, Serialize};

pub const DEFAULT_UNDO: &str = "UNDO";
pub const DEFAULT_REDO: &str = "REDO";
pub const DEFAULT_CLEAR: &str = "CLEAR";
pub const DEFAULT_GROUP_BEGIN: &str = "GROUP-BEGIN";
pub const DEFAULT_GROUP_END: &str = "GROUP-END";

/// Trigger identifiers for the five control requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    pub undo: String,
    pub redo: String,
    pub clear: String,
    pub group_begin: String,
    pub group_end: String,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            undo: DEFAULT_UNDO.to_string(),
            redo: DEFAULT_REDO.to_string(),
            clear: DEFAULT_CLEAR.to_string(),
            group_begin: DEFAULT_GROUP_BEGIN.to_string(),
            group_end: DEFAULT_GROUP_END.to_string(),
        }
    }
}

impl TriggerConfig {
    /// All five names in a fixed order: undo, redo, clear, group begin, group end.
    pub fn names(&self) -> [&str; 5] {
        [
            self.undo.as_str(),
            self.redo.as_str(),
            self.clear.as_str(),
            self.group_begin.as_str(),
            self.group_end.as_str(),
        ]
    }

    /// Resets blank names to their default, then falls back to all defaults
    /// if two triggers share a name.
    pub fn sanitize(&mut self) {
        let defaults = Self::default();
        for (name, default) in [
            (&mut self.undo, defaults.undo.as_str()),
            (&mut self.redo, defaults.redo.as_str()),
            (&mut self.clear, defaults.clear.as_str()),
            (&mut self.group_begin, defaults.group_begin.as_str()),
            (&mut self.group_end, defaults.group_end.as_str()),
        ] {
            if name.trim().is_empty() {
                tracing::warn!("Blank trigger name replaced by default `{default}`");
                *name = default.to_string();
            }
        }

        let names = self.names();
        let has_duplicates = names
            .iter()
            .enumerate()
            .any(|(i, a)| names[i + 1..].contains(a));
        if has_duplicates {
            tracing::warn!("Duplicate trigger names {names:?}; using defaults");
            *self = defaults;
        }
    }
}
