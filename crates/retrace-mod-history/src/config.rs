/// Resolved, immutable runtime configuration for the history engine.
use std::collections::HashMap;

use retrace_config::{EngineConfig, TriggerConfig};

/// Control requests the engine handles itself instead of forwarding them
/// to the wrapped transition function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Undo,
    Redo,
    Clear,
    GroupBegin,
    GroupEnd,
}

/// Configuration for the history engine.
///
/// Built once from an [`EngineConfig`]; trigger names are resolved into a
/// lookup table so the engine never compares against literal identifiers.
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    /// Max counted units kept in `past` (a group counts once).
    pub history_bound: usize,
    triggers: HashMap<String, Control>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for HistoryConfig {
    fn from(config: &EngineConfig) -> Self {
        let mut sanitized = config.clone();
        sanitized.sanitize();
        Self {
            history_bound: sanitized.history_bound,
            triggers: trigger_table(&sanitized.triggers),
        }
    }
}

impl HistoryConfig {
    /// Returns a copy with a different history bound (clamped to at least 1).
    #[must_use]
    pub fn with_history_bound(mut self, bound: usize) -> Self {
        self.history_bound = bound.max(1);
        self
    }

    /// Maps a trigger name to the control request it stands for.
    pub fn resolve(&self, trigger: &str) -> Option<Control> {
        self.triggers.get(trigger).copied()
    }
}

fn trigger_table(triggers: &TriggerConfig) -> HashMap<String, Control> {
    HashMap::from([
        (triggers.undo.clone(), Control::Undo),
        (triggers.redo.clone(), Control::Redo),
        (triggers.clear.clone(), Control::Clear),
        (triggers.group_begin.clone(), Control::GroupBegin),
        (triggers.group_end.clone(), Control::GroupEnd),
    ])
}
