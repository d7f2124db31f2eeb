/// Main entry point: wraps a pure transition function with undo/redo history.
///
/// Control requests (undo, redo, clear, group begin/end) are handled against
/// the history directly. Every other input goes to the wrapped transition
/// function and the resulting structural diff is recorded.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{Control, HistoryConfig};
use crate::diff;
use crate::error::HistoryError;
use crate::operation::State;
use crate::store::History;

/// One input fed to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Input {
    /// Identifies the request; matched against the configured control triggers.
    pub trigger: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl Input {
    pub fn new(trigger: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
            payload: None,
        }
    }

    pub fn with_payload(trigger: impl Into<String>, payload: Value) -> Self {
        Self {
            trigger: trigger.into(),
            payload: Some(payload),
        }
    }

    /// Repeat count for undo/redo requests.
    ///
    /// A positive numeric payload (floored when fractional); anything else is 1.
    pub fn steps(&self) -> usize {
        let Some(payload) = &self.payload else {
            return 1;
        };
        if let Some(n) = payload.as_u64() {
            return usize::try_from(n).unwrap_or(usize::MAX).max(1);
        }
        match payload.as_f64() {
            Some(f) if f >= 1.0 => f.floor() as usize,
            _ => 1,
        }
    }
}

/// The wrapped pure state-transition function.
///
/// Called with `(None, None)` once to produce the initial state, then with
/// the current state and each non-control input. Must not have side effects.
pub trait Transition {
    fn transition(&self, state: Option<&State>, input: Option<&Input>) -> State;
}

impl<F> Transition for F
where
    F: Fn(Option<&State>, Option<&Input>) -> State,
{
    fn transition(&self, state: Option<&State>, input: Option<&Input>) -> State {
        self(state, input)
    }
}

/// Undo/redo engine around a transition function.
///
/// Holds no history of its own: callers thread the returned [`History`]
/// into the next call, one call at a time.
pub struct UndoManager<T> {
    transition: T,
    config: HistoryConfig,
}

impl<T> std::fmt::Debug for UndoManager<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UndoManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<T: Transition> UndoManager<T> {
    pub fn new(transition: T, config: HistoryConfig) -> Self {
        Self { transition, config }
    }

    /// Creates a manager with default config.
    pub fn with_defaults(transition: T) -> Self {
        Self::new(transition, HistoryConfig::default())
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Produces the initial history by calling the transition function with
    /// no prior state and no input.
    pub fn bootstrap(&self) -> History {
        History::new(self.transition.transition(None, None))
    }

    /// Handles one input and returns the next history.
    ///
    /// With no history yet, bootstraps and ignores `input`. Transitions that
    /// leave the state structurally unchanged return `history` as is.
    ///
    /// # Errors
    ///
    /// Propagates [`HistoryError`] from undo, redo or eviction; these signal
    /// corrupted history and are never retried.
    pub fn handle(&self, history: Option<&History>, input: &Input) -> Result<History, HistoryError> {
        let Some(history) = history else {
            tracing::debug!(trigger = %input.trigger, "bootstrapping history; input ignored");
            return Ok(self.bootstrap());
        };

        match self.config.resolve(&input.trigger) {
            Some(Control::Undo) => history.undo(input.steps()),
            Some(Control::Redo) => history.redo(input.steps()),
            Some(Control::Clear) => {
                tracing::debug!("clearing history");
                Ok(history.clear())
            }
            Some(Control::GroupBegin) => Ok(history.begin_group()),
            Some(Control::GroupEnd) => history.end_group(self.config.history_bound),
            None => self.record(history, input),
        }
    }

    fn record(&self, history: &History, input: &Input) -> Result<History, HistoryError> {
        let next = self
            .transition
            .transition(Some(history.present()), Some(input));
        match diff::compute(history.present(), &next) {
            Some(edits) => {
                tracing::debug!(trigger = %input.trigger, edits = edits.len(), "recording transition");
                history.record_transition(edits, next, self.config.history_bound)
            }
            None => {
                tracing::trace!(trigger = %input.trigger, "transition left state unchanged");
                Ok(history.clone())
            }
        }
    }
}
