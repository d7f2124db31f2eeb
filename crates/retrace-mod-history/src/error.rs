/// Typed failures surfaced by the history engine.
use thiserror::Error;

use crate::operation::GroupMarker;

/// An edit whose path does not resolve in the state it is applied to.
///
/// Indicates corrupted history: the edit was recorded against a different
/// state shape than the one it is being replayed on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("edit path `{path}` does not resolve: {reason}")]
pub struct MalformedEditError {
    /// Displayed form of the offending path (e.g. `/items/3`).
    pub path: String,
    pub reason: String,
}

impl MalformedEditError {
    pub(crate) fn new(path: impl ToString, reason: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

/// Fatal integrity violations raised while undoing, redoing or evicting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// A group marker at `index` has no matching counterpart.
    #[error("group marker {marker:?} at index {index} has no matching counterpart")]
    UnterminatedGroup { index: usize, marker: GroupMarker },
    #[error(transparent)]
    MalformedEdit(#[from] MalformedEditError),
}
