/// Bounded undo/redo history around a pure state-transition function.
///
/// Each transition is recorded as a structural diff (an `EditList`) rather
/// than a state snapshot. Diffs can be grouped so that several transitions
/// undo and redo as one unit, and `past` is trimmed to a configured number
/// of units without ever splitting a group.
pub mod config;
pub mod coordinator;
pub mod diff;
pub mod error;
pub mod group;
pub mod manager;
pub mod operation;
pub mod store;

pub use config::{Control, HistoryConfig};
pub use error::{HistoryError, MalformedEditError};
pub use manager::{Input, Transition, UndoManager};
pub use operation::{Edit, EditKind, EditList, EditPath, GroupMarker, HistoryEntry, PathSegment, State};
pub use store::History;
