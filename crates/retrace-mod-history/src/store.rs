/// The `{past, present, future}` record and its bounded eviction policy.
use serde::{Deserialize, Serialize};

use crate::error::HistoryError;
use crate::group::{find_group_start, open_group_start};
use crate::operation::{EditList, GroupMarker, HistoryEntry, State};

/// Undo/redo history threaded between calls.
///
/// Every operation returns a new `History` built from the previous one;
/// nothing is mutated in place. `future[0]` is the next unit to redo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History {
    past: Vec<HistoryEntry>,
    present: State,
    future: Vec<HistoryEntry>,
}

impl History {
    /// Creates an empty history around an initial state.
    pub fn new(present: State) -> Self {
        Self {
            past: Vec::new(),
            present,
            future: Vec::new(),
        }
    }

    /// Assembles a history from raw parts. No marker balancing is checked;
    /// unbalanced groups surface as errors when undone, redone or evicted.
    pub fn from_parts(past: Vec<HistoryEntry>, present: State, future: Vec<HistoryEntry>) -> Self {
        Self {
            past,
            present,
            future,
        }
    }

    pub fn into_parts(self) -> (Vec<HistoryEntry>, State, Vec<HistoryEntry>) {
        (self.past, self.present, self.future)
    }

    pub fn past(&self) -> &[HistoryEntry] {
        &self.past
    }

    pub fn present(&self) -> &State {
        &self.present
    }

    pub fn future(&self) -> &[HistoryEntry] {
        &self.future
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Number of undo units in `past`: a closed group counts once, entries
    /// of a still-open trailing group count individually.
    pub fn past_units(&self) -> usize {
        count_units(&self.past)
    }

    /// Number of redo units in `future`.
    pub fn future_units(&self) -> usize {
        count_units(&self.future)
    }

    /// Records a completed transition: pushes `edits`, moves `present` to
    /// `new_present`, drops the redo branch, then evicts down to `bound`.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::UnterminatedGroup`] if eviction meets an
    /// unbalanced group marker.
    pub fn record_transition(
        &self,
        edits: EditList,
        new_present: State,
        bound: usize,
    ) -> Result<Self, HistoryError> {
        let mut past = self.past.clone();
        past.push(HistoryEntry::Edits(edits));
        evict_to_bound(&mut past, bound)?;
        Ok(Self {
            past,
            present: new_present,
            future: Vec::new(),
        })
    }

    /// Empties `past` and `future`, keeping `present`.
    pub fn clear(&self) -> Self {
        Self::new(self.present.clone())
    }
}

fn count_units(entries: &[HistoryEntry]) -> usize {
    let mut units = 0;
    // Edits seen inside a group that has not closed yet.
    let mut open: Option<usize> = None;
    for entry in entries {
        match entry {
            HistoryEntry::Marker(GroupMarker::Begin) => open = Some(0),
            HistoryEntry::Marker(GroupMarker::End) => {
                open = None;
                units += 1;
            }
            HistoryEntry::Edits(_) => match open.as_mut() {
                Some(pending) => *pending += 1,
                None => units += 1,
            },
        }
    }
    units + open.unwrap_or(0)
}

/// Truncates the front of `past` so that at most `bound` units remain.
///
/// Counts backward from the newest entry. A closed group is one unit and is
/// always cut at its `Begin` marker. A trailing open group is skipped by the
/// count and never evicted.
pub(crate) fn evict_to_bound(
    past: &mut Vec<HistoryEntry>,
    bound: usize,
) -> Result<(), HistoryError> {
    let countable_end = open_group_start(past).unwrap_or(past.len());
    let mut units = 0;
    let mut cursor = countable_end;
    while cursor > 0 {
        let last = cursor - 1;
        let unit_start = match &past[last] {
            HistoryEntry::Edits(_) => last,
            HistoryEntry::Marker(GroupMarker::End) => find_group_start(past, last)?,
            HistoryEntry::Marker(GroupMarker::Begin) => {
                return Err(HistoryError::UnterminatedGroup {
                    index: last,
                    marker: GroupMarker::Begin,
                })
            }
        };
        units += 1;
        if units > bound {
            tracing::debug!(evicted = cursor, bound, "evicting oldest history entries");
            past.drain(..cursor);
            return Ok(());
        }
        cursor = unit_start;
    }
    Ok(())
}
