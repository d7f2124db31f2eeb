/// Group boundaries: opening and closing groups, and scanning for a marker's match.
///
/// Groups are flat. A `Begin`/`End` pair brackets a run of edit lists that
/// undo and redo as one unit; a group never contains another group.
use crate::error::HistoryError;
use crate::operation::{GroupMarker, HistoryEntry};
use crate::store::{evict_to_bound, History};

/// Whether `entry` is a group boundary marker rather than an edit list.
pub fn is_group_boundary(entry: &HistoryEntry) -> bool {
    matches!(entry, HistoryEntry::Marker(_))
}

/// Finds the `Begin` matching the `End` at `end_index`, scanning backward.
///
/// # Errors
///
/// Fails with [`HistoryError::UnterminatedGroup`] if another `End` is met
/// first or the start of the sequence is reached.
pub fn find_group_start(entries: &[HistoryEntry], end_index: usize) -> Result<usize, HistoryError> {
    let unterminated = HistoryError::UnterminatedGroup {
        index: end_index,
        marker: GroupMarker::End,
    };
    for i in (0..end_index).rev() {
        match entries[i].marker() {
            Some(GroupMarker::Begin) => return Ok(i),
            Some(GroupMarker::End) => return Err(unterminated),
            None => {}
        }
    }
    Err(unterminated)
}

/// Finds the `End` matching the `Begin` at `begin_index`, scanning forward.
///
/// # Errors
///
/// Fails with [`HistoryError::UnterminatedGroup`] if another `Begin` is met
/// first or the end of the sequence is reached.
pub fn find_group_end(entries: &[HistoryEntry], begin_index: usize) -> Result<usize, HistoryError> {
    let unterminated = HistoryError::UnterminatedGroup {
        index: begin_index,
        marker: GroupMarker::Begin,
    };
    for (i, entry) in entries.iter().enumerate().skip(begin_index + 1) {
        match entry.marker() {
            Some(GroupMarker::End) => return Ok(i),
            Some(GroupMarker::Begin) => return Err(unterminated),
            None => {}
        }
    }
    Err(unterminated)
}

/// Index of the `Begin` of a trailing group that has not been closed yet.
pub fn open_group_start(entries: &[HistoryEntry]) -> Option<usize> {
    entries
        .iter()
        .rposition(is_group_boundary)
        .filter(|&i| entries[i].marker() == Some(GroupMarker::Begin))
}

impl History {
    /// Whether a group has been opened and not yet closed.
    pub fn is_group_open(&self) -> bool {
        open_group_start(self.past()).is_some()
    }

    /// Opens a group. Ignored with a warning if one is already open.
    pub fn begin_group(&self) -> History {
        if self.is_group_open() {
            tracing::warn!("group already open; nested groups are not supported");
            return self.clone();
        }
        tracing::debug!("opening history group");
        let mut past = self.past().to_vec();
        past.push(HistoryEntry::Marker(GroupMarker::Begin));
        History::from_parts(past, self.present().clone(), self.future().to_vec())
    }

    /// Closes the open group, then evicts down to `bound` now that the group
    /// counts as a single unit.
    ///
    /// A close request right after `Begin` abandons the empty group: the
    /// `Begin` is removed so `past` is back to what it was before the group
    /// opened. With no open group the history is returned unchanged. Both
    /// cases log a warning.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::UnterminatedGroup`] if eviction meets an
    /// unbalanced group marker.
    pub fn end_group(&self, bound: usize) -> Result<History, HistoryError> {
        match self.past().last() {
            Some(HistoryEntry::Marker(GroupMarker::Begin)) => {
                tracing::warn!("closing an empty group; nothing recorded");
                let mut past = self.past().to_vec();
                past.pop();
                Ok(History::from_parts(past, self.present().clone(), self.future().to_vec()))
            }
            _ if !self.is_group_open() => {
                tracing::warn!("no open group to close");
                Ok(self.clone())
            }
            _ => {
                tracing::debug!("closing history group");
                let mut past = self.past().to_vec();
                past.push(HistoryEntry::Marker(GroupMarker::End));
                evict_to_bound(&mut past, bound)?;
                Ok(History::from_parts(past, self.present().clone(), self.future().to_vec()))
            }
        }
    }

}
