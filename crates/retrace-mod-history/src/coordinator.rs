/// Multi-step undo and redo over group-aware history.
///
/// A step moves one unit between `past` and `future`: either a single edit
/// list or a whole closed group with its markers. Each request works on one
/// cloned copy of the history, so a failing step leaves the caller's value
/// untouched.
use serde_json::Value;

use crate::diff::{apply_backward_in_place, apply_forward_in_place};
use crate::error::HistoryError;
use crate::group::{find_group_end, find_group_start, open_group_start};
use crate::operation::{GroupMarker, HistoryEntry};
use crate::store::History;

/// Working copy of a history for the duration of one request.
struct Working {
    past: Vec<HistoryEntry>,
    present: Value,
    future: Vec<HistoryEntry>,
}

impl Working {
    fn from_history(history: &History) -> Self {
        Self {
            past: history.past().to_vec(),
            present: history.present().clone(),
            future: history.future().to_vec(),
        }
    }

    fn into_history(self) -> History {
        History::from_parts(self.past, self.present, self.future)
    }

    /// Reverts the newest unit of `past`. Returns `false` when nothing is left.
    fn undo_step(&mut self) -> Result<bool, HistoryError> {
        loop {
            let Some(last) = self.past.len().checked_sub(1) else {
                return Ok(false);
            };
            let unit_start = match &self.past[last] {
                HistoryEntry::Edits(_) => last,
                HistoryEntry::Marker(GroupMarker::End) => find_group_start(&self.past, last)?,
                HistoryEntry::Marker(GroupMarker::Begin) => {
                    // A group opened with nothing in it yet: abandon it.
                    tracing::debug!("discarding empty open group during undo");
                    self.past.pop();
                    continue;
                }
            };

            let unit = self.past.split_off(unit_start);
            for entry in unit.iter().rev() {
                if let HistoryEntry::Edits(edits) = entry {
                    apply_backward_in_place(&mut self.present, edits)?;
                }
            }
            self.future.splice(0..0, unit);
            return Ok(true);
        }
    }

    /// Replays the oldest unit of `future`. Returns `false` when nothing is left.
    fn redo_step(&mut self) -> Result<bool, HistoryError> {
        let Some(first) = self.future.first() else {
            return Ok(false);
        };
        let unit_end = match first {
            HistoryEntry::Edits(_) => 0,
            HistoryEntry::Marker(GroupMarker::Begin) => find_group_end(&self.future, 0)?,
            HistoryEntry::Marker(GroupMarker::End) => {
                return Err(HistoryError::UnterminatedGroup {
                    index: 0,
                    marker: GroupMarker::End,
                })
            }
        };

        let unit: Vec<HistoryEntry> = self.future.drain(..=unit_end).collect();
        for entry in &unit {
            if let HistoryEntry::Edits(edits) = entry {
                apply_forward_in_place(&mut self.present, edits)?;
            }
        }
        if open_group_start(&self.past).is_some() {
            // Redone edits join the open group instead of nesting a second one.
            self.past
                .extend(unit.into_iter().filter(|e| e.as_edits().is_some()));
        } else {
            self.past.extend(unit);
        }
        Ok(true)
    }
}

impl History {
    /// Undoes up to `steps` units, stopping early once `past` is empty.
    ///
    /// # Errors
    ///
    /// [`HistoryError::UnterminatedGroup`] for an `End` marker without its
    /// `Begin`, [`HistoryError::MalformedEdit`] if an edit no longer applies.
    pub fn undo(&self, steps: usize) -> Result<History, HistoryError> {
        if !self.can_undo() {
            return Ok(self.clone());
        }
        let mut working = Working::from_history(self);
        let mut done = 0;
        while done < steps && working.undo_step()? {
            done += 1;
        }
        tracing::debug!(requested = steps, done, "undo");
        Ok(working.into_history())
    }

    /// Redoes up to `steps` units, stopping early once `future` is empty.
    ///
    /// While a group is open in `past`, a redone group joins it without its
    /// own markers. Its edit lists then undo one at a time until the open
    /// group is closed, so redo followed by undo does not restore the
    /// previous history in that case.
    ///
    /// # Errors
    ///
    /// [`HistoryError::UnterminatedGroup`] for a `Begin` marker without its
    /// `End`, [`HistoryError::MalformedEdit`] if an edit no longer applies.
    pub fn redo(&self, steps: usize) -> Result<History, HistoryError> {
        if !self.can_redo() {
            return Ok(self.clone());
        }
        let mut working = Working::from_history(self);
        let mut done = 0;
        while done < steps && working.redo_step()? {
            done += 1;
        }
        tracing::debug!(requested = steps, done, "redo");
        Ok(working.into_history())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::compute;
    use crate::operation::{Edit, EditList, EditPath};
    use serde_json::json;

    fn step(from: Value, to: Value) -> HistoryEntry {
        HistoryEntry::Edits(compute(&from, &to).expect("diff"))
    }

    fn begin() -> HistoryEntry {
        HistoryEntry::Marker(GroupMarker::Begin)
    }

    fn end() -> HistoryEntry {
        HistoryEntry::Marker(GroupMarker::End)
    }

    /// Three plain transitions: n = 0 -> 1 -> 2 -> 3.
    fn linear() -> History {
        History::from_parts(
            vec![
                step(json!({"n": 0}), json!({"n": 1})),
                step(json!({"n": 1}), json!({"n": 2})),
                step(json!({"n": 2}), json!({"n": 3})),
            ],
            json!({"n": 3}),
            Vec::new(),
        )
    }

    #[test]
    fn test_undo_empty_past_is_noop() {
        let h = History::new(json!({"a": 1}));
        assert_eq!(h.undo(1).expect("undo"), h);
        assert_eq!(h.redo(3).expect("redo"), h);
    }

    #[test]
    fn test_undo_single_step() {
        let h = linear().undo(1).expect("undo");
        assert_eq!(h.present(), &json!({"n": 2}));
        assert_eq!(h.past().len(), 2);
        assert_eq!(h.future().len(), 1);
    }

    #[test]
    fn test_undo_redo_roundtrip() {
        let h = linear();
        let undone = h.undo(1).expect("undo");
        assert_eq!(undone.redo(1).expect("redo"), h);

        let redone = undone.undo(1).expect("undo").redo(1).expect("redo");
        assert_eq!(redone, undone);
    }

    #[test]
    fn test_multi_step_stops_when_past_empty() {
        let h = linear().undo(10).expect("undo");
        assert!(h.past().is_empty());
        assert_eq!(h.present(), &json!({"n": 0}));
        assert_eq!(h.future().len(), 3);

        let h = h.redo(2).expect("redo");
        assert_eq!(h.present(), &json!({"n": 2}));
        assert_eq!(h.future().len(), 1);
    }

    #[test]
    fn test_undo_group_is_atomic() {
        let h = History::from_parts(
            vec![
                step(json!({}), json!({"a": 1})),
                begin(),
                step(json!({"a": 1}), json!({"a": 1, "b": 2})),
                step(json!({"a": 1, "b": 2}), json!({"a": 1, "b": 2, "c": 3})),
                end(),
            ],
            json!({"a": 1, "b": 2, "c": 3}),
            Vec::new(),
        );

        let undone = h.undo(1).expect("undo");
        assert_eq!(undone.present(), &json!({"a": 1}));
        assert_eq!(undone.past().len(), 1);
        assert_eq!(undone.future().len(), 4);
        assert_eq!(undone.future()[0], begin());
        assert_eq!(undone.future_units(), 1);

        let redone = undone.redo(1).expect("redo");
        assert_eq!(redone, h);
    }

    #[test]
    fn test_undo_unmatched_end_errors() {
        let h = History::from_parts(
            vec![step(json!({}), json!({"a": 1})), end()],
            json!({"a": 1}),
            Vec::new(),
        );
        let err = h.undo(1).unwrap_err();
        assert_eq!(
            err,
            HistoryError::UnterminatedGroup {
                index: 1,
                marker: GroupMarker::End
            }
        );
    }

    #[test]
    fn test_redo_unmatched_begin_errors() {
        let h = History::from_parts(
            Vec::new(),
            json!({}),
            vec![begin(), step(json!({}), json!({"a": 1}))],
        );
        assert!(matches!(
            h.redo(1),
            Err(HistoryError::UnterminatedGroup {
                marker: GroupMarker::Begin,
                ..
            })
        ));
    }

    #[test]
    fn test_redo_orphan_end_errors() {
        let h = History::from_parts(Vec::new(), json!({}), vec![end()]);
        assert!(h.redo(1).is_err());
    }

    #[test]
    fn test_failed_multi_step_leaves_input_untouched() {
        let h = History::from_parts(
            vec![end(), step(json!({}), json!({"a": 1}))],
            json!({"a": 1}),
            Vec::new(),
        );
        let snapshot = h.clone();
        assert!(h.undo(2).is_err());
        assert_eq!(h, snapshot);
    }

    #[test]
    fn test_undo_discards_empty_open_group() {
        let h = History::from_parts(
            vec![step(json!({}), json!({"a": 1})), begin()],
            json!({"a": 1}),
            Vec::new(),
        );
        let h = h.undo(1).expect("undo");
        assert!(h.past().is_empty());
        assert_eq!(h.present(), &json!({}));
        assert_eq!(h.future().len(), 1);
    }

    #[test]
    fn test_undo_inside_open_group_reverts_single_entry() {
        let h = History::from_parts(
            vec![
                begin(),
                step(json!({}), json!({"a": 1})),
                step(json!({"a": 1}), json!({"a": 2})),
            ],
            json!({"a": 2}),
            Vec::new(),
        );
        let h = h.undo(1).expect("undo");
        assert_eq!(h.present(), &json!({"a": 1}));
        assert!(h.is_group_open());
    }

    #[test]
    fn test_redo_group_into_open_group_flattens() {
        let group = vec![begin(), step(json!({}), json!({"a": 1})), end()];
        let h = History::from_parts(vec![begin()], json!({}), group);
        let h = h.redo(1).expect("redo");
        assert_eq!(h.present(), &json!({"a": 1}));
        assert_eq!(h.past().len(), 2);
        assert!(h.is_group_open());
    }

    #[test]
    fn test_malformed_edit_surfaces_on_undo() {
        // Reverting an add deletes the key, which this present does not have.
        let add = EditList::new(vec![Edit::Add {
            path: EditPath::root().child("missing"),
            value: json!(1),
        }]);
        let h = History::from_parts(vec![HistoryEntry::Edits(add)], json!({}), Vec::new());
        assert!(matches!(h.undo(1), Err(HistoryError::MalformedEdit(_))));
    }
}
