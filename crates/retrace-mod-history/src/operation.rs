/// Core types for edits, edit lists and history entries.
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The domain state tracked by the engine.
pub type State = Value;

/// One step of an [`EditPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Position within a sequence.
    Index(usize),
    /// Key within a mapping.
    Key(String),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Index(i) => write!(f, "{i}"),
            PathSegment::Key(k) => f.write_str(k),
        }
    }
}

impl From<usize> for PathSegment {
    fn from(i: usize) -> Self {
        PathSegment::Index(i)
    }
}

impl From<&str> for PathSegment {
    fn from(k: &str) -> Self {
        PathSegment::Key(k.to_string())
    }
}

/// Location of a value inside a state tree. The empty path is the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditPath(Vec<PathSegment>);

impl EditPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Splits into the parent path and the final segment.
    /// Returns `None` for the root path.
    pub fn split_last(&self) -> Option<(&[PathSegment], &PathSegment)> {
        self.0.split_last().map(|(last, parent)| (parent, last))
    }

    /// Returns a new path with `segment` appended.
    pub fn child(&self, segment: impl Into<PathSegment>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }
}

impl From<Vec<PathSegment>> for EditPath {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }
}

impl fmt::Display for EditPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.0 {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

/// Kind of an [`Edit`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    Add,
    Update,
    Delete,
}

/// A single atomic structural change at one path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Edit {
    /// A value that did not exist before.
    Add { path: EditPath, value: Value },
    /// A value replaced in place.
    Update { path: EditPath, old: Value, new: Value },
    /// A value that no longer exists.
    Delete { path: EditPath, old: Value },
}

impl Edit {
    pub fn path(&self) -> &EditPath {
        match self {
            Edit::Add { path, .. } | Edit::Update { path, .. } | Edit::Delete { path, .. } => path,
        }
    }

    pub fn kind(&self) -> EditKind {
        match self {
            Edit::Add { .. } => EditKind::Add,
            Edit::Update { .. } => EditKind::Update,
            Edit::Delete { .. } => EditKind::Delete,
        }
    }

    /// The edit that exactly undoes this one.
    pub fn inverse(&self) -> Edit {
        match self {
            Edit::Add { path, value } => Edit::Delete {
                path: path.clone(),
                old: value.clone(),
            },
            Edit::Update { path, old, new } => Edit::Update {
                path: path.clone(),
                old: new.clone(),
                new: old.clone(),
            },
            Edit::Delete { path, old } => Edit::Add {
                path: path.clone(),
                value: old.clone(),
            },
        }
    }
}

/// The ordered edits produced by one transition.
///
/// Immutable once built; recorded lists are never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditList(Vec<Edit>);

impl EditList {
    pub fn new(edits: Vec<Edit>) -> Self {
        Self(edits)
    }

    pub fn edits(&self) -> &[Edit] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Edit> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a EditList {
    type Item = &'a Edit;
    type IntoIter = std::slice::Iter<'a, Edit>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// History-facing group boundary tag.
///
/// Distinct from the configurable trigger names that open and close groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupMarker {
    Begin,
    End,
}

/// One element of the `past` or `future` sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryEntry {
    Edits(EditList),
    Marker(GroupMarker),
}

impl HistoryEntry {
    pub fn as_edits(&self) -> Option<&EditList> {
        match self {
            HistoryEntry::Edits(list) => Some(list),
            HistoryEntry::Marker(_) => None,
        }
    }

    pub fn marker(&self) -> Option<GroupMarker> {
        match self {
            HistoryEntry::Marker(m) => Some(*m),
            HistoryEntry::Edits(_) => None,
        }
    }
}

impl From<EditList> for HistoryEntry {
    fn from(list: EditList) -> Self {
        HistoryEntry::Edits(list)
    }
}
