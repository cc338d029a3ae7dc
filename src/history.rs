//! Bounded, linear undo/redo log over (source text, layout) snapshots.

use serde::{Deserialize, Serialize};

use crate::positions::PositionStore;

pub const DEFAULT_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Edit,
    Move,
}

impl ActionKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Edit => "Edit",
            Self::Move => "Move",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub source: String,
    pub positions: PositionStore,
    pub action: ActionKind,
}

impl HistoryEntry {
    pub fn new(source: impl Into<String>, positions: PositionStore, action: ActionKind) -> Self {
        Self {
            source: source.into(),
            positions,
            action,
        }
    }

    /// Same text and same layout. The action kind is not part of the state.
    fn same_state(&self, other: &Self) -> bool {
        self.source == other.source && self.positions == other.positions
    }
}

#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<HistoryEntry>,
    /// Index of the current entry; `None` while the log is empty.
    current: Option<usize>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl History {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            current: None,
            capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.current.map(|i| &self.entries[i])
    }

    /// Append `entry` after the current one, dropping the redo tail. Returns
    /// `false` when the entry equals the current state.
    pub fn record(&mut self, entry: HistoryEntry) -> bool {
        if self.current().is_some_and(|cur| cur.same_state(&entry)) {
            return false;
        }

        let keep = self.current.map_or(0, |i| i + 1);
        self.entries.truncate(keep);
        self.entries.push(entry);

        if self.entries.len() > self.capacity {
            self.entries.remove(0);
        }
        self.current = Some(self.entries.len() - 1);

        tracing::debug!(len = self.entries.len(), "history recorded");
        true
    }

    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        match self.current {
            Some(i) if i > 0 => {
                self.current = Some(i - 1);
                self.current()
            }
            _ => None,
        }
    }

    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        match self.current {
            Some(i) if i + 1 < self.entries.len() => {
                self.current = Some(i + 1);
                self.current()
            }
            _ => None,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.current.is_some_and(|i| i > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.current.is_some_and(|i| i + 1 < self.entries.len())
    }

    /// Human-readable position in the log, e.g. `Move 3 of 5`.
    pub fn status(&self) -> String {
        match self.current() {
            None => "No changes".to_string(),
            Some(entry) => format!(
                "{} {} of {}",
                entry.action.label(),
                self.current.map_or(0, |i| i + 1),
                self.entries.len()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(text: &str) -> HistoryEntry {
        HistoryEntry::new(text, PositionStore::new(), ActionKind::Edit)
    }

    #[test]
    fn test_empty_history() {
        let mut h = History::default();
        assert_eq!(h.current_index(), None);
        assert!(h.undo().is_none());
        assert!(h.redo().is_none());
        assert_eq!(h.status(), "No changes");
    }

    #[test]
    fn test_identical_entry_is_ignored() {
        let mut h = History::default();
        assert!(h.record(edit("a")));
        assert!(!h.record(edit("a")));

        let mut moved = edit("a");
        moved.action = ActionKind::Move;
        assert!(!h.record(moved));
        assert_eq!(h.len(), 1);
    }

    #[test]
    fn test_position_change_is_a_new_state() {
        let mut h = History::default();
        h.record(edit("a"));
        let mut positions = PositionStore::new();
        positions.set("t", 1.0, 1.0);
        assert!(h.record(HistoryEntry::new("a", positions, ActionKind::Move)));
        assert_eq!(h.status(), "Move 2 of 2");
    }

    #[test]
    fn test_undo_redo() {
        let mut h = History::default();
        h.record(edit("a"));
        h.record(edit("b"));
        h.record(edit("c"));

        assert_eq!(h.undo().unwrap().source, "b");
        assert_eq!(h.undo().unwrap().source, "a");
        assert!(h.undo().is_none());
        assert_eq!(h.redo().unwrap().source, "b");
        assert_eq!(h.redo().unwrap().source, "c");
        assert!(h.redo().is_none());
        assert_eq!(h.status(), "Edit 3 of 3");
    }

    #[test]
    fn test_record_after_undo_prunes_redo_tail() {
        let mut h = History::default();
        h.record(edit("e1"));
        h.record(edit("e2"));
        h.undo();
        h.record(edit("e3"));

        assert!(!h.can_redo());
        assert!(h.redo().is_none());
        assert_eq!(h.len(), 2);
        assert_eq!(h.undo().unwrap().source, "e1");
        assert_eq!(h.redo().unwrap().source, "e3");
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut h = History::default();
        for i in 0..=DEFAULT_CAPACITY {
            h.record(edit(&i.to_string()));
        }
        assert_eq!(h.len(), DEFAULT_CAPACITY);
        assert_eq!(h.current_index(), Some(DEFAULT_CAPACITY - 1));
        assert_eq!(h.current().unwrap().source, "100");

        while h.undo().is_some() {}
        assert_eq!(h.current().unwrap().source, "1");
    }

    #[test]
    fn test_can_undo_flags() {
        let mut h = History::with_capacity(3);
        assert!(!h.can_undo());
        h.record(edit("a"));
        assert!(!h.can_undo());
        h.record(edit("b"));
        assert!(h.can_undo());
        assert!(!h.can_redo());
    }
}
