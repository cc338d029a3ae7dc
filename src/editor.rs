//! The editing session: owns the source text, the parsed model, the layout,
//! the undo log and the persistence collaborator, and turns user events into
//! commits.

use std::collections::BTreeSet;
use std::time::Duration;

use crate::config::EditorConfig;
use crate::debounce::Debouncer;
use crate::history::{ActionKind, History, HistoryEntry};
use crate::measure::TextMetrics;
use crate::model::DiagramModel;
use crate::positions::{Position, PositionStore};
use crate::storage::{KeyValueStore, SavedDiagram, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("Table '{0}' is locked")]
    TableLocked(String),
    #[error("Unknown table '{0}'")]
    UnknownTable(String),
    #[error("A drag or pan gesture is already in progress")]
    GestureInProgress,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Pointer gesture in progress. Intermediate positions live here and are only
/// written to the position store when the gesture ends.
#[derive(Debug, Clone, PartialEq)]
enum Gesture {
    Table {
        name: String,
        start: Position,
        current: Position,
    },
    Pan {
        dx: f64,
        dy: f64,
    },
}

pub struct Editor<S: KeyValueStore> {
    config: EditorConfig,
    store: S,
    metrics: TextMetrics,
    source: String,
    model: DiagramModel,
    positions: PositionStore,
    history: History,
    pending_edit: Debouncer<String>,
    gesture: Option<Gesture>,
    locked: BTreeSet<String>,
}

impl<S: KeyValueStore> Editor<S> {
    pub fn new(store: S, config: EditorConfig) -> Self {
        let locked = match store.load(&config.locks_key) {
            Ok(Some(value)) => serde_json::from_value(value).unwrap_or_else(|err| {
                tracing::warn!(%err, "ignoring unreadable table locks");
                BTreeSet::new()
            }),
            Ok(None) => BTreeSet::new(),
            Err(err) => {
                tracing::warn!(%err, "failed to load table locks");
                BTreeSet::new()
            }
        };

        Self {
            history: History::with_capacity(config.history_capacity),
            pending_edit: Debouncer::new(Duration::from_millis(config.debounce_ms)),
            config,
            store,
            metrics: TextMetrics::default(),
            source: String::new(),
            model: DiagramModel::default(),
            positions: PositionStore::new(),
            gesture: None,
            locked,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn model(&self) -> &DiagramModel {
        &self.model
    }

    pub fn positions(&self) -> &PositionStore {
        &self.positions
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Where `table` should be drawn right now, including an unfinished
    /// gesture.
    pub fn live_position(&self, table: &str) -> Option<Position> {
        let stored = self.positions.get(table);
        match &self.gesture {
            Some(Gesture::Table { name, current, .. }) if name == table => Some(*current),
            Some(Gesture::Pan { dx, dy }) if self.model.tables.contains_key(table) => {
                stored.map(|p| p.offset(*dx, *dy))
            }
            _ => stored,
        }
    }

    // --- text edits ---

    /// Queue a text edit. It is committed by `tick` once no further edit has
    /// arrived for the configured quiet window.
    pub fn edit(&mut self, text: impl Into<String>, now: Duration) {
        self.pending_edit.schedule(text.into(), now);
    }

    pub fn has_pending_edit(&self) -> bool {
        self.pending_edit.is_pending()
    }

    /// Commit the pending edit if its quiet window has elapsed.
    pub fn tick(&mut self, now: Duration) -> bool {
        match self.pending_edit.poll(now) {
            Some(text) => {
                self.commit_source(text);
                true
            }
            None => false,
        }
    }

    /// Commit the pending edit right away.
    pub fn flush_edit(&mut self) -> bool {
        match self.pending_edit.flush() {
            Some(text) => {
                self.commit_source(text);
                true
            }
            None => false,
        }
    }

    /// Replace the whole source text immediately, bypassing the debounce.
    pub fn replace_source(&mut self, text: impl Into<String>) {
        self.pending_edit.cancel();
        self.commit_source(text.into());
    }

    fn commit_source(&mut self, text: String) {
        self.source = text;
        self.regenerate();
        self.record(ActionKind::Edit);
        self.persist();
    }

    // --- gestures ---

    pub fn begin_drag(&mut self, table: &str) -> Result<(), EditorError> {
        if self.gesture.is_some() {
            return Err(EditorError::GestureInProgress);
        }
        if self.locked.contains(table) {
            return Err(EditorError::TableLocked(table.to_string()));
        }
        let start = self
            .model
            .tables
            .contains_key(table)
            .then(|| self.positions.get(table))
            .flatten()
            .ok_or_else(|| EditorError::UnknownTable(table.to_string()))?;

        self.gesture = Some(Gesture::Table {
            name: table.to_string(),
            start,
            current: start,
        });
        Ok(())
    }

    /// Move the dragged table. Returns `false` when no table drag is active.
    pub fn drag_to(&mut self, x: f64, y: f64) -> bool {
        match &mut self.gesture {
            Some(Gesture::Table { current, .. }) => {
                *current = Position::new(x, y);
                true
            }
            _ => false,
        }
    }

    pub fn begin_pan(&mut self) -> Result<(), EditorError> {
        if self.gesture.is_some() {
            return Err(EditorError::GestureInProgress);
        }
        self.gesture = Some(Gesture::Pan { dx: 0.0, dy: 0.0 });
        Ok(())
    }

    /// Accumulate a pan delta. Returns `false` when no pan is active.
    pub fn pan_by(&mut self, ddx: f64, ddy: f64) -> bool {
        match &mut self.gesture {
            Some(Gesture::Pan { dx, dy }) => {
                *dx += ddx;
                *dy += ddy;
                true
            }
            _ => false,
        }
    }

    /// Finish the active gesture and commit its final positions. Returns
    /// `true` when the layout changed.
    pub fn end_gesture(&mut self) -> bool {
        let changed = match self.gesture.take() {
            Some(Gesture::Table {
                name,
                start,
                current,
            }) => current != start && self.positions.set(&name, current.x, current.y),
            Some(Gesture::Pan { dx, dy }) => self.positions.translate(&self.model, dx, dy),
            None => false,
        };

        if changed {
            self.record(ActionKind::Move);
            self.persist();
        }
        changed
    }

    /// Drop the active gesture without touching the layout.
    pub fn cancel_gesture(&mut self) {
        self.gesture = None;
    }

    /// Stack every table in one column.
    pub fn reset_layout(&mut self) -> bool {
        let changed =
            self.positions
                .stack_vertically(&self.model, &self.metrics, self.config.reset_padding);
        if changed {
            self.record(ActionKind::Move);
            self.persist();
        }
        changed
    }

    // --- locks ---

    pub fn is_locked(&self, table: &str) -> bool {
        self.locked.contains(table)
    }

    /// Flip the lock of `table` and return whether it is now locked.
    pub fn toggle_lock(&mut self, table: &str) -> bool {
        let locked = if self.locked.remove(table) {
            false
        } else {
            self.locked.insert(table.to_string());
            true
        };

        let value = serde_json::json!(self.locked);
        if let Err(err) = self.store.save(&self.config.locks_key, value) {
            tracing::warn!(%err, "failed to save table locks");
        }
        locked
    }

    // --- history ---

    pub fn undo(&mut self) -> bool {
        match self.history.undo().cloned() {
            Some(entry) => {
                self.apply(entry);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo().cloned() {
            Some(entry) => {
                self.apply(entry);
                true
            }
            None => false,
        }
    }

    /// Replace text and layout wholesale. Never records.
    fn apply(&mut self, entry: HistoryEntry) {
        self.pending_edit.cancel();
        self.gesture = None;
        self.source = entry.source;
        self.positions = entry.positions;
        self.regenerate();
        self.persist();
        tracing::info!(status = %self.history.status(), "applied history entry");
    }

    fn record(&mut self, action: ActionKind) {
        let entry = HistoryEntry::new(self.source.clone(), self.positions.clone(), action);
        self.history.record(entry);
    }

    // --- persistence ---

    /// Load the saved workspace, if any. Returns `true` when something was
    /// restored.
    pub fn restore(&mut self) -> Result<bool, EditorError> {
        let Some(value) = self.store.load(&self.config.diagram_key)? else {
            return Ok(false);
        };
        let saved: SavedDiagram = serde_json::from_value(value).map_err(StorageError::from)?;
        if saved.content.is_empty() {
            return Ok(false);
        }

        self.pending_edit.cancel();
        self.source = saved.content;
        if let Some(positions) = saved.positions {
            self.positions = positions;
        }
        self.regenerate();
        self.record(ActionKind::Edit);
        tracing::info!(tables = self.model.tables.len(), "restored saved diagram");
        Ok(true)
    }

    fn persist(&mut self) {
        let saved = SavedDiagram {
            content: self.source.clone(),
            positions: Some(self.positions.clone()),
        };
        let result = serde_json::to_value(&saved)
            .map_err(StorageError::from)
            .and_then(|value| self.store.save(&self.config.diagram_key, value));
        if let Err(err) = result {
            tracing::warn!(%err, "failed to save diagram");
        }
    }

    fn regenerate(&mut self) {
        self.model = DiagramModel::from_source(&self.source);
        self.positions.place_new_tables(&self.model, &self.config.grid);
    }
}
