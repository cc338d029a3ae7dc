use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::GridConfig;
use crate::measure::TextMetrics;
use crate::model::DiagramModel;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Table name → coordinates. Independent of the parse result: entries for
/// tables that disappeared from the source are kept so re-adding a table
/// brings back its old place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionStore {
    positions: IndexMap<String, Position>,
}

impl PositionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Position> {
        self.positions.get(name).copied()
    }

    /// Store a position. Returns `false` when nothing changed.
    pub fn set(&mut self, name: &str, x: f64, y: f64) -> bool {
        let pos = Position::new(x, y);
        if self.get(name) == Some(pos) {
            return false;
        }
        self.positions.insert(name.to_string(), pos);
        true
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Position)> {
        self.positions.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Give every table of `model` without a stored position a slot on the
    /// default grid, in declaration order.
    pub fn place_new_tables(&mut self, model: &DiagramModel, grid: &GridConfig) {
        let mut x = grid.origin_x;
        let mut y = grid.origin_y;

        for name in model.tables.keys() {
            if self.positions.contains_key(name) {
                continue;
            }
            self.positions.insert(name.clone(), Position::new(x, y));
            x += grid.cell;
            if x > grid.wrap_x {
                x = grid.origin_x;
                y += grid.cell;
            }
        }
    }

    /// Stack every table of `model` in one column, `padding` apart.
    pub fn stack_vertically(&mut self, model: &DiagramModel, metrics: &TextMetrics, padding: f64) -> bool {
        let mut changed = false;
        let mut y = padding;
        for table in model.tables.values() {
            changed |= self.set(&table.name, padding, y);
            let height = metrics.table_height(table);
            y += height + padding;
        }
        changed
    }

    /// Shift every table of `model` by the same delta.
    pub fn translate(&mut self, model: &DiagramModel, dx: f64, dy: f64) -> bool {
        let mut changed = false;
        for name in model.tables.keys() {
            if let Some(pos) = self.get(name) {
                let moved = pos.offset(dx, dy);
                changed |= self.set(name, moved.x, moved.y);
            }
        }
        changed
    }
}
