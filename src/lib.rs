pub mod annotation;
pub mod ast;
pub mod config;
pub mod debounce;
pub mod editor;
pub mod history;
pub mod lexer;
pub mod measure;
pub mod model;
pub mod parser;
pub mod positions;
pub mod resolver;
pub mod serializer;
pub mod storage;

use std::time::Duration;

use wasm_bindgen::prelude::*;

use config::EditorConfig;
use editor::Editor;
use model::DiagramModel;

#[cfg(target_arch = "wasm32")]
type SessionStore = storage::BrowserStore;
#[cfg(not(target_arch = "wasm32"))]
type SessionStore = storage::MemoryStore;

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Parse and validate schema source, returning the model as JSON
#[wasm_bindgen(js_name = "parseSchema")]
pub fn parse_schema(source: &str) -> Result<String, String> {
    let model = DiagramModel::from_source(source);
    serde_json::to_string(&model).map_err(|e| e.to_string())
}

/// Export schema source as SQL DDL
#[wasm_bindgen(js_name = "exportSql")]
pub fn export_sql(source: &str) -> String {
    serializer::to_sql(&DiagramModel::from_source(source))
}

/// Editing session for a browser front end. Timestamps come from
/// `Date.now()` and the workspace is saved to `localStorage`.
#[wasm_bindgen]
pub struct DiagramSession {
    editor: Editor<SessionStore>,
}

fn now() -> Duration {
    Duration::from_millis(js_sys::Date::now() as u64)
}

#[wasm_bindgen]
impl DiagramSession {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            editor: Editor::new(SessionStore::default(), EditorConfig::default()),
        }
    }

    /// Reload the saved workspace. `false` when nothing was saved.
    pub fn restore(&mut self) -> Result<bool, String> {
        self.editor.restore().map_err(|e| e.to_string())
    }

    /// Replace the text at once, e.g. when opening a file.
    #[wasm_bindgen(js_name = "loadSource")]
    pub fn load_source(&mut self, text: String) {
        self.editor.replace_source(text);
    }

    pub fn edit(&mut self, text: String) {
        self.editor.edit(text, now());
    }

    /// Commit the pending edit once its quiet window has passed.
    pub fn tick(&mut self) -> bool {
        self.editor.tick(now())
    }

    #[wasm_bindgen(js_name = "flushEdit")]
    pub fn flush_edit(&mut self) -> bool {
        self.editor.flush_edit()
    }

    pub fn source(&self) -> String {
        self.editor.source().to_string()
    }

    #[wasm_bindgen(js_name = "modelJson")]
    pub fn model_json(&self) -> Result<String, String> {
        serde_json::to_string(self.editor.model()).map_err(|e| e.to_string())
    }

    #[wasm_bindgen(js_name = "positionsJson")]
    pub fn positions_json(&self) -> Result<String, String> {
        serde_json::to_string(self.editor.positions()).map_err(|e| e.to_string())
    }

    /// Position to draw `table` at, including an unfinished gesture, as
    /// `{"x":..,"y":..}` or `null`.
    #[wasm_bindgen(js_name = "livePositionJson")]
    pub fn live_position_json(&self, table: &str) -> Result<String, String> {
        serde_json::to_string(&self.editor.live_position(table)).map_err(|e| e.to_string())
    }

    #[wasm_bindgen(js_name = "beginDrag")]
    pub fn begin_drag(&mut self, table: &str) -> Result<(), String> {
        self.editor.begin_drag(table).map_err(|e| e.to_string())
    }

    #[wasm_bindgen(js_name = "dragTo")]
    pub fn drag_to(&mut self, x: f64, y: f64) -> bool {
        self.editor.drag_to(x, y)
    }

    #[wasm_bindgen(js_name = "beginPan")]
    pub fn begin_pan(&mut self) -> Result<(), String> {
        self.editor.begin_pan().map_err(|e| e.to_string())
    }

    #[wasm_bindgen(js_name = "panBy")]
    pub fn pan_by(&mut self, dx: f64, dy: f64) -> bool {
        self.editor.pan_by(dx, dy)
    }

    #[wasm_bindgen(js_name = "endGesture")]
    pub fn end_gesture(&mut self) -> bool {
        self.editor.end_gesture()
    }

    #[wasm_bindgen(js_name = "resetLayout")]
    pub fn reset_layout(&mut self) -> bool {
        self.editor.reset_layout()
    }

    #[wasm_bindgen(js_name = "toggleLock")]
    pub fn toggle_lock(&mut self, table: &str) -> bool {
        self.editor.toggle_lock(table)
    }

    #[wasm_bindgen(js_name = "isLocked")]
    pub fn is_locked(&self, table: &str) -> bool {
        self.editor.is_locked(table)
    }

    #[wasm_bindgen(js_name = "canUndo")]
    pub fn can_undo(&self) -> bool {
        self.editor.history().can_undo()
    }

    #[wasm_bindgen(js_name = "canRedo")]
    pub fn can_redo(&self) -> bool {
        self.editor.history().can_redo()
    }

    pub fn undo(&mut self) -> bool {
        self.editor.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.editor.redo()
    }

    #[wasm_bindgen(js_name = "historyStatus")]
    pub fn history_status(&self) -> String {
        self.editor.history().status()
    }

    #[wasm_bindgen(js_name = "exportSql")]
    pub fn export_sql(&self) -> String {
        serializer::to_sql(self.editor.model())
    }
}

impl Default for DiagramSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO: &str = "Table users { id integer [pk] }\nTable posts { id integer [pk] }";

    #[test]
    fn test_session_history_buttons() {
        let mut session = DiagramSession::new();
        assert!(!session.restore().unwrap());
        assert!(!session.can_undo());

        session.load_source("Table users { id integer [pk] }".to_string());
        session.load_source(TWO.to_string());
        assert!(session.can_undo());
        assert!(!session.can_redo());

        assert!(session.undo());
        assert!(session.can_redo());
        assert_eq!(session.history_status(), "Edit 1 of 2");
    }

    #[test]
    fn test_session_live_position_and_locks() {
        let mut session = DiagramSession::new();
        session.load_source(TWO.to_string());

        session.begin_drag("posts").unwrap();
        session.drag_to(400.0, 80.0);
        assert_eq!(
            session.live_position_json("posts").unwrap(),
            r#"{"x":400.0,"y":80.0}"#
        );
        assert_eq!(
            session.positions_json().unwrap(),
            r#"{"users":{"x":50.0,"y":50.0},"posts":{"x":350.0,"y":50.0}}"#
        );
        assert!(session.end_gesture());
        assert_eq!(session.live_position_json("ghost").unwrap(), "null");

        assert!(session.toggle_lock("posts"));
        assert!(session.is_locked("posts"));
        assert!(session.begin_drag("posts").is_err());
    }
}
