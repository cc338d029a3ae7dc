use std::path::Path;

use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Default grid used for tables that have no stored position yet.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub origin_x: f64,
    pub origin_y: f64,
    pub cell: f64,
    /// Once the running x offset exceeds this, placement wraps to a new row.
    pub wrap_x: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            origin_x: 50.0,
            origin_y: 50.0,
            cell: 300.0,
            wrap_x: 900.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Quiet window after the last text edit before it is committed.
    pub debounce_ms: u64,
    pub history_capacity: usize,
    pub grid: GridConfig,
    /// Margin and vertical gap used by reset layout.
    pub reset_padding: f64,
    pub diagram_key: String,
    pub locks_key: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            history_capacity: 100,
            grid: GridConfig::default(),
            reset_padding: 30.0,
            diagram_key: "diagram".to_string(),
            locks_key: "lockedTables".to_string(),
        }
    }
}

impl EditorConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(EditorConfig::from_toml("").unwrap(), EditorConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = EditorConfig::from_toml("debounce_ms = 50\n[grid]\ncell = 250.0\n").unwrap();
        assert_eq!(config.debounce_ms, 50);
        assert_eq!(config.grid.cell, 250.0);
        assert_eq!(config.grid.wrap_x, 900.0);
        assert_eq!(config.history_capacity, 100);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            EditorConfig::from_toml("debounce_ms = \"soon\""),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dbsketch.toml");
        std::fs::write(&path, "history_capacity = 10\n").unwrap();
        assert_eq!(EditorConfig::load(&path).unwrap().history_capacity, 10);
    }
}
