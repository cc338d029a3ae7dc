use crate::model::Table;

/// Estimated on-screen height of a table box. Reset layout stacks tables with
/// these heights since no renderer is around to report real ones.
pub struct TextMetrics {
    pub line_height: f64,
    pub header_padding: f64,
    pub body_padding: f64,
    pub min_table_height: f64,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            line_height: 20.0,
            header_padding: 4.0,
            body_padding: 8.0,
            min_table_height: 60.0,
        }
    }
}

impl TextMetrics {
    /// Header row plus one line per field, never below the minimum.
    pub fn table_height(&self, table: &Table) -> f64 {
        let header = self.line_height + self.header_padding * 2.0;
        let body = match table.fields.len() {
            0 => 0.0,
            n => n as f64 * self.line_height + self.body_padding * 2.0,
        };
        (header + body).max(self.min_table_height)
    }
}
