//! Query result rendering.
//!
//! Results arrive as text cells (the simple-query protocol renders
//! every value server-side), so display is a pure formatting concern:
//! an aligned ruled table for the terminal, or CSV for export.

use crate::types::{AssistantError, Result};
use std::path::Path;

/// Widest a single cell is allowed to render.
const MAX_CELL_WIDTH: usize = 60;

/// Rows returned by a query, all values as text.
///
/// `None` is SQL NULL, distinct from an empty string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    /// Column names in select-list order
    pub columns: Vec<String>,

    /// Row values, one `Vec` per row
    pub rows: Vec<Vec<Option<String>>>,
}

impl ResultSet {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the result has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render as an aligned text table with a row-count footer.
    ///
    /// NULL renders as empty, long cells are truncated with an
    /// ellipsis at 60 characters.
    pub fn render_table(&self) -> String {
        if self.columns.is_empty() {
            return "(no columns)\n".to_string();
        }

        let display = |cell: &Option<String>| -> String {
            let text = cell.as_deref().unwrap_or("");
            if text.chars().count() > MAX_CELL_WIDTH {
                let truncated: String = text.chars().take(MAX_CELL_WIDTH - 1).collect();
                format!("{}…", truncated)
            } else {
                text.to_string()
            }
        };

        // Column widths from header and data.
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(display(cell).chars().count());
                }
            }
        }

        let rule = {
            let mut s = String::from("+");
            for w in &widths {
                s.push_str(&"-".repeat(w + 2));
                s.push('+');
            }
            s.push('\n');
            s
        };

        let format_row = |cells: &[String]| -> String {
            let mut s = String::from("|");
            for (i, w) in widths.iter().enumerate() {
                let text = cells.get(i).map(String::as_str).unwrap_or("");
                let pad = w - text.chars().count();
                s.push(' ');
                s.push_str(text);
                s.push_str(&" ".repeat(pad + 1));
                s.push('|');
            }
            s.push('\n');
            s
        };

        let mut out = String::new();
        out.push_str(&rule);
        out.push_str(&format_row(&self.columns));
        out.push_str(&rule);
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(display).collect();
            out.push_str(&format_row(&cells));
        }
        out.push_str(&rule);
        out.push_str(&format!(
            "({} row{})\n",
            self.rows.len(),
            if self.rows.len() == 1 { "" } else { "s" }
        ));
        out
    }

    /// Write the result set to a CSV file.
    ///
    /// NULL is written as an empty field.
    ///
    /// # Errors
    ///
    /// Returns `AssistantError::Export` if writing fails.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = csv::Writer::from_path(&path).map_err(|e| {
            AssistantError::Export(format!("cannot open {}: {}", path.as_ref().display(), e))
        })?;

        writer
            .write_record(&self.columns)
            .map_err(|e| AssistantError::Export(e.to_string()))?;
        for row in &self.rows {
            let record: Vec<&str> = row.iter().map(|c| c.as_deref().unwrap_or("")).collect();
            writer
                .write_record(&record)
                .map_err(|e| AssistantError::Export(e.to_string()))?;
        }
        writer
            .flush()
            .map_err(|e| AssistantError::Export(e.to_string()))?;
        Ok(())
    }
}
