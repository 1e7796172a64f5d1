//! Schema metadata extracted from PostgreSQL.
//!
//! The catalog is the single source of truth for retrieval and prompt
//! construction: every table the assistant can see is represented as a
//! [`TableInfo`] with its columns, and the whole set as a
//! [`SchemaCatalog`] keyed by qualified name.

use crate::types::{AssistantError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// A single column of a user table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnInfo {
    /// Column name
    pub name: String,

    /// PostgreSQL data type (e.g. "integer", "character varying")
    pub data_type: String,

    /// Whether the column accepts NULL
    pub nullable: bool,

    /// Column default expression, if any
    #[serde(default)]
    pub default: Option<String>,

    /// Comment from `col_description()`, empty if none
    #[serde(default)]
    pub description: String,
}

/// A user table with its columns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableInfo {
    /// Schema the table lives in (e.g. "public")
    pub schema: String,

    /// Table name without schema
    pub name: String,

    /// Columns in ordinal position order
    pub columns: Vec<ColumnInfo>,
}

impl TableInfo {
    /// Qualified `schema.table` name, the catalog key.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }

    /// One-line schema context for LLM prompts.
    ///
    /// Renders as `Table public.orders columns: id (integer), total (numeric)`.
    pub fn prompt_block(&self) -> String {
        let cols: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("{} ({})", c.name, c.data_type))
            .collect();
        format!("Table {} columns: {}", self.qualified_name(), cols.join(", "))
    }
}

/// Every table visible to the connected role.
///
/// Uses a `BTreeMap` so iteration order (and therefore prompt and
/// description order) is deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaCatalog {
    /// Tables keyed by qualified name
    pub tables: BTreeMap<String, TableInfo>,

    /// When the catalog was extracted (RFC 3339)
    #[serde(default)]
    pub extracted_at: String,
}

impl SchemaCatalog {
    /// Create a catalog from extracted tables.
    pub fn new(tables: Vec<TableInfo>) -> Self {
        let tables = tables
            .into_iter()
            .map(|t| (t.qualified_name(), t))
            .collect();
        Self {
            tables,
            extracted_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Number of tables in the catalog.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether the catalog holds no tables.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Look up a table by qualified name, or by bare name when the
    /// bare name is unambiguous.
    pub fn get(&self, name: &str) -> Option<&TableInfo> {
        if let Some(t) = self.tables.get(name) {
            return Some(t);
        }
        let mut matches = self.tables.values().filter(|t| t.name == name);
        let first = matches.next();
        if matches.next().is_some() {
            return None;
        }
        first
    }

    /// Schema context block for the given tables, one line per table.
    ///
    /// Unknown names are skipped; the caller has already validated
    /// them against the retrieval index.
    pub fn prompt_context(&self, table_names: &[String]) -> String {
        table_names
            .iter()
            .filter_map(|n| self.get(n))
            .map(|t| t.prompt_block())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Persist the catalog as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load a previously saved catalog.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            AssistantError::Schema(format!(
                "cannot read catalog file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}
