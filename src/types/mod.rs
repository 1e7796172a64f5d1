//! Core data types for the assistant.
//!
//! - `SchemaCatalog`, `TableInfo`, `ColumnInfo`: extracted database schema
//! - `AssistantError`: error types for all pipeline stages
//! - `Result`: convenient result type alias

pub mod error;
pub mod schema;

pub use error::{AssistantError, Result};
pub use schema::{ColumnInfo, SchemaCatalog, TableInfo};
