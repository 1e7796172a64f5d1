//! nlsql - natural-language-to-SQL assistant for PostgreSQL.
//!
//! Pipeline:
//! - introspect the connected database into a [`types::SchemaCatalog`]
//! - embed generated table descriptions ([`retrieval`])
//! - retrieve the tables relevant to a question by cosine similarity
//! - ask a hosted LLM for a single SELECT ([`llm`])
//! - validate with a real SQL parser, execute, and render ([`output`])
//!
//! The [`assistant::Assistant`] facade wires the stages together; the
//! `nlsql` binary drives it from the command line.

pub mod assistant;
pub mod config;
pub mod db;
pub mod llm;
pub mod output;
pub mod retrieval;
pub mod types;

pub use assistant::{Answer, Assistant};
pub use types::{AssistantError, Result};
