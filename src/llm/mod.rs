//! LLM-backed stages: intent extraction and SQL generation.

pub mod client;
pub mod generate;
pub mod intent;

pub use client::{strip_markdown, LlmClient};
pub use generate::{clean_sql, validate_select, SqlGenerator};
pub use intent::{extract_intent, QueryIntent};
