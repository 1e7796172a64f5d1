//! Query intent extraction.
//!
//! A first, cheap LLM pass that pulls the question apart into target
//! columns, filter conditions, and the main subject. The result only
//! steers the SQL-generation prompt, so a malformed reply degrades to
//! the default intent instead of failing the question.

use crate::llm::client::LlmClient;
use crate::types::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

const INTENT_SYSTEM_PROMPT: &str = "\
You are an expert at understanding database queries.
Analyze the user's question and extract:
1. What specific information they want (columns)
2. Any conditions or filters
3. The main subject they're asking about

Format your response as JSON with these keys:
{
    \"target_columns\": [],
    \"conditions\": [],
    \"subject\": \"\",
    \"output_columns\": []
}
Return only the JSON object, no explanations.";

/// Structured intent extracted from a question.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct QueryIntent {
    /// Columns the user wants to see
    #[serde(default)]
    pub target_columns: Vec<String>,

    /// Filter conditions mentioned in the question
    #[serde(default)]
    pub conditions: Vec<String>,

    /// Main entity being queried
    #[serde(default)]
    pub subject: Option<String>,

    /// Final columns to show in the result
    #[serde(default)]
    pub output_columns: Vec<String>,
}

impl QueryIntent {
    /// Summary lines for the SQL-generation prompt.
    pub fn prompt_block(&self) -> String {
        format!(
            "- Looking for: {}\n- Subject: {}\n- Conditions: {}",
            if self.output_columns.is_empty() {
                "unspecified".to_string()
            } else {
                self.output_columns.join(", ")
            },
            self.subject.as_deref().unwrap_or("unspecified"),
            if self.conditions.is_empty() {
                "none".to_string()
            } else {
                self.conditions.join("; ")
            },
        )
    }
}

/// Extract intent from a natural language question.
///
/// # Errors
///
/// Returns `AssistantError::Llm` only for transport-level failures;
/// an unparseable reply logs a warning and yields the default intent.
pub async fn extract_intent(client: &LlmClient, question: &str) -> Result<QueryIntent> {
    let user_prompt = format!("Analyze this database query: {}", question);
    let response = client.complete(INTENT_SYSTEM_PROMPT, &user_prompt).await?;

    match serde_json::from_str::<QueryIntent>(&response) {
        Ok(intent) => Ok(intent),
        Err(e) => {
            warn!(error = %e, "intent reply was not valid JSON, using default intent");
            Ok(QueryIntent::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_deserializes_partial_json() {
        let intent: QueryIntent =
            serde_json::from_str("{\"subject\": \"employees\"}").unwrap();
        assert_eq!(intent.subject.as_deref(), Some("employees"));
        assert!(intent.target_columns.is_empty());
    }

    #[test]
    fn test_prompt_block_defaults() {
        let block = QueryIntent::default().prompt_block();
        assert!(block.contains("Looking for: unspecified"));
        assert!(block.contains("Subject: unspecified"));
        assert!(block.contains("Conditions: none"));
    }

    #[test]
    fn test_prompt_block_populated() {
        let intent = QueryIntent {
            target_columns: vec!["name".to_string()],
            conditions: vec!["salary > 50000".to_string()],
            subject: Some("employees".to_string()),
            output_columns: vec!["name".to_string(), "salary".to_string()],
        };
        let block = intent.prompt_block();
        assert!(block.contains("name, salary"));
        assert!(block.contains("employees"));
        assert!(block.contains("salary > 50000"));
    }
}
