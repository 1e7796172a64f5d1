//! SQL generation from natural language.
//!
//! Builds the generation prompt from the retrieved tables only, asks
//! the model for a single PostgreSQL SELECT, then sanitizes and
//! validates the reply. Nothing reaches the database without parsing
//! as exactly one read-only query.

use crate::llm::client::{strip_markdown, LlmClient};
use crate::llm::intent::QueryIntent;
use crate::types::{AssistantError, Result, SchemaCatalog};
use regex::{Regex, RegexBuilder};
use sqlparser::ast::Statement;
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;
use tracing::debug;

const GENERATION_SYSTEM_PROMPT: &str = "\
You are an expert PostgreSQL query generator.
Given a database schema and a natural language query:
1. Generate a precise SQL query that gets exactly what's asked
2. Use specific column names instead of SELECT *
3. Include proper WHERE clauses for filtering
4. Use ILIKE for text matching to handle case-insensitivity
5. Only generate SELECT queries, never statements that modify data
6. Return only the SQL query, nothing else
7. Do not include any explanations or markdown, just the SQL query";

/// SQL generator over an [`LlmClient`].
pub struct SqlGenerator<'a> {
    client: &'a LlmClient,
}

impl<'a> SqlGenerator<'a> {
    /// Create a generator borrowing the shared client.
    pub fn new(client: &'a LlmClient) -> Self {
        Self { client }
    }

    /// Generate, sanitize, and validate SQL for a question.
    ///
    /// # Arguments
    ///
    /// * `question` - Natural language question
    /// * `catalog` - Full schema catalog
    /// * `tables` - Qualified names of the retrieved tables
    /// * `intent` - Extracted intent steering the prompt
    ///
    /// # Errors
    ///
    /// Returns `AssistantError::Llm` for API failures and
    /// `AssistantError::SqlValidation` when the reply cannot be
    /// reduced to a single SELECT statement.
    pub async fn generate(
        &self,
        question: &str,
        catalog: &SchemaCatalog,
        tables: &[String],
        intent: &QueryIntent,
    ) -> Result<String> {
        let schema_context = catalog.prompt_context(tables);
        if schema_context.is_empty() {
            return Err(AssistantError::Schema(
                "no schema context available for the retrieved tables".to_string(),
            ));
        }

        let user_prompt = format!(
            "Database Schema:\n{}\n\nNatural Language Query: {}\n\nIntent Analysis:\n{}\n\n\
             Generate a precise SQL query that gets exactly what's asked.",
            schema_context,
            question,
            intent.prompt_block()
        );

        let response = self.client.complete(GENERATION_SYSTEM_PROMPT, &user_prompt).await?;
        debug!(raw = %response, "raw SQL from model");

        let sql = clean_sql(&response)?;
        validate_select(&sql)?;
        Ok(sql)
    }
}

/// Sanitize a model reply into a single SQL statement string.
///
/// Strips SQL comments and markdown fences, extracts the first
/// `SELECT … ;` run if present, otherwise requires the text to start
/// with SELECT and appends the missing semicolon. Whitespace is
/// collapsed to single spaces.
///
/// # Errors
///
/// Returns `AssistantError::SqlValidation` if no SELECT can be found.
pub fn clean_sql(raw: &str) -> Result<String> {
    let text = strip_markdown(raw);

    // Strip -- line comments and /* */ block comments.
    let line_comments = RegexBuilder::new(r"--[^\n]*")
        .build()
        .expect("static regex");
    let block_comments = RegexBuilder::new(r"/\*.*?\*/")
        .dot_matches_new_line(true)
        .build()
        .expect("static regex");
    let text = line_comments.replace_all(&text, "");
    let text = block_comments.replace_all(&text, "");

    // First complete SELECT ... ; run, if the reply contains one.
    let select_run = RegexBuilder::new(r"SELECT.*?;")
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
        .expect("static regex");

    let sql = match select_run.find(&text) {
        Some(m) => m.as_str().to_string(),
        None => {
            let trimmed = text.trim();
            if !starts_with_select(trimmed) {
                return Err(AssistantError::sql(format!(
                    "reply does not contain a SELECT statement: {}",
                    truncate_for_error(trimmed)
                )));
            }
            let mut sql = trimmed.to_string();
            if !sql.ends_with(';') {
                sql.push(';');
            }
            sql
        }
    };

    // Collapse whitespace.
    Ok(sql.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Validate that the SQL parses as exactly one read-only query.
///
/// # Errors
///
/// Returns `AssistantError::SqlValidation` for parse failures,
/// multiple statements, or any statement kind other than a query.
pub fn validate_select(sql: &str) -> Result<()> {
    let statements = Parser::parse_sql(&PostgreSqlDialect {}, sql)
        .map_err(|e| AssistantError::sql(format!("generated SQL does not parse: {}", e)))?;

    match statements.as_slice() {
        [Statement::Query(_)] => Ok(()),
        [] => Err(AssistantError::sql("generated SQL is empty")),
        [_] => Err(AssistantError::sql(
            "generated SQL is not a SELECT query; refusing to execute",
        )),
        _ => Err(AssistantError::sql(
            "generated SQL contains multiple statements; refusing to execute",
        )),
    }
}

fn starts_with_select(text: &str) -> bool {
    let head: String = text.chars().take(6).collect();
    head.eq_ignore_ascii_case("select")
}

fn truncate_for_error(text: &str) -> String {
    let re = Regex::new(r"\s+").expect("static regex");
    let flat = re.replace_all(text, " ");
    flat.chars().take(120).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_sql_plain() {
        let sql = clean_sql("SELECT name, salary FROM employees WHERE salary > 50000;").unwrap();
        assert_eq!(sql, "SELECT name, salary FROM employees WHERE salary > 50000;");
    }

    #[test]
    fn test_clean_sql_strips_fences() {
        let sql = clean_sql("```sql\nSELECT name\nFROM employees;\n```").unwrap();
        assert_eq!(sql, "SELECT name FROM employees;");
    }

    #[test]
    fn test_clean_sql_strips_comments() {
        let raw = "-- the employees\nSELECT name /* all of them */ FROM employees;";
        assert_eq!(clean_sql(raw).unwrap(), "SELECT name FROM employees;");
    }

    #[test]
    fn test_clean_sql_extracts_first_statement() {
        let raw = "Here is your query: SELECT name FROM employees; hope that helps!";
        assert_eq!(clean_sql(raw).unwrap(), "SELECT name FROM employees;");
    }

    #[test]
    fn test_clean_sql_appends_semicolon() {
        let sql = clean_sql("SELECT name FROM employees").unwrap();
        assert_eq!(sql, "SELECT name FROM employees;");
    }

    #[test]
    fn test_clean_sql_rejects_non_select() {
        assert!(clean_sql("DROP TABLE employees;").is_err());
        assert!(clean_sql("I cannot answer that question.").is_err());
    }

    #[test]
    fn test_validate_accepts_select() {
        validate_select("SELECT name FROM employees WHERE name ILIKE '%bob%';").unwrap();
        validate_select("WITH t AS (SELECT 1 AS x) SELECT x FROM t;").unwrap();
    }

    #[test]
    fn test_validate_rejects_writes() {
        assert!(validate_select("DELETE FROM employees;").is_err());
        assert!(validate_select("UPDATE employees SET salary = 0;").is_err());
        assert!(validate_select("INSERT INTO employees VALUES (1);").is_err());
    }

    #[test]
    fn test_validate_rejects_stacked_statements() {
        assert!(validate_select("SELECT 1; DROP TABLE employees;").is_err());
    }

    #[test]
    fn test_validate_rejects_garbage() {
        assert!(validate_select("SELECT FROM WHERE;").is_err());
    }

    #[test]
    fn test_clean_then_validate_blocks_injection() {
        // The SELECT ... ; extraction keeps only the first statement,
        // and the parser gate confirms it.
        let cleaned = clean_sql("SELECT 1; DROP TABLE employees;").unwrap();
        assert_eq!(cleaned, "SELECT 1;");
        validate_select(&cleaned).unwrap();
    }
}
