//! Chat completion client for hosted LLM APIs.
//!
//! Dispatches to the Anthropic Messages API or the OpenAI Chat
//! Completions API based on the configured model. Both stages that
//! need a model (intent extraction, SQL generation) go through
//! [`LlmClient::complete`].

use crate::config::{LlmProvider, LlmSettings};
use crate::types::{AssistantError, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

/// Response token budget for both providers.
const MAX_TOKENS: u32 = 1024;

/// OpenAI chat completion response.
#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIMessage {
    content: String,
}

/// Anthropic messages response.
#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContent {
    text: String,
}

/// Provider-dispatching chat client.
pub struct LlmClient {
    settings: LlmSettings,
    client: Client,
}

impl LlmClient {
    /// Create a client from settings.
    pub fn new(settings: LlmSettings) -> Self {
        Self {
            settings,
            client: Client::new(),
        }
    }

    /// Create a client from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AssistantError::Config` if the API key for the
    /// configured model is not set.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(LlmSettings::from_env()?))
    }

    /// Model name this client is configured for.
    pub fn model(&self) -> &str {
        &self.settings.model
    }

    /// Send a system + user prompt and return the stripped reply text.
    ///
    /// # Errors
    ///
    /// Returns `AssistantError::Llm` on transport failure, non-2xx
    /// status, or an empty response.
    pub async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let text = match self.settings.provider {
            LlmProvider::Anthropic => self.call_anthropic(system_prompt, user_prompt).await?,
            LlmProvider::OpenAI => self.call_openai(system_prompt, user_prompt).await?,
        };
        Ok(strip_markdown(&text))
    }

    async fn call_anthropic(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.settings.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&json!({
                "model": self.settings.model,
                "max_tokens": MAX_TOKENS,
                "system": system_prompt,
                "messages": [
                    {"role": "user", "content": user_prompt}
                ],
                "temperature": 0.0
            }))
            .send()
            .await
            .map_err(|e| AssistantError::llm(format!("Anthropic API error: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AssistantError::llm(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(AssistantError::llm(format!(
                "Anthropic API error {}: {}",
                status, body
            )));
        }

        let parsed: AnthropicResponse = serde_json::from_str(&body).map_err(|e| {
            AssistantError::llm(format!("Failed to parse Anthropic response: {}", e))
        })?;

        Ok(parsed
            .content
            .first()
            .ok_or_else(|| AssistantError::llm("No response from Anthropic"))?
            .text
            .clone())
    }

    async fn call_openai(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let response = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .header("Authorization", format!("Bearer {}", self.settings.api_key))
            .header("Content-Type", "application/json")
            .json(&json!({
                "model": self.settings.model,
                "messages": [
                    {"role": "system", "content": system_prompt},
                    {"role": "user", "content": user_prompt}
                ],
                "temperature": 0.0,
                "max_tokens": MAX_TOKENS
            }))
            .send()
            .await
            .map_err(|e| AssistantError::llm(format!("OpenAI API error: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AssistantError::llm(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(AssistantError::llm(format!(
                "OpenAI API error {}: {}",
                status, body
            )));
        }

        let parsed: OpenAIResponse = serde_json::from_str(&body)
            .map_err(|e| AssistantError::llm(format!("Failed to parse OpenAI response: {}", e)))?;

        Ok(parsed
            .choices
            .first()
            .ok_or_else(|| AssistantError::llm("No response from OpenAI"))?
            .message
            .content
            .clone())
    }
}

/// Strip markdown code blocks from an LLM response.
///
/// Handles:
/// - ```json ... ```
/// - ```sql ... ```
/// - ``` ... ```
pub fn strip_markdown(text: &str) -> String {
    let text = text.trim();

    if text.starts_with("```") {
        let start = text.find('\n').map(|i| i + 1).unwrap_or(0);
        let end = text.rfind("```").unwrap_or(text.len());
        if end > start {
            return text[start..end].trim().to_string();
        }
    }

    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_markdown_json_fence() {
        let input = "```json\n{\"a\": 1}\n```";
        assert_eq!(strip_markdown(input), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_markdown_sql_fence() {
        let input = "```sql\nSELECT 1;\n```";
        assert_eq!(strip_markdown(input), "SELECT 1;");
    }

    #[test]
    fn test_strip_markdown_bare_fence() {
        let input = "```\nSELECT name FROM t;\n```";
        assert_eq!(strip_markdown(input), "SELECT name FROM t;");
    }

    #[test]
    fn test_strip_markdown_no_fence() {
        assert_eq!(strip_markdown("  SELECT 1;  "), "SELECT 1;");
    }
}
