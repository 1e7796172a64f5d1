//! OpenAI embedding API client.
//!
//! Remote alternative to the TF-IDF backend, selected with
//! `NLSQL_EMBEDDINGS=openai:<model>`.

use crate::retrieval::provider::EmbeddingProvider;
use crate::types::{AssistantError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct EmbeddingRequest {
    model: String,
    input: serde_json::Value, // String or Vec<String>
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// OpenAI embedding provider.
pub struct OpenAIEmbedder {
    api_key: String,
    model: String,
    dimensions: usize,
    client: Client,
}

impl OpenAIEmbedder {
    /// Create a new OpenAI embedder.
    ///
    /// # Arguments
    ///
    /// * `api_key` - OpenAI API key
    /// * `model` - Model name (e.g. "text-embedding-3-small")
    pub fn new(api_key: String, model: String) -> Self {
        let dimensions = match model.as_str() {
            "text-embedding-3-small" => 1536,
            "text-embedding-3-large" => 3072,
            "text-embedding-ada-002" => 1536,
            _ => 1536,
        };

        Self {
            api_key,
            model,
            dimensions,
            client: Client::new(),
        }
    }

    /// Create from `OPENAI_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns `AssistantError::Config` if the key is not set.
    pub fn from_env(model: String) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            AssistantError::config("OPENAI_API_KEY environment variable not set")
        })?;
        Ok(Self::new(api_key, model))
    }

    async fn call_api(&self, input: serde_json::Value) -> Result<Vec<Vec<f32>>> {
        let request = EmbeddingRequest {
            model: self.model.clone(),
            input,
        };

        let response = self
            .client
            .post("https://api.openai.com/v1/embeddings")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| AssistantError::Embedding(format!("OpenAI API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AssistantError::Embedding(format!(
                "OpenAI API error ({}): {}",
                status, error_text
            )));
        }

        let embedding_response: EmbeddingResponse = response.json().await.map_err(|e| {
            AssistantError::Embedding(format!("Failed to parse OpenAI response: {}", e))
        })?;

        Ok(embedding_response
            .data
            .into_iter()
            .map(|d| d.embedding)
            .collect())
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.call_api(serde_json::json!(text)).await?;

        embeddings.into_iter().next().ok_or_else(|| {
            AssistantError::Embedding("No embedding returned from OpenAI".to_string())
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.call_api(serde_json::json!(texts)).await
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
