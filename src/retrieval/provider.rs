//! Embedding provider trait.

use crate::types::Result;
use async_trait::async_trait;

/// Embedding provider trait.
///
/// Implemented by the local TF-IDF vectorizer and the OpenAI API
/// client. Providers are fitted/configured before they reach the
/// index; `embed` must accept any text from the same language domain.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embedding for a single text.
    ///
    /// # Errors
    ///
    /// Returns `AssistantError::Embedding` if generation fails
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for a batch of texts.
    ///
    /// # Errors
    ///
    /// Returns `AssistantError::Embedding` if generation fails
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embedding dimensionality.
    fn dimensions(&self) -> usize;
}
