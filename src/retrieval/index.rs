//! Table retrieval index.
//!
//! Holds one embedded description document per table and ranks tables
//! against a question by cosine similarity. The corpus is a handful of
//! tables, so an exact scan is both simpler and faster than any ANN
//! structure.

use crate::retrieval::describe::TableDescription;
use crate::retrieval::provider::EmbeddingProvider;
use crate::retrieval::tfidf::cosine_similarity;
use crate::types::{AssistantError, Result};
use tracing::debug;

/// Default number of tables handed to the SQL generator.
pub const DEFAULT_TOP_K: usize = 2;

/// Minimum cosine similarity for a table to count as relevant.
pub const MIN_SIMILARITY: f32 = 0.1;

/// A retrieved table with its similarity score.
#[derive(Debug, Clone, PartialEq)]
pub struct TableMatch {
    /// Qualified table name
    pub table_name: String,

    /// Cosine similarity to the question
    pub score: f32,
}

/// Embedded description index over the schema catalog.
pub struct TableIndex {
    entries: Vec<(TableDescription, Vec<f32>)>,
}

impl TableIndex {
    /// Embed the description documents and build the index.
    ///
    /// # Errors
    ///
    /// Returns `AssistantError::Embedding` if the provider fails or
    /// returns the wrong number of vectors.
    pub async fn build(
        provider: &dyn EmbeddingProvider,
        descriptions: Vec<TableDescription>,
    ) -> Result<Self> {
        let documents: Vec<String> = descriptions.iter().map(|d| d.document.clone()).collect();
        let vectors = provider.embed_batch(&documents).await?;

        if vectors.len() != descriptions.len() {
            return Err(AssistantError::Embedding(format!(
                "provider returned {} vectors for {} documents",
                vectors.len(),
                descriptions.len()
            )));
        }

        Ok(Self {
            entries: descriptions.into_iter().zip(vectors).collect(),
        })
    }

    /// Number of indexed tables.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rank tables against a question.
    ///
    /// Returns at most `top_k` matches scoring at least
    /// [`MIN_SIMILARITY`], best first. An empty result means no table
    /// is plausibly related to the question.
    ///
    /// # Errors
    ///
    /// Returns `AssistantError::Embedding` if embedding the question
    /// fails.
    pub async fn find_relevant(
        &self,
        provider: &dyn EmbeddingProvider,
        question: &str,
        top_k: usize,
    ) -> Result<Vec<TableMatch>> {
        let query_vector = provider.embed(question).await?;

        let mut matches: Vec<TableMatch> = self
            .entries
            .iter()
            .map(|(desc, vector)| TableMatch {
                table_name: desc.table_name.clone(),
                score: cosine_similarity(&query_vector, vector),
            })
            .filter(|m| m.score >= MIN_SIMILARITY)
            .collect();

        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        matches.truncate(top_k);

        debug!(question, matches = matches.len(), "table retrieval");
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::tfidf::TfidfVectorizer;

    fn descriptions() -> Vec<TableDescription> {
        vec![
            TableDescription {
                table_name: "public.employees".to_string(),
                document: "Table public.employees contains columns: salary, department \
                           This table named employees stores information about employees"
                    .to_string(),
            },
            TableDescription {
                table_name: "public.orders".to_string(),
                document: "Table public.orders contains columns: total, shipping address \
                           This table named orders stores information about orders"
                    .to_string(),
            },
        ]
    }

    async fn build_index() -> (TfidfVectorizer, TableIndex) {
        let descriptions = descriptions();
        let corpus: Vec<String> = descriptions.iter().map(|d| d.document.clone()).collect();
        let vectorizer = TfidfVectorizer::fit(&corpus).unwrap();
        let index = TableIndex::build(&vectorizer, descriptions).await.unwrap();
        (vectorizer, index)
    }

    #[tokio::test]
    async fn test_find_relevant_ranks_by_similarity() {
        let (vectorizer, index) = build_index().await;

        let matches = index
            .find_relevant(&vectorizer, "average salary by department", DEFAULT_TOP_K)
            .await
            .unwrap();

        assert!(!matches.is_empty());
        assert_eq!(matches[0].table_name, "public.employees");
    }

    #[tokio::test]
    async fn test_find_relevant_respects_threshold() {
        let (vectorizer, index) = build_index().await;

        // Nothing in the corpus mentions spacecraft.
        let matches = index
            .find_relevant(&vectorizer, "spacecraft telemetry quaternion", DEFAULT_TOP_K)
            .await
            .unwrap();

        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn test_find_relevant_truncates_to_top_k() {
        let (vectorizer, index) = build_index().await;

        let matches = index
            .find_relevant(&vectorizer, "table stores information", 1)
            .await
            .unwrap();

        assert!(matches.len() <= 1);
    }
}
