//! TF-IDF vectorizer over table description documents.
//!
//! Local, deterministic embedding backend: lowercase word tokens,
//! English stop-word removal, unigrams and bigrams, a capped
//! vocabulary, smooth inverse document frequency and L2-normalized
//! vectors. Cosine similarity between a question vector and the table
//! vectors drives retrieval.

use crate::retrieval::provider::EmbeddingProvider;
use crate::types::{AssistantError, Result};
use async_trait::async_trait;
use regex::Regex;
use std::collections::{HashMap, HashSet};

/// Vocabulary cap, most frequent terms kept.
const MAX_FEATURES: usize = 5000;

/// Common English stop words removed before n-gram construction.
const STOP_WORDS: [&str; 48] = [
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "have", "he", "her",
    "his", "i", "in", "is", "it", "its", "me", "my", "no", "not", "of", "on", "or", "our", "she",
    "so", "than", "that", "the", "their", "them", "then", "there", "these", "they", "this", "to",
    "was", "we", "were", "which", "with", "you", "your",
];

/// Fitted TF-IDF vectorizer.
///
/// Construct with [`TfidfVectorizer::fit`], then [`transform`] anything
/// from the same language domain. Out-of-vocabulary input maps to the
/// zero vector, which cosine similarity treats as "matches nothing".
///
/// [`transform`]: TfidfVectorizer::transform
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    /// Term -> feature index
    vocabulary: HashMap<String, usize>,

    /// Per-feature smooth idf weight
    idf: Vec<f32>,
}

/// Tokenize into lowercase word terms of at least two characters,
/// drop stop words, then append bigrams of adjacent surviving tokens.
fn analyze(text: &str) -> Vec<String> {
    // Word tokens of length >= 2, matching the sklearn default the
    // original vectorizer relied on.
    let token_re = Regex::new(r"\b\w\w+\b").expect("static regex");

    let unigrams: Vec<String> = token_re
        .find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .filter(|t| !STOP_WORDS.contains(&t.as_str()))
        .collect();

    let mut terms = unigrams.clone();
    for pair in unigrams.windows(2) {
        terms.push(format!("{} {}", pair[0], pair[1]));
    }
    terms
}

impl TfidfVectorizer {
    /// Fit the vocabulary and idf weights on a document corpus.
    ///
    /// # Errors
    ///
    /// Returns `AssistantError::Embedding` if the corpus is empty or
    /// contains no usable terms.
    pub fn fit(corpus: &[String]) -> Result<Self> {
        if corpus.is_empty() {
            return Err(AssistantError::Embedding(
                "cannot fit TF-IDF on an empty corpus".to_string(),
            ));
        }

        // Collection frequency (for the feature cap) and document
        // frequency (for idf) per term.
        let mut collection_freq: HashMap<String, usize> = HashMap::new();
        let mut document_freq: HashMap<String, usize> = HashMap::new();

        for doc in corpus {
            let terms = analyze(doc);
            let mut seen: HashSet<&str> = HashSet::new();
            for term in &terms {
                *collection_freq.entry(term.clone()).or_insert(0) += 1;
                if seen.insert(term.as_str()) {
                    *document_freq.entry(term.clone()).or_insert(0) += 1;
                }
            }
        }

        if collection_freq.is_empty() {
            return Err(AssistantError::Embedding(
                "corpus contains no usable terms".to_string(),
            ));
        }

        // Keep the most frequent terms, ties broken alphabetically for
        // determinism, then index the surviving vocabulary in sorted
        // order.
        let mut ranked: Vec<(String, usize)> = collection_freq.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(MAX_FEATURES);

        let mut kept: Vec<String> = ranked.into_iter().map(|(t, _)| t).collect();
        kept.sort();

        let vocabulary: HashMap<String, usize> = kept
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();

        // Smooth idf: ln((1 + n) / (1 + df)) + 1
        let n = corpus.len() as f32;
        let mut idf = vec![0.0; vocabulary.len()];
        for (term, &index) in &vocabulary {
            let df = *document_freq.get(term).unwrap_or(&0) as f32;
            idf[index] = ((1.0 + n) / (1.0 + df)).ln() + 1.0;
        }

        Ok(Self { vocabulary, idf })
    }

    /// Transform text into an L2-normalized tf-idf vector.
    pub fn transform(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.vocabulary.len()];
        for term in analyze(text) {
            if let Some(&index) = self.vocabulary.get(&term) {
                vector[index] += 1.0;
            }
        }

        for (i, weight) in vector.iter_mut().enumerate() {
            *weight *= self.idf[i];
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }

    /// Number of features in the fitted vocabulary.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }
}

#[async_trait]
impl EmbeddingProvider for TfidfVectorizer {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.transform(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.transform(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.vocabulary_size()
    }
}

/// Cosine similarity between two vectors of equal length.
///
/// Zero when either vector is all zeros.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|v| v * v).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<String> {
        vec![
            "employees table stores salary and department information".to_string(),
            "orders table stores order totals and shipping addresses".to_string(),
            "products table stores product names and prices".to_string(),
        ]
    }

    #[test]
    fn test_fit_rejects_empty_corpus() {
        assert!(TfidfVectorizer::fit(&[]).is_err());
    }

    #[test]
    fn test_analyze_drops_stops_and_short_tokens() {
        let terms = analyze("the salary of an employee");
        assert!(terms.contains(&"salary".to_string()));
        assert!(terms.contains(&"employee".to_string()));
        assert!(!terms.iter().any(|t| t == "the" || t == "of" || t == "an"));
        // Bigram of surviving adjacent tokens.
        assert!(terms.contains(&"salary employee".to_string()));
    }

    #[test]
    fn test_transform_is_normalized() {
        let model = TfidfVectorizer::fit(&corpus()).unwrap();
        let vector = model.transform("employee salary");
        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_out_of_vocabulary_is_zero_vector() {
        let model = TfidfVectorizer::fit(&corpus()).unwrap();
        let vector = model.transform("zeppelin quaternion");
        assert!(vector.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_similarity_ranks_matching_document_first() {
        let docs = corpus();
        let model = TfidfVectorizer::fit(&docs).unwrap();
        let doc_vectors: Vec<Vec<f32>> = docs.iter().map(|d| model.transform(d)).collect();

        let query = model.transform("what is the average salary of employees");
        let scores: Vec<f32> = doc_vectors
            .iter()
            .map(|v| cosine_similarity(&query, v))
            .collect();

        assert!(scores[0] > scores[1]);
        assert!(scores[0] > scores[2]);
    }

    #[test]
    fn test_cosine_similarity_bounds() {
        let a = vec![1.0, 0.0];
        let b = vec![1.0, 0.0];
        let c = vec![0.0, 1.0];
        let z = vec![0.0, 0.0];

        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&a, &c), 0.0);
        assert_eq!(cosine_similarity(&a, &z), 0.0);
    }
}
