//! Schema-aware table retrieval.
//!
//! Pipeline stage two: turn the schema catalog into description
//! documents, embed them, and rank tables against each question so the
//! SQL generator only sees relevant schema context.

pub mod describe;
pub mod index;
pub mod openai;
pub mod provider;
pub mod tfidf;

pub use describe::{describe_table, TableDescription};
pub use index::{TableIndex, TableMatch, DEFAULT_TOP_K, MIN_SIMILARITY};
pub use openai::OpenAIEmbedder;
pub use provider::EmbeddingProvider;
pub use tfidf::{cosine_similarity, TfidfVectorizer};
