//! Pipeline orchestration.
//!
//! Ties the stages together: connect, introspect, describe, embed,
//! index on startup; retrieve, extract intent, generate, validate,
//! execute per question.

use crate::config::{EmbeddingBackend, PgSettings};
use crate::db::{extract_catalog, PgClient};
use crate::llm::{extract_intent, LlmClient, SqlGenerator};
use crate::output::ResultSet;
use crate::retrieval::{
    describe_table, EmbeddingProvider, OpenAIEmbedder, TableIndex, TableMatch, TfidfVectorizer,
    DEFAULT_TOP_K,
};
use crate::types::{AssistantError, Result, SchemaCatalog};
use tracing::info;

/// Everything produced while answering one question.
#[derive(Debug)]
pub struct Answer {
    /// Retrieved tables with similarity scores
    pub relevant_tables: Vec<TableMatch>,

    /// The validated SQL that was (or would be) executed
    pub sql: String,

    /// Query results; `None` for a dry-run plan
    pub results: Option<ResultSet>,
}

/// The assembled natural-language-to-SQL pipeline.
pub struct Assistant {
    db: PgClient,
    catalog: SchemaCatalog,
    provider: Box<dyn EmbeddingProvider>,
    index: TableIndex,
    llm: LlmClient,
}

impl Assistant {
    /// Connect and build every stage of the pipeline.
    ///
    /// # Arguments
    ///
    /// * `pg` - PostgreSQL connection settings
    /// * `backend` - Embedding backend for table retrieval
    ///
    /// # Errors
    ///
    /// Each stage reports its own error class: `Connection` for the
    /// database, `Schema` for introspection, `Embedding` for index
    /// construction, `Config` for LLM settings.
    pub async fn initialize(pg: &PgSettings, backend: EmbeddingBackend) -> Result<Self> {
        info!("connecting to database");
        let db = PgClient::connect(pg).await?;
        db.verify().await?;

        info!("extracting database schema");
        let catalog = extract_catalog(&db).await?;

        info!("building table descriptions and embeddings");
        let descriptions: Vec<_> = catalog.tables.values().map(describe_table).collect();

        let provider: Box<dyn EmbeddingProvider> = match backend {
            EmbeddingBackend::Tfidf => {
                let corpus: Vec<String> =
                    descriptions.iter().map(|d| d.document.clone()).collect();
                Box::new(TfidfVectorizer::fit(&corpus)?)
            }
            EmbeddingBackend::OpenAI(model) => Box::new(OpenAIEmbedder::from_env(model)?),
        };

        let index = TableIndex::build(provider.as_ref(), descriptions).await?;
        let llm = LlmClient::from_env()?;

        info!(tables = index.len(), model = llm.model(), "assistant initialized");
        Ok(Self {
            db,
            catalog,
            provider,
            index,
            llm,
        })
    }

    /// The extracted schema catalog.
    pub fn catalog(&self) -> &SchemaCatalog {
        &self.catalog
    }

    /// Answer a question end to end.
    ///
    /// # Errors
    ///
    /// `NoRelevantTables` when retrieval comes up empty (no LLM call
    /// is made in that case), otherwise the failing stage's error.
    pub async fn answer(&self, question: &str) -> Result<Answer> {
        let mut answer = self.prepare(question).await?;
        let results = self.db.run_select(&answer.sql).await?;
        answer.results = Some(results);
        Ok(answer)
    }

    /// Generate and validate SQL without executing it.
    ///
    /// # Errors
    ///
    /// Same as [`Assistant::answer`], minus execution errors.
    pub async fn plan(&self, question: &str) -> Result<Answer> {
        self.prepare(question).await
    }

    /// Retrieval, intent, generation, validation. Shared by answer
    /// and plan.
    async fn prepare(&self, question: &str) -> Result<Answer> {
        info!(question, "finding relevant tables");
        let relevant_tables = self
            .index
            .find_relevant(self.provider.as_ref(), question, DEFAULT_TOP_K)
            .await?;

        if relevant_tables.is_empty() {
            return Err(AssistantError::NoRelevantTables(question.to_string()));
        }

        let table_names: Vec<String> = relevant_tables
            .iter()
            .map(|m| m.table_name.clone())
            .collect();
        info!(tables = ?table_names, "relevant tables found");

        let intent = extract_intent(&self.llm, question).await?;

        info!("generating SQL query");
        let sql = SqlGenerator::new(&self.llm)
            .generate(question, &self.catalog, &table_names, &intent)
            .await?;
        info!(sql = %sql, "generated SQL");

        Ok(Answer {
            relevant_tables,
            sql,
            results: None,
        })
    }
}
