//! Engine facade: the surface a presentation layer consumes.
//!
//! The record store is immutable after load. The semantic index sits
//! behind an `RwLock<Arc<..>>`: queries clone the `Arc` under a short
//! read lock and run against that snapshot, while `rebuild_index` builds
//! a replacement off to the side and swaps it in under the write lock.

use crate::composer::compose;
use crate::entities::extract;
use crate::intent::classify;
use crate::router::resolve;
use crate::types::{AnswerPayload, Health, Missing, Retrieval};
use staffdesk_core::config::AppConfig;
use staffdesk_core::AppResult;
use staffdesk_index::{create_provider, EmbeddingProvider, FlatBackend, SemanticIndex, VectorBackend};
use staffdesk_llm::{create_client, GenClient};
use staffdesk_store::{RecordStore, Vocabulary};
use std::sync::Arc;
use tokio::sync::RwLock;

/// The query-answering engine.
pub struct Engine {
    config: AppConfig,
    store: RecordStore,
    vocabulary: Vocabulary,
    embedder: Arc<dyn EmbeddingProvider>,
    index: RwLock<Arc<SemanticIndex>>,
    gen: Option<Arc<dyn GenClient>>,
}

impl Engine {
    /// Load the tables, then load or (re)build the semantic index.
    pub async fn new(config: AppConfig) -> AppResult<Self> {
        config.validate()?;
        config.ensure_index_dir()?;

        let (store, report) = RecordStore::load(&config.workload_file, &config.timetable_file)?;
        if !report.warnings.is_empty() {
            tracing::warn!("{} table rows were skipped during load", report.warnings.len());
        }
        let vocabulary = store.vocabulary();

        let embedder = create_provider(&config.embedding)?;
        let policy_text = std::fs::read_to_string(&config.policies_file)?;
        let index = Self::load_or_build(&config, embedder.clone(), &policy_text).await?;

        let gen = match config.generation.provider.as_str() {
            "none" => None,
            provider => Some(create_client(
                provider,
                Some(&config.generation.endpoint),
                config.generation.timeout_ms,
            )?),
        };

        Ok(Self {
            config,
            store,
            vocabulary,
            embedder,
            index: RwLock::new(Arc::new(index)),
            gen,
        })
    }

    /// Swap in a specific generation client. Used for testing fallback
    /// behavior against a misbehaving backend.
    pub fn with_gen_client(mut self, client: Arc<dyn GenClient>) -> Self {
        self.gen = Some(client);
        self
    }

    async fn load_or_build(
        config: &AppConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        policy_text: &str,
    ) -> AppResult<SemanticIndex> {
        match SemanticIndex::load(&config.index_dir, embedder.clone(), make_backend(config, &embedder)) {
            Ok(index) if !index.is_stale(policy_text) => {
                tracing::info!(chunks = index.chunk_count(), "Loaded persisted policy index");
                return Ok(index);
            }
            Ok(_) => {
                tracing::info!("Policy text changed since last build, rebuilding index");
            }
            Err(e) => {
                tracing::info!("No usable persisted index ({}), building", e);
            }
        }

        let index =
            SemanticIndex::build(policy_text, embedder.clone(), make_backend(config, &embedder))
                .await?;
        index.save(&config.index_dir)?;
        Ok(index)
    }

    /// Answer a query. Never fails for a well-formed string; retrieval
    /// problems degrade to a low-confidence clarification payload.
    pub async fn answer(&self, query: &str) -> AnswerPayload {
        let intent = classify(query);
        let entities = extract(query, &self.vocabulary);
        tracing::debug!(intent = intent.as_str(), ?entities, "Routing query");

        let index = self.index.read().await.clone();
        let retrieval = match resolve(
            intent,
            &entities,
            query,
            &self.store,
            index.as_ref(),
            self.config.top_k,
        )
        .await
        {
            Ok(retrieval) => retrieval,
            Err(e) => {
                tracing::warn!("Retrieval failed, degrading to clarification: {}", e);
                Retrieval::empty(Missing::Data)
            }
        };

        compose(
            intent,
            retrieval,
            &entities,
            query,
            self.gen.as_deref(),
            &self.config.generation.model,
        )
        .await
    }

    /// Rebuild the semantic index from the current policy text and swap
    /// it in atomically. Queries in flight keep the previous snapshot.
    pub async fn rebuild_index(&self) -> AppResult<()> {
        let policy_text = std::fs::read_to_string(&self.config.policies_file)?;

        let mut guard = self.index.write().await;
        let rebuilt = SemanticIndex::build(
            &policy_text,
            self.embedder.clone(),
            make_backend(&self.config, &self.embedder),
        )
        .await?;
        rebuilt.save(&self.config.index_dir)?;
        *guard = Arc::new(rebuilt);

        tracing::info!(chunks = guard.chunk_count(), "Rebuilt policy index");
        Ok(())
    }

    /// Status snapshot for the health subcommand.
    pub async fn health(&self) -> Health {
        let index = self.index.read().await;
        Health {
            record_count: self.store.record_count(),
            chunk_count: index.chunk_count(),
            index_backend: index.backend_name().to_string(),
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }
}

#[cfg(feature = "lance")]
fn make_backend(config: &AppConfig, embedder: &Arc<dyn EmbeddingProvider>) -> Box<dyn VectorBackend> {
    match staffdesk_index::lance::LanceBackend::new(
        &config.index_dir.join("lance"),
        embedder.dimensions(),
    ) {
        Ok(backend) => Box::new(backend),
        Err(e) => {
            tracing::warn!("LanceDB backend unavailable ({}), using flat scan", e);
            Box::new(FlatBackend::new())
        }
    }
}

#[cfg(not(feature = "lance"))]
fn make_backend(_config: &AppConfig, _embedder: &Arc<dyn EmbeddingProvider>) -> Box<dyn VectorBackend> {
    Box::new(FlatBackend::new())
}
