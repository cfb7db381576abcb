//! Semantic policy index.
//!
//! Owns the chunk metadata and embedding vectors and delegates
//! nearest-neighbor search to a `VectorBackend`. The index persists as
//! a pair of artifacts that must stay consistent with each other:
//!
//!   policies.vec        raw embedding matrix (count, dim, f32 LE)
//!   policies.meta.json  chunks, provider identity, source hash
//!
//! Loading validates the pair and the configured provider against the
//! recorded metadata; any mismatch is `CorruptIndex` and callers are
//! expected to rebuild.

use crate::backend::VectorBackend;
use crate::chunker::split_policies;
use crate::embeddings::EmbeddingProvider;
use crate::types::PolicyChunk;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use staffdesk_core::{AppError, AppResult};
use std::path::Path;
use std::sync::Arc;

const VECTORS_FILE: &str = "policies.vec";
const METADATA_FILE: &str = "policies.meta.json";

/// A policy chunk matched by a query, with its cosine score.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub chunk: PolicyChunk,
    pub score: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct IndexMetadata {
    source_hash: String,
    provider: String,
    model: String,
    dimensions: usize,
    chunks: Vec<PolicyChunk>,
}

/// Chunked, embedded, searchable view of a policy document.
pub struct SemanticIndex {
    chunks: Vec<PolicyChunk>,
    vectors: Vec<Vec<f32>>,
    backend: Box<dyn VectorBackend>,
    provider: Arc<dyn EmbeddingProvider>,
    source_hash: String,
}

impl std::fmt::Debug for SemanticIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticIndex")
            .field("chunks", &self.chunks)
            .field("vectors", &self.vectors)
            .field("backend", &self.backend.name())
            .field("provider", &self.provider)
            .field("source_hash", &self.source_hash)
            .finish()
    }
}

impl SemanticIndex {
    /// Chunk `content`, embed every chunk, and populate the backend.
    pub async fn build(
        content: &str,
        provider: Arc<dyn EmbeddingProvider>,
        mut backend: Box<dyn VectorBackend>,
    ) -> AppResult<Self> {
        let chunks = split_policies(content);
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = provider.embed_batch(&texts).await?;

        if vectors.len() != chunks.len() {
            return Err(AppError::Index(format!(
                "Provider returned {} embeddings for {} chunks",
                vectors.len(),
                chunks.len()
            )));
        }
        backend.add(vectors.clone())?;

        tracing::info!(
            chunks = chunks.len(),
            provider = provider.provider_name(),
            backend = backend.name(),
            "Built policy index"
        );

        Ok(Self {
            chunks,
            vectors,
            backend,
            provider,
            source_hash: hash_content(content),
        })
    }

    /// Embed the query text and return the `k` best chunks.
    ///
    /// `k == 0` is a caller bug and is rejected rather than silently
    /// returning nothing. An empty index returns an empty hit list.
    pub async fn query(&self, text: &str, k: usize) -> AppResult<Vec<SearchHit>> {
        if k == 0 {
            return Err(AppError::InvalidArgument(
                "query requires k > 0".to_string(),
            ));
        }
        if self.chunks.is_empty() {
            return Ok(Vec::new());
        }

        let embedding = self.provider.embed(text).await?;
        let results = self.backend.search(&embedding, k)?;

        results
            .into_iter()
            .map(|(position, score)| {
                let chunk = self
                    .chunks
                    .get(position)
                    .cloned()
                    .ok_or_else(|| AppError::Index(format!("Unknown position {}", position)))?;
                Ok(SearchHit { chunk, score })
            })
            .collect()
    }

    /// Write both artifacts under `dir`.
    pub fn save(&self, dir: &Path) -> AppResult<()> {
        std::fs::create_dir_all(dir)?;

        let metadata = IndexMetadata {
            source_hash: self.source_hash.clone(),
            provider: self.provider.provider_name().to_string(),
            model: self.provider.model_name().to_string(),
            dimensions: self.provider.dimensions(),
            chunks: self.chunks.clone(),
        };
        let json = serde_json::to_string_pretty(&metadata)?;
        std::fs::write(dir.join(METADATA_FILE), json)?;

        std::fs::write(dir.join(VECTORS_FILE), vectors_to_bytes(&self.vectors))?;

        tracing::debug!(path = %dir.display(), chunks = self.chunks.len(), "Saved policy index");
        Ok(())
    }

    /// Load a previously saved index from `dir`.
    ///
    /// The configured provider must match the one that built the
    /// artifacts; otherwise query embeddings would live in a different
    /// space than the stored vectors.
    pub fn load(
        dir: &Path,
        provider: Arc<dyn EmbeddingProvider>,
        mut backend: Box<dyn VectorBackend>,
    ) -> AppResult<Self> {
        let meta_path = dir.join(METADATA_FILE);
        let vec_path = dir.join(VECTORS_FILE);
        if !meta_path.exists() || !vec_path.exists() {
            return Err(AppError::CorruptIndex(format!(
                "Missing index artifact under {}",
                dir.display()
            )));
        }

        let metadata: IndexMetadata = serde_json::from_str(&std::fs::read_to_string(&meta_path)?)
            .map_err(|e| AppError::CorruptIndex(format!("Unreadable index metadata: {}", e)))?;

        if metadata.provider != provider.provider_name()
            || metadata.model != provider.model_name()
            || metadata.dimensions != provider.dimensions()
        {
            return Err(AppError::CorruptIndex(format!(
                "Index was built with {}/{} ({} dims), configured provider is {}/{} ({} dims)",
                metadata.provider,
                metadata.model,
                metadata.dimensions,
                provider.provider_name(),
                provider.model_name(),
                provider.dimensions()
            )));
        }

        let vectors = bytes_to_vectors(&std::fs::read(&vec_path)?)?;
        if vectors.len() != metadata.chunks.len() {
            return Err(AppError::CorruptIndex(format!(
                "Vector file holds {} embeddings but metadata lists {} chunks",
                vectors.len(),
                metadata.chunks.len()
            )));
        }
        if let Some(first) = vectors.first() {
            if first.len() != metadata.dimensions {
                return Err(AppError::CorruptIndex(format!(
                    "Vector file dimension {} does not match metadata {}",
                    first.len(),
                    metadata.dimensions
                )));
            }
        }

        backend.add(vectors.clone())?;

        Ok(Self {
            chunks: metadata.chunks,
            vectors,
            backend,
            provider,
            source_hash: metadata.source_hash,
        })
    }

    /// Whether `content` differs from the source this index was built
    /// from.
    pub fn is_stale(&self, content: &str) -> bool {
        hash_content(content) != self.source_hash
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }
}

pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn vectors_to_bytes(vectors: &[Vec<f32>]) -> Vec<u8> {
    let dim = vectors.first().map(|v| v.len()).unwrap_or(0);
    let mut bytes = Vec::with_capacity(8 + vectors.len() * dim * 4);
    bytes.extend_from_slice(&(vectors.len() as u32).to_le_bytes());
    bytes.extend_from_slice(&(dim as u32).to_le_bytes());
    for vector in vectors {
        for value in vector {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
    }
    bytes
}

fn bytes_to_vectors(bytes: &[u8]) -> AppResult<Vec<Vec<f32>>> {
    if bytes.len() < 8 {
        return Err(AppError::CorruptIndex(
            "Vector file too short for header".to_string(),
        ));
    }
    let count = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
    let dim = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;

    // Header values are attacker-controlled on disk; the size math must
    // not wrap around.
    let expected = count
        .checked_mul(dim)
        .and_then(|n| n.checked_mul(4))
        .and_then(|n| n.checked_add(8))
        .ok_or_else(|| {
            AppError::CorruptIndex(format!(
                "Vector header declares an impossible {} x {} matrix",
                count, dim
            ))
        })?;
    if bytes.len() != expected {
        return Err(AppError::CorruptIndex(format!(
            "Vector file is {} bytes, expected {} for {} x {} matrix",
            bytes.len(),
            expected,
            count,
            dim
        )));
    }

    let mut vectors = Vec::with_capacity(count);
    let mut offset = 8;
    for _ in 0..count {
        let mut vector = Vec::with_capacity(dim);
        for _ in 0..dim {
            let chunk: [u8; 4] = bytes[offset..offset + 4]
                .try_into()
                .map_err(|_| AppError::CorruptIndex("Truncated vector data".to_string()))?;
            vector.push(f32::from_le_bytes(chunk));
            offset += 4;
        }
        vectors.push(vector);
    }
    Ok(vectors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::LexicalProvider;
    use crate::flat::FlatBackend;

    const POLICIES: &str = "\
Institute teaching policies.

1. No staff member may exceed 16 teaching hours per week.
2. Lab sessions require a minimum break of one slot before the next class.
3. Each department must distribute courses evenly across its staff.
4. Staff are encouraged to reserve time for research and mentoring.
";

    fn provider() -> Arc<dyn crate::embeddings::EmbeddingProvider> {
        Arc::new(LexicalProvider::new(64))
    }

    async fn build_index() -> SemanticIndex {
        SemanticIndex::build(POLICIES, provider(), Box::new(FlatBackend::new()))
            .await
            .unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_build_and_query() {
        let index = build_index().await;
        assert_eq!(index.chunk_count(), 5);

        let hits = index.query("maximum teaching hours", 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].chunk.text.contains("16 teaching hours"));
        assert!(hits[0].score >= hits[1].score);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_query_k_zero_rejected() {
        let index = build_index().await;
        let err = index.query("hours", 0).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_empty_document_queries_empty() {
        let index = SemanticIndex::build("", provider(), Box::new(FlatBackend::new()))
            .await
            .unwrap();
        assert_eq!(index.chunk_count(), 0);
        assert!(index.query("anything", 3).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let index = build_index().await;
        index.save(dir.path()).unwrap();

        let loaded =
            SemanticIndex::load(dir.path(), provider(), Box::new(FlatBackend::new())).unwrap();
        assert_eq!(loaded.chunk_count(), index.chunk_count());
        assert!(!loaded.is_stale(POLICIES));

        let hits = loaded.query("break between lab sessions", 1).await.unwrap();
        assert!(hits[0].chunk.text.contains("break"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_load_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let index = build_index().await;
        index.save(dir.path()).unwrap();
        std::fs::remove_file(dir.path().join(VECTORS_FILE)).unwrap();

        let err = SemanticIndex::load(dir.path(), provider(), Box::new(FlatBackend::new()))
            .unwrap_err();
        assert!(matches!(err, AppError::CorruptIndex(_)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_load_provider_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let index = build_index().await;
        index.save(dir.path()).unwrap();

        let other: Arc<dyn crate::embeddings::EmbeddingProvider> =
            Arc::new(LexicalProvider::new(128));
        let err =
            SemanticIndex::load(dir.path(), other, Box::new(FlatBackend::new())).unwrap_err();
        assert!(matches!(err, AppError::CorruptIndex(_)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_load_truncated_vectors() {
        let dir = tempfile::tempdir().unwrap();
        let index = build_index().await;
        index.save(dir.path()).unwrap();

        let path = dir.path().join(VECTORS_FILE);
        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() - 3]).unwrap();

        let err = SemanticIndex::load(dir.path(), provider(), Box::new(FlatBackend::new()))
            .unwrap_err();
        assert!(matches!(err, AppError::CorruptIndex(_)));
    }

    #[test]
    fn test_overflowing_header_is_corrupt() {
        // count * dim * 4 + 8 wraps to exactly 8 on 64-bit targets, which
        // would match this header-only file's length.
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0x8000_0000u32.to_le_bytes());
        bytes.extend_from_slice(&0x8000_0000u32.to_le_bytes());

        let err = bytes_to_vectors(&bytes).unwrap_err();
        assert!(matches!(err, AppError::CorruptIndex(_)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_is_stale_on_edit() {
        let index = build_index().await;
        assert!(!index.is_stale(POLICIES));
        assert!(index.is_stale("1. A different document.\n"));
    }
}
