//! Semantic index over free-text policy rules.
//!
//! Splits the policy document into retrieval chunks, embeds them through a
//! pluggable embedding provider, and serves nearest-neighbor queries from
//! one of two interchangeable vector backends: an exact linear-scan store
//! (always available) or a LanceDB ANN table (behind the `lance` feature).
//! Both yield top-k by descending cosine similarity with ties broken by
//! chunk order, so callers never need to know which backend is active.
//!
//! The vector set and chunk metadata persist as a matched artifact pair;
//! loading one without the other, or with mismatched counts, fails with
//! `AppError::CorruptIndex` rather than silently truncating.

pub mod backend;
pub mod chunker;
pub mod embeddings;
pub mod flat;
#[cfg(feature = "lance")]
pub mod lance;
pub mod semantic;
pub mod types;

pub use backend::VectorBackend;
pub use embeddings::{create_provider, EmbeddingProvider};
pub use flat::FlatBackend;
pub use semantic::{SearchHit, SemanticIndex};
pub use types::{ChunkCategory, PolicyChunk};
