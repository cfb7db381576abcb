//! Vector search backend abstraction.
//!
//! Backends hold embeddings and answer nearest-neighbor queries. The
//! flat backend is always available; an accelerated backend can be
//! compiled in behind the `lance` feature. Persistence is handled by
//! `SemanticIndex` and never depends on the backend in use.

use staffdesk_core::AppResult;

/// A searchable collection of embedding vectors.
///
/// Vectors are addressed by insertion order, which matches the chunk
/// order of the policy document they were built from.
pub trait VectorBackend: Send + Sync {
    /// Backend name for health reporting (e.g., "flat", "lance").
    fn name(&self) -> &str;

    /// Number of stored vectors.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Vector dimensionality, or None while empty.
    fn dimensions(&self) -> Option<usize>;

    /// Append vectors. All vectors must share one dimensionality.
    fn add(&mut self, vectors: Vec<Vec<f32>>) -> AppResult<()>;

    /// Return up to `k` (position, cosine score) pairs, best first.
    /// Ties in score break toward the lower position.
    fn search(&self, query: &[f32], k: usize) -> AppResult<Vec<(usize, f32)>>;
}
