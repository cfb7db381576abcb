//! In-memory flat vector backend with linear cosine scan.

use crate::backend::VectorBackend;
use staffdesk_core::{AppError, AppResult};

/// Brute-force backend. Fine for the document sizes this crate
/// indexes; a policy file yields tens of chunks, not millions.
#[derive(Debug, Default)]
pub struct FlatBackend {
    vectors: Vec<Vec<f32>>,
}

impl FlatBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vectors(vectors: Vec<Vec<f32>>) -> AppResult<Self> {
        let mut backend = Self::new();
        backend.add(vectors)?;
        Ok(backend)
    }
}

impl VectorBackend for FlatBackend {
    fn name(&self) -> &str {
        "flat"
    }

    fn len(&self) -> usize {
        self.vectors.len()
    }

    fn dimensions(&self) -> Option<usize> {
        self.vectors.first().map(|v| v.len())
    }

    fn add(&mut self, vectors: Vec<Vec<f32>>) -> AppResult<()> {
        for vector in vectors {
            if let Some(dim) = self.dimensions() {
                if vector.len() != dim {
                    return Err(AppError::Index(format!(
                        "Vector dimension mismatch: expected {}, got {}",
                        dim,
                        vector.len()
                    )));
                }
            }
            self.vectors.push(vector);
        }
        Ok(())
    }

    fn search(&self, query: &[f32], k: usize) -> AppResult<Vec<(usize, f32)>> {
        if k == 0 {
            return Err(AppError::InvalidArgument(
                "search requires k > 0".to_string(),
            ));
        }
        if let Some(dim) = self.dimensions() {
            if query.len() != dim {
                return Err(AppError::Index(format!(
                    "Query dimension mismatch: expected {}, got {}",
                    dim,
                    query.len()
                )));
            }
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (i, cosine_similarity(query, v)))
            .collect();
        // Stable sort keeps equal scores in position order.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if mag_a <= f32::EPSILON || mag_b <= f32::EPSILON {
        return 0.0;
    }
    dot / (mag_a * mag_b)
}
