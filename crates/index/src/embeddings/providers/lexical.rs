//! Deterministic lexical embeddings.
//!
//! Hashes word unigrams and character trigrams into a fixed-size vector
//! and unit-normalizes the result. The same text always produces the
//! same vector, so indexes built with this provider are reproducible
//! and need no network access. Quality is adequate for the short,
//! keyword-heavy policy chunks this crate indexes.

use crate::embeddings::EmbeddingProvider;
use staffdesk_core::AppResult;

/// Words too common to carry signal for policy retrieval.
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "in", "is", "it", "of", "on",
    "or", "that", "the", "this", "to", "with",
];

/// Offline embedding provider based on lexical feature hashing.
#[derive(Debug, Clone)]
pub struct LexicalProvider {
    dimensions: usize,
}

impl LexicalProvider {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        let lowered = text.to_lowercase();

        for word in lowered.split(|c: char| !c.is_alphanumeric()) {
            if word.is_empty() || STOP_WORDS.contains(&word) {
                continue;
            }
            // Whole-word feature, weighted above trigrams.
            let slot = fnv1a(word.as_bytes()) as usize % self.dimensions;
            vector[slot] += 2.0;

            let chars: Vec<char> = word.chars().collect();
            if chars.len() < 3 {
                continue;
            }
            let mut buf = [0u8; 12];
            for window in chars.windows(3) {
                let mut len = 0;
                for c in window {
                    len += c.encode_utf8(&mut buf[len..]).len();
                }
                let slot = fnv1a(&buf[..len]) as usize % self.dimensions;
                vector[slot] += 1.0;
            }
        }

        normalize(&mut vector);
        vector
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for LexicalProvider {
    fn provider_name(&self) -> &str {
        "lexical"
    }

    fn model_name(&self) -> &str {
        "lexical-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

/// FNV-1a, 64-bit. Stable across platforms and releases, which keeps
/// persisted vectors comparable with freshly computed ones.
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for &b in bytes {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

fn normalize(vector: &mut [f32]) {
    let magnitude: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if magnitude > f32::EPSILON {
        for v in vector.iter_mut() {
            *v /= magnitude;
        }
    }
}
