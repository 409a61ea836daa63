use sha2::{Digest, Sha256};

use crate::embed::{Embedder, Embedding};
use crate::{Error, Result};

/// Deterministic embedder deriving vectors from SHA-256 of the text.
///
/// Identical texts always map to identical unit vectors and unrelated texts
/// to near-orthogonal ones. Carries no semantics; meant for offline indexing
/// and tests that must not download a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn hash_to_vector(&self, text: &str) -> Result<Embedding> {
        if text.is_empty() {
            return Err(Error::Embedding("cannot embed empty text".to_string()));
        }

        // each 32-byte digest fills 32 dimensions
        let mut vector = Vec::with_capacity(self.dimension);
        let mut block: u64 = 0;
        while vector.len() < self.dimension {
            let mut hasher = Sha256::new();
            hasher.update(block.to_le_bytes());
            hasher.update(text.as_bytes());
            let digest = hasher.finalize();

            let remaining = self.dimension - vector.len();
            vector.extend(
                digest
                    .iter()
                    .take(remaining)
                    .map(|&byte| (f32::from(byte) / 255.0) * 2.0 - 1.0),
            );
            block += 1;
        }

        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        Ok(vector)
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(384)
    }
}

impl Embedder for HashEmbedder {
    fn model_name(&self) -> &str {
        "sha256-hash"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed_documents(&mut self, texts: &[&str]) -> Result<Vec<Embedding>> {
        texts.iter().map(|text| self.hash_to_vector(text)).collect()
    }

    fn embed_query(&mut self, text: &str) -> Result<Embedding> {
        self.hash_to_vector(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension() {
        let mut embedder = HashEmbedder::new(100);
        let vec = embedder.embed_query("hello world").unwrap();
        assert_eq!(vec.len(), 100);
        assert_eq!(embedder.dimension(), 100);
    }

    #[test]
    fn test_deterministic() {
        let mut embedder = HashEmbedder::default();
        let v1 = embedder.embed_query("same text").unwrap();
        let v2 = embedder.embed_documents(&["same text"]).unwrap().remove(0);
        assert_eq!(v1, v2);
    }

    #[test]
    fn test_different_inputs() {
        let mut embedder = HashEmbedder::default();
        let v1 = embedder.embed_query("text one").unwrap();
        let v2 = embedder.embed_query("text two").unwrap();
        assert_ne!(v1, v2);
    }

    #[test]
    fn test_unit_length() {
        let mut embedder = HashEmbedder::new(64);
        let vec = embedder.embed_query("normalize me").unwrap();
        let norm: f32 = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_empty_text() {
        let mut embedder = HashEmbedder::default();
        assert!(matches!(embedder.embed_query(""), Err(Error::Embedding(_))));
        assert!(embedder.embed_documents(&["ok", ""]).is_err());
    }
}
