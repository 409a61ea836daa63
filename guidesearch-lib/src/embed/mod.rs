//! Text embedding
//!
//! The retrieval core treats the embedding model as a black box mapping
//! text to a fixed-length vector. Two providers are included:
//!
//! - [`MiniLmEmbedder`]: sentence-transformers/all-MiniLM-L6-v2 via the
//!   fastembed crate (ONNX runtime), 384 dimensions
//! - [`HashEmbedder`]: deterministic hash-derived vectors for offline use
//!   and tests
//!
//! # Usage
//!
//! ```ignore
//! use guidesearch_lib::embed::{Embedder, MiniLmEmbedder};
//!
//! let mut embedder = MiniLmEmbedder::new()?;
//!
//! // Embed chunks (for indexing)
//! let chunk_embeddings = embedder.embed_documents(&["To issue a refund...", "Menus are..."])?;
//!
//! // Embed query (for searching)
//! let query_embedding = embedder.embed_query("How do I refund an order?")?;
//! ```

use crate::{Error, Result};

/// A vector embedding - fixed size array of floats
pub type Embedding = Vec<f32>;

/// Trait for text embedding models
pub trait Embedder: Send + Sync {
    /// Embed multiple texts for indexing
    ///
    /// Must return exactly one vector per input, in input order.
    fn embed_documents(&mut self, texts: &[&str]) -> Result<Vec<Embedding>>;

    /// Embed a single query for searching
    fn embed_query(&mut self, text: &str) -> Result<Embedding>;

    /// Returns the embedding dimension
    fn dimension(&self) -> usize;

    /// Returns the model name/identifier
    fn model_name(&self) -> &str;
}

impl<E: Embedder + ?Sized> Embedder for Box<E> {
    fn embed_documents(&mut self, texts: &[&str]) -> Result<Vec<Embedding>> {
        (**self).embed_documents(texts)
    }

    fn embed_query(&mut self, text: &str) -> Result<Embedding> {
        (**self).embed_query(text)
    }

    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

/// Embed `texts` and check the provider kept its contract.
///
/// A provider that drops a vector, returns vectors of the wrong length or
/// produces NaN or infinite values leaves chunks without a usable embedding.
/// Each of those is an [`Error::Embedding`].
pub(crate) fn embed_checked<E: Embedder + ?Sized>(
    embedder: &mut E,
    texts: &[&str],
) -> Result<Vec<Embedding>> {
    let embeddings = embedder.embed_documents(texts)?;
    if embeddings.len() != texts.len() {
        return Err(Error::Embedding(format!(
            "{} returned {} embeddings for {} texts",
            embedder.model_name(),
            embeddings.len(),
            texts.len()
        )));
    }

    let dimension = embedder.dimension();
    if let Some(bad) = embeddings.iter().find(|e| e.len() != dimension) {
        return Err(Error::Embedding(format!(
            "{} returned a {}-dimensional embedding, expected {dimension}",
            embedder.model_name(),
            bad.len()
        )));
    }

    // NaN and infinities cannot be written to a snapshot
    if let Some(i) = embeddings.iter().position(|e| !is_finite(e)) {
        return Err(Error::Embedding(format!(
            "{} returned a non-finite value in the embedding of text {i}",
            embedder.model_name()
        )));
    }
    Ok(embeddings)
}

/// `true` if every component is a finite number.
pub(crate) fn is_finite(embedding: &[f32]) -> bool {
    embedding.iter().all(|v| v.is_finite())
}

mod hash;
mod minilm;

pub use hash::*;
pub use minilm::*;
