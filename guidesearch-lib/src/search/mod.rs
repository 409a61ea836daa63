//! High-level retrieval interface
//!
//! Combines an embedder and a loaded store into the retrieval API consumed
//! by the prompt layer.
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use guidesearch_lib::search::Retriever;
//!
//! let store = Arc::new(EmbeddingStore::load(path)?);
//! let mut retriever = Retriever::new(embedder, Arc::clone(&store), config);
//!
//! // Best matches widened to their neighbors, in document order
//! let chunks = retriever.find_relevant_chunks("How do I refund an order?")?;
//!
//! // Numbered context block for the prompt
//! let context = retriever.context_for("How do I refund an order?")?;
//! ```

use std::sync::Arc;

use tracing::debug;

use crate::chunk::Chunk;
use crate::config::RetrievalConfig;
use crate::context::assemble_context;
use crate::embed::{Embedder, Embedding, is_finite};
use crate::store::EmbeddingStore;
use crate::{Error, Result};

/// Retrieval over a shared, read-only embedding store.
///
/// The store sits behind an `Arc` so any number of retrievers, each with
/// its own embedder, can serve queries from one loaded snapshot. Swapping
/// in a rebuilt snapshot means constructing new retrievers around the new
/// store; the old one is never mutated.
pub struct Retriever<E: Embedder> {
    embedder: E,
    store: Arc<EmbeddingStore>,
    config: RetrievalConfig,
}

impl<E: Embedder> Retriever<E> {
    /// Create a new retriever.
    #[must_use]
    pub fn new(embedder: E, store: Arc<EmbeddingStore>, config: RetrievalConfig) -> Self {
        Self {
            embedder,
            store,
            config,
        }
    }

    /// Find the chunks that best answer `query`, widened to their neighbors.
    ///
    /// The `top_matches` best chunks are each expanded by `neighbor_range`
    /// chunks on both sides. The result is deduplicated and ordered by
    /// position in the corpus, so runs of adjacent chunks read as
    /// continuous text.
    ///
    /// An empty store yields an empty result without embedding the query.
    pub fn find_relevant_chunks(&mut self, query: &str) -> Result<Vec<Chunk>> {
        if self.store.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self.embed_query(query)?;
        let chunks = self.store.chunks();
        let ranked = rank(score_chunks(&query_embedding, chunks));

        let seeds = ranked.iter().take(self.config.top_matches).map(|s| s.chunk);
        let selected = expand_neighbors(chunks, seeds, self.config.neighbor_range);

        debug!(
            query,
            matches = self.config.top_matches.min(ranked.len()),
            selected = selected.len(),
            "retrieved chunks"
        );
        Ok(selected.into_iter().cloned().collect())
    }

    /// Score every stored chunk against `query`, best first.
    pub fn scored(&mut self, query: &str) -> Result<Vec<ScoredChunk<'_>>> {
        if self.store.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self.embed_query(query)?;
        Ok(rank(score_chunks(&query_embedding, self.store.chunks())))
    }

    /// The numbered context block for `query`.
    ///
    /// Empty when nothing is retrieved.
    pub fn context_for(&mut self, query: &str) -> Result<String> {
        let chunks = self.find_relevant_chunks(query)?;
        Ok(assemble_context(&chunks))
    }

    fn embed_query(&mut self, query: &str) -> Result<Embedding> {
        let embedding = self.embedder.embed_query(query)?;
        let expected = self.store.dimension();
        if embedding.len() != expected {
            return Err(Error::Embedding(format!(
                "{} produced a {}-dimensional query embedding, store holds {expected}",
                self.embedder.model_name(),
                embedding.len()
            )));
        }
        if !is_finite(&embedding) {
            return Err(Error::Embedding(format!(
                "{} produced a non-finite query embedding",
                self.embedder.model_name()
            )));
        }
        Ok(embedding)
    }

    /// Returns the number of stored chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if no chunks are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Returns a reference to the embedder.
    #[must_use]
    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    /// Returns a reference to the store.
    #[must_use]
    pub fn store(&self) -> &Arc<EmbeddingStore> {
        &self.store
    }

    #[must_use]
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }
}

mod expand;
mod score;

pub use expand::*;
pub use score::*;
