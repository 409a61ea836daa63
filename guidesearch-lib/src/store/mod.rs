//! Embedding store
//!
//! Holds every chunk of the corpus together with its embedding, in corpus
//! order: documents in corpus order, chunks of one document adjacent and
//! indexed contiguously from 0. A store is built once and then only read;
//! a rebuild produces a new store which is saved over the old snapshot.
//!
//! # Storage Model
//!
//! Each stored item consists of:
//! - Chunk: document id, chunk index and the chunk text
//! - Embedding: the vector representation of the text
//!
//! Alongside the chunks the store keeps a manifest with one entry per
//! document (content hash and chunk count) and the settings it was built
//! with, which lets a rebuild reuse the chunks of unchanged documents.
//!
//! # Usage
//!
//! ```ignore
//! use guidesearch_lib::store::EmbeddingStore;
//!
//! let previous = EmbeddingStore::load(path).ok();
//! let store = EmbeddingStore::build(&corpus, &chunker, &mut embedder, previous.as_ref())?;
//! store.save(path)?;
//! ```

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::chunk::{Chunk, Chunker};
use crate::corpus::Corpus;
use crate::embed::{Embedder, embed_checked};
use crate::{Error, Result};

/// Per-document manifest entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentEntry {
    pub id: String,
    /// Hex SHA-256 of the document text the chunks were cut from
    pub content_hash: String,
    pub chunk_count: usize,
}

/// What a store was built with. Chunks are only reusable across builds
/// that share all three.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSettings {
    pub model: String,
    pub chunker: String,
    pub dimension: usize,
}

/// All chunks of a corpus with their embeddings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbeddingStore {
    /// `None` for snapshots written without a manifest
    settings: Option<IndexSettings>,
    documents: Vec<DocumentEntry>,
    chunks: Vec<Chunk>,
}

impl EmbeddingStore {
    /// Chunk and embed every document of `corpus`.
    ///
    /// When `previous` was built with the same model, chunker and dimension,
    /// documents whose content hash is unchanged keep their stored chunks
    /// and are not sent to the embedder again.
    ///
    /// # Errors
    ///
    /// Any embedding failure aborts the whole build; no partial store is
    /// returned.
    pub fn build<C, E>(
        corpus: &Corpus,
        chunker: &C,
        embedder: &mut E,
        previous: Option<&EmbeddingStore>,
    ) -> Result<Self>
    where
        C: Chunker + ?Sized,
        E: Embedder + ?Sized,
    {
        let settings = IndexSettings {
            model: embedder.model_name().to_string(),
            chunker: chunker.fingerprint(),
            dimension: embedder.dimension(),
        };

        let reusable = previous
            .filter(|p| p.settings.as_ref() == Some(&settings))
            .map(EmbeddingStore::chunks_by_document)
            .unwrap_or_default();

        let mut documents = Vec::with_capacity(corpus.len());
        let mut chunks = Vec::new();
        let mut reused = 0;

        for document in corpus.documents() {
            let content_hash = document.content_hash();

            let document_chunks = match reusable.get(&(document.id.as_str(), content_hash.as_str())) {
                Some(stored) => {
                    reused += 1;
                    stored.to_vec()
                }
                None => {
                    let mut fresh = chunker.chunk(document);
                    let texts: Vec<&str> = fresh.iter().map(|c| c.text.as_str()).collect();
                    let embeddings = embed_checked(embedder, &texts)?;
                    for (chunk, embedding) in fresh.iter_mut().zip(embeddings) {
                        chunk.embedding = embedding;
                    }
                    debug!(document = %document.id, chunks = fresh.len(), "embedded document");
                    fresh
                }
            };

            documents.push(DocumentEntry {
                id: document.id.clone(),
                content_hash,
                chunk_count: document_chunks.len(),
            });
            chunks.extend(document_chunks);
        }

        info!(
            documents = documents.len(),
            chunks = chunks.len(),
            reused,
            model = %settings.model,
            "embedding store built"
        );

        Ok(Self {
            settings: Some(settings),
            documents,
            chunks,
        })
    }

    pub(crate) fn from_parts(
        settings: Option<IndexSettings>,
        documents: Vec<DocumentEntry>,
        chunks: Vec<Chunk>,
    ) -> Self {
        Self {
            settings,
            documents,
            chunks,
        }
    }

    /// Chunks in corpus order.
    #[must_use]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Manifest entries in corpus order. Empty for legacy snapshots.
    #[must_use]
    pub fn documents(&self) -> &[DocumentEntry] {
        &self.documents
    }

    #[must_use]
    pub fn settings(&self) -> Option<&IndexSettings> {
        self.settings.as_ref()
    }

    /// Embedding dimension, or 0 for an empty store without settings.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.settings
            .as_ref()
            .map(|s| s.dimension)
            .or_else(|| self.chunks.first().map(|c| c.embedding.len()))
            .unwrap_or(0)
    }

    /// Returns the number of stored chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Returns `true` if the store holds no chunks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Map `(document id, content hash)` to that document's stored chunks.
    fn chunks_by_document(&self) -> HashMap<(&str, &str), &[Chunk]> {
        let mut map = HashMap::with_capacity(self.documents.len());
        let mut offset = 0;
        for entry in &self.documents {
            let end = offset + entry.chunk_count;
            map.insert(
                (entry.id.as_str(), entry.content_hash.as_str()),
                &self.chunks[offset..end],
            );
            offset = end;
        }
        map
    }

    /// Verify the ordering and shape invariants of the store.
    pub(crate) fn check_invariants(&self) -> Result<()> {
        let corrupt = |msg: String| Err(Error::StoreCorrupt(msg));

        let dimension = self.dimension();
        let mut runs: Vec<(&str, usize)> = Vec::new();
        let mut closed: HashSet<&str> = HashSet::new();

        for chunk in &self.chunks {
            if chunk.embedding.is_empty() || chunk.embedding.len() != dimension {
                return corrupt(format!(
                    "chunk {}#{} has a {}-dimensional embedding, expected {dimension}",
                    chunk.document_id,
                    chunk.chunk_index,
                    chunk.embedding.len()
                ));
            }
            if chunk.embedding.iter().any(|v| !v.is_finite()) {
                return corrupt(format!(
                    "chunk {}#{} has a non-finite embedding value",
                    chunk.document_id, chunk.chunk_index
                ));
            }

            match runs.last_mut() {
                Some((id, count)) if *id == chunk.document_id => {
                    if chunk.chunk_index != *count {
                        return corrupt(format!(
                            "chunk {}#{} follows index {}",
                            chunk.document_id,
                            chunk.chunk_index,
                            *count - 1
                        ));
                    }
                    *count += 1;
                }
                last => {
                    if let Some((id, _)) = last {
                        closed.insert(*id);
                    }
                    if closed.contains(chunk.document_id.as_str()) {
                        return corrupt(format!(
                            "chunks of document '{}' are not adjacent",
                            chunk.document_id
                        ));
                    }
                    if chunk.chunk_index != 0 {
                        return corrupt(format!(
                            "document '{}' starts at chunk index {}",
                            chunk.document_id, chunk.chunk_index
                        ));
                    }
                    runs.push((chunk.document_id.as_str(), 1));
                }
            }
        }

        if self.settings.is_none() {
            return Ok(());
        }

        let mut ids = HashSet::with_capacity(self.documents.len());
        if let Some(dup) = self.documents.iter().find(|d| !ids.insert(d.id.as_str())) {
            return corrupt(format!("document '{}' listed twice in manifest", dup.id));
        }

        let manifest: Vec<(&str, usize)> = self
            .documents
            .iter()
            .filter(|d| d.chunk_count > 0)
            .map(|d| (d.id.as_str(), d.chunk_count))
            .collect();
        if manifest != runs {
            return corrupt("manifest does not match stored chunks".to_string());
        }

        Ok(())
    }
}

mod snapshot;
