//! Document chunking
//!
//! Documents are split into overlapping word windows. Each chunk records
//! the document it came from and its 0-based position within that
//! document, which is what neighbor expansion walks over at query time.
//!
//! # Implementing a Chunker
//!
//! ```ignore
//! use guidesearch_lib::chunk::{Chunk, Chunker};
//! use guidesearch_lib::corpus::Document;
//!
//! struct MyChunker { /* ... */ }
//!
//! impl Chunker for MyChunker {
//!     fn chunk(&self, document: &Document) -> Vec<Chunk> {
//!         todo!()
//!     }
//!
//!     fn fingerprint(&self) -> String {
//!         "mine".to_string()
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::corpus::Document;
use crate::embed::Embedding;

/// A chunk of a document, the atomic unit of retrieval.
///
/// Legacy snapshots name the fields `title`, `chunk_id` and `content`;
/// those are accepted when reading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Id of the owning document
    #[serde(alias = "title")]
    pub document_id: String,
    /// Position within the document, contiguous from 0
    #[serde(alias = "chunk_id")]
    pub chunk_index: usize,
    /// Word-aligned slice of the document text
    #[serde(alias = "content")]
    pub text: String,
    /// Vector for `text`, empty until the chunk is embedded
    pub embedding: Embedding,
}

impl Chunk {
    /// Create a chunk that has not been embedded yet.
    pub fn new(document_id: impl Into<String>, chunk_index: usize, text: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            chunk_index,
            text: text.into(),
            embedding: Vec::new(),
        }
    }

    /// The `(document_id, chunk_index)` key identifying this chunk.
    #[must_use]
    pub fn key(&self) -> (&str, usize) {
        (&self.document_id, self.chunk_index)
    }
}

/// Trait for document chunking strategies
pub trait Chunker: Send + Sync {
    /// Split a document into chunks with contiguous indices starting at 0.
    ///
    /// Returned chunks carry no embedding.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;

    /// Identifies the strategy and its parameters.
    ///
    /// Two chunkers with the same fingerprint produce identical chunks for
    /// identical text, so stored chunks can be reused across rebuilds.
    fn fingerprint(&self) -> String;
}

mod window;

pub use window::*;
