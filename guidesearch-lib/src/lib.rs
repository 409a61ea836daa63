//! guidesearch - chunked semantic retrieval for grounding assistant answers
//!
//! # Architecture
//!
//! ```text
//! Corpus -> Chunker -> Embedder -> EmbeddingStore (snapshot on disk)
//!                                        |
//! Query -> Embedder -> Score -> Top matches -> Neighbor expansion
//!                                                   |
//!                                          Context (numbered block)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use guidesearch_lib::{
//!     chunk::WordWindowChunker, config::RetrievalConfig, corpus::Corpus,
//!     embed::MiniLmEmbedder, search::Retriever, store::EmbeddingStore,
//! };
//!
//! let config = RetrievalConfig::default();
//! let chunker = WordWindowChunker::from_config(&config)?;
//! let mut embedder = MiniLmEmbedder::new()?;
//!
//! // Index a directory of guides
//! let corpus = Corpus::load_dir("cleaned_articles".as_ref())?;
//! let store = EmbeddingStore::build(&corpus, &chunker, &mut embedder, None)?;
//! store.save("chunked_embeddings.json".as_ref())?;
//!
//! // Retrieve context for a question
//! let mut retriever = Retriever::new(embedder, Arc::new(store), config);
//! let context = retriever.context_for("How do I refund an order?")?;
//! ```

pub mod chunk;
pub mod config;
pub mod context;
pub mod corpus;
pub mod embed;
pub mod error;
pub mod search;
pub mod session;
pub mod store;

pub use error::{Error, Result};
