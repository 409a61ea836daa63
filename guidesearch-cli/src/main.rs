//! guidesearch CLI - index a guide directory and query it
//!
//! # Commands
//!
//! ```bash
//! # Show how a document is split
//! guidesearch chunk guides/refunds.txt --size 300 --overlap 50
//!
//! # Build or refresh the snapshot from a directory of .txt guides
//! guidesearch index guides/ --store chunked_embeddings.json
//!
//! # Print the context block for a question
//! guidesearch query "How do I refund an order?" --scores
//!
//! # Embed text and show vector stats
//! guidesearch embed "How do I refund an order?"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use guidesearch_lib::{
    Error,
    chunk::{Chunker, WordWindowChunker},
    config::{Config, RetrievalConfig},
    corpus::{Corpus, Document},
    embed::{Embedder, HashEmbedder, MiniLmEmbedder},
    search::Retriever,
    store::EmbeddingStore,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_STORE: &str = "chunked_embeddings.json";

#[derive(Parser)]
#[command(name = "guidesearch")]
#[command(about = "Chunked semantic retrieval over a directory of guides")]
#[command(version)]
struct Cli {
    /// TOML configuration file with [retrieval] and [session] sections
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a document into word windows and print them
    Chunk {
        /// Input file to chunk
        input: PathBuf,

        /// Words per chunk
        #[arg(long)]
        size: Option<usize>,

        /// Words shared by consecutive chunks
        #[arg(long)]
        overlap: Option<usize>,
    },

    /// Embed every .txt file in a directory and write the snapshot
    Index {
        /// Directory of guide documents
        dir: PathBuf,

        /// Snapshot path
        #[arg(long, default_value = DEFAULT_STORE)]
        store: PathBuf,

        /// Re-embed everything instead of reusing unchanged documents
        #[arg(long)]
        full: bool,

        /// Use the offline hash embedder instead of downloading a model
        #[arg(long)]
        stub_embedder: bool,

        /// Words per chunk
        #[arg(long)]
        size: Option<usize>,

        /// Words shared by consecutive chunks
        #[arg(long)]
        overlap: Option<usize>,
    },

    /// Retrieve the context for a question
    Query {
        /// Question to answer
        question: String,

        /// Snapshot path
        #[arg(long, default_value = DEFAULT_STORE)]
        store: PathBuf,

        /// Best-scoring chunks kept before neighbor expansion
        #[arg(short = 'k', long)]
        top_matches: Option<usize>,

        /// Chunks included on each side of a match
        #[arg(short = 'n', long)]
        neighbor_range: Option<usize>,

        /// Print the ranked scores instead of the context block
        #[arg(long)]
        scores: bool,
    },

    /// Embed text and show vector info
    Embed {
        /// Text to embed
        text: String,

        /// Use the offline hash embedder instead of downloading a model
        #[arg(long)]
        stub_embedder: bool,
    },
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path).with_context(|| format!("loading {}", path.display())),
        None => Ok(Config::default()),
    }
}

/// Per-field flag overrides on top of the configured retrieval settings.
#[derive(Debug, Default, Clone, Copy)]
struct Overrides {
    chunk_size: Option<usize>,
    overlap: Option<usize>,
    top_matches: Option<usize>,
    neighbor_range: Option<usize>,
}

impl Overrides {
    fn apply(self, base: &RetrievalConfig) -> guidesearch_lib::Result<RetrievalConfig> {
        RetrievalConfig::builder()
            .chunk_size(self.chunk_size.unwrap_or(base.chunk_size))
            .overlap(self.overlap.unwrap_or(base.overlap))
            .top_matches(self.top_matches.unwrap_or(base.top_matches))
            .neighbor_range(self.neighbor_range.unwrap_or(base.neighbor_range))
            .build()
    }
}

fn load_embedder(stub: bool) -> Result<Box<dyn Embedder>> {
    if stub {
        return Ok(Box::new(HashEmbedder::default()));
    }
    println!("Loading MiniLM model (first run downloads ~90MB)...");
    Ok(Box::new(MiniLmEmbedder::new()?))
}

/// Pick the embedder the snapshot was built with.
fn embedder_for(store: &EmbeddingStore) -> Result<Box<dyn Embedder>> {
    let hash = HashEmbedder::new(store.dimension());
    match store.settings() {
        Some(settings) if settings.model == hash.model_name() => Ok(Box::new(hash)),
        _ => load_embedder(false),
    }
}

fn run_index(config: &RetrievalConfig, dir: &Path, store_path: &Path, full: bool, stub: bool) -> Result<()> {
    let corpus = Corpus::load_dir(dir)?;
    println!("Loaded {} documents from '{}'", corpus.len(), dir.display());

    let previous = if full {
        None
    } else {
        match EmbeddingStore::load(store_path) {
            Ok(store) => Some(store),
            Err(Error::StoreNotFound(_)) => None,
            Err(e) => {
                warn!(error = %e, "previous snapshot unusable, re-embedding everything");
                None
            }
        }
    };

    let chunker = WordWindowChunker::from_config(config)?;
    let mut embedder = load_embedder(stub)?;
    let store = EmbeddingStore::build(&corpus, &chunker, &mut embedder, previous.as_ref())?;
    store.save(store_path)?;

    println!(
        "Wrote {} chunks from {} documents to '{}'",
        store.len(),
        store.documents().len(),
        store_path.display()
    );
    Ok(())
}

fn run_query(config: RetrievalConfig, question: &str, store_path: &Path, scores: bool) -> Result<()> {
    let store = match EmbeddingStore::load(store_path) {
        Ok(store) => store,
        Err(Error::StoreNotFound(path)) => {
            anyhow::bail!(
                "no embedding store at '{}'; run `guidesearch index <dir> --store {}` first",
                path.display(),
                path.display()
            );
        }
        Err(e) => return Err(e.into()),
    };
    info!(chunks = store.len(), "querying");

    let embedder = embedder_for(&store)?;
    let mut retriever = Retriever::new(embedder, Arc::new(store), config);

    if scores {
        let top = retriever.config().top_matches;
        println!("\n=== Scores ===\n");
        for (i, scored) in retriever.scored(question)?.iter().take(top).enumerate() {
            println!(
                "#{} {}:{} (score: {:.4})",
                i + 1,
                scored.chunk.document_id,
                scored.chunk.chunk_index,
                scored.score
            );
            let preview: String = scored.chunk.text.chars().take(200).collect();
            let ellipsis = if scored.chunk.text.chars().count() > 200 { "..." } else { "" };
            println!("{preview}{ellipsis}\n");
        }
        return Ok(());
    }

    let context = retriever.context_for(question)?;
    if context.is_empty() {
        println!("No relevant chunks found.");
    } else {
        println!("{context}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Chunk { input, size, overlap } => {
            let retrieval = Overrides {
                chunk_size: size,
                overlap,
                ..Overrides::default()
            }
            .apply(&config.retrieval)?;
            let chunker = WordWindowChunker::from_config(&retrieval)?;
            let text = fs::read_to_string(&input).with_context(|| format!("reading {}", input.display()))?;
            let id = input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let chunks = chunker.chunk(&Document::new(id, text));

            println!("Chunked '{}' into {} chunks:\n", input.display(), chunks.len());
            for chunk in &chunks {
                let words = chunk.text.split(' ').count();
                println!("--- Chunk {} ({words} words) ---", chunk.chunk_index);
                let preview: String = chunk.text.chars().take(200).collect();
                let ellipsis = if chunk.text.chars().count() > 200 { "..." } else { "" };
                println!("{preview}{ellipsis}\n");
            }
        }

        Commands::Index {
            dir,
            store,
            full,
            stub_embedder,
            size,
            overlap,
        } => {
            let retrieval = Overrides {
                chunk_size: size,
                overlap,
                ..Overrides::default()
            }
            .apply(&config.retrieval)?;
            run_index(&retrieval, &dir, &store, full, stub_embedder)?;
        }

        Commands::Query {
            question,
            store,
            top_matches,
            neighbor_range,
            scores,
        } => {
            let retrieval = Overrides {
                top_matches,
                neighbor_range,
                ..Overrides::default()
            }
            .apply(&config.retrieval)?;
            run_query(retrieval, &question, &store, scores)?;
        }

        Commands::Embed { text, stub_embedder } => {
            let mut embedder = load_embedder(stub_embedder)?;
            let embedding = embedder.embed_query(&text)?;

            println!("\nEmbedding stats ({}):", embedder.model_name());
            println!("  Dimensions: {}", embedding.len());
            println!("  First 5 values: {:?}", &embedding[..embedding.len().min(5)]);
            println!("  Min: {:.4}", embedding.iter().cloned().fold(f32::INFINITY, f32::min));
            println!("  Max: {:.4}", embedding.iter().cloned().fold(f32::NEG_INFINITY, f32::max));
        }
    }

    Ok(())
}
