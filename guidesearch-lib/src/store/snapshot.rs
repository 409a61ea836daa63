//! Snapshot persistence
//!
//! A snapshot is a single JSON document:
//!
//! ```text
//! {
//!   "version": 1,
//!   "model": "sentence-transformers/all-MiniLM-L6-v2",
//!   "dimension": 384,
//!   "chunker": "words:300:50",
//!   "documents": [{ "id": "refunds", "content_hash": "9f2c...", "chunk_count": 3 }],
//!   "chunks": [{ "document_id": "refunds", "chunk_index": 0, "text": "...", "embedding": [...] }]
//! }
//! ```
//!
//! A bare array of chunk records, as written by earlier tooling, is also
//! accepted. It carries no manifest, so nothing loaded from it is reused by
//! an incremental rebuild.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::info;

use crate::chunk::Chunk;
use crate::store::{DocumentEntry, EmbeddingStore, IndexSettings};
use crate::{Error, Result};

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    model: &'a str,
    dimension: usize,
    chunker: &'a str,
    documents: &'a [DocumentEntry],
    chunks: &'a [Chunk],
}

#[derive(Deserialize)]
struct SnapshotFile {
    version: u32,
    model: String,
    dimension: usize,
    chunker: String,
    documents: Vec<DocumentEntry>,
    chunks: Vec<Chunk>,
}

impl EmbeddingStore {
    /// Read a snapshot.
    ///
    /// # Errors
    ///
    /// - [`Error::StoreNotFound`] if `path` does not exist
    /// - [`Error::StoreCorrupt`] if the file is not a well-formed, internally
    ///   consistent snapshot
    pub fn load(path: &Path) -> Result<Self> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::StoreNotFound(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };

        let value: Value = serde_json::from_reader(BufReader::new(file)).map_err(corrupt)?;
        let store = match value {
            Value::Array(_) => {
                let chunks: Vec<Chunk> = serde_json::from_value(value).map_err(corrupt)?;
                EmbeddingStore::from_parts(None, Vec::new(), chunks)
            }
            Value::Object(_) => {
                let file: SnapshotFile = serde_json::from_value(value).map_err(corrupt)?;
                if file.version != SNAPSHOT_VERSION {
                    return Err(Error::StoreCorrupt(format!(
                        "unsupported snapshot version {}",
                        file.version
                    )));
                }
                let settings = IndexSettings {
                    model: file.model,
                    chunker: file.chunker,
                    dimension: file.dimension,
                };
                EmbeddingStore::from_parts(Some(settings), file.documents, file.chunks)
            }
            _ => {
                return Err(Error::StoreCorrupt(
                    "expected a snapshot object or an array of chunks".to_string(),
                ));
            }
        };

        store.check_invariants()?;
        info!(path = %path.display(), chunks = store.len(), "embedding store loaded");
        Ok(store)
    }

    /// Write the store to `path`.
    ///
    /// The snapshot is written to a temporary file in the same directory and
    /// renamed over `path`, so a concurrent reader sees either the old or the
    /// new snapshot in full.
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            let written = match self.settings() {
                Some(settings) => serde_json::to_writer(
                    &mut writer,
                    &SnapshotRef {
                        version: SNAPSHOT_VERSION,
                        model: &settings.model,
                        dimension: settings.dimension,
                        chunker: &settings.chunker,
                        documents: self.documents(),
                        chunks: self.chunks(),
                    },
                ),
                None => serde_json::to_writer(&mut writer, self.chunks()),
            };
            written.map_err(std::io::Error::from)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| Error::Io(e.error))?;

        info!(path = %path.display(), chunks = self.len(), "embedding store saved");
        Ok(())
    }
}

fn corrupt(err: serde_json::Error) -> Error {
    Error::StoreCorrupt(err.to_string())
}
