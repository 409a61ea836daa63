//! Source documents
//!
//! A corpus is a directory of plain-text files, one document per file.
//! The file stem becomes the document id, so `refunds.txt` is `refunds`.

use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::{Error, Result};

/// A single source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Stable identifier derived from the source file name
    pub id: String,
    /// Raw document text
    pub text: String,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }

    /// Hex SHA-256 of the document text, used to detect changed documents.
    #[must_use]
    pub fn content_hash(&self) -> String {
        hex::encode(Sha256::digest(self.text.as_bytes()))
    }
}

/// An ordered collection of documents.
///
/// Corpus order defines the order in which retrieved chunks are emitted.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    documents: Vec<Document>,
}

impl Corpus {
    /// Build a corpus from documents, sorted by id.
    pub fn new(mut documents: Vec<Document>) -> Result<Self> {
        documents.sort_by(|a, b| a.id.cmp(&b.id));
        if let Some(pair) = documents.windows(2).find(|w| w[0].id == w[1].id) {
            return Err(Error::Corpus(format!("duplicate document id '{}'", pair[0].id)));
        }
        Ok(Self { documents })
    }

    /// Read every `*.txt` file in `dir` (non-recursive).
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let entries = fs::read_dir(dir)
            .map_err(|e| Error::Corpus(format!("cannot read {}: {e}", dir.display())))?;

        let mut documents = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| Error::Corpus(format!("cannot read {}: {e}", dir.display())))?
                .path();

            if !path.is_file() || path.extension().is_none_or(|ext| ext != "txt") {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                debug!(path = %path.display(), "skipping file with non UTF-8 name");
                continue;
            };

            let bytes = fs::read(&path)?;
            let text = String::from_utf8(bytes)
                .map_err(|_| Error::Corpus(format!("{} is not valid UTF-8", path.display())))?;
            documents.push(Document::new(id, text));
        }

        let corpus = Self::new(documents)?;
        info!(dir = %dir.display(), documents = corpus.len(), "corpus loaded");
        Ok(corpus)
    }

    #[must_use]
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_dir_reads_txt_files_in_id_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("refunds.txt"), "refund policy").unwrap();
        fs::write(dir.path().join("menus.txt"), "menu setup").unwrap();
        fs::write(dir.path().join("notes.md"), "ignored").unwrap();
        fs::create_dir(dir.path().join("nested.txt")).unwrap();

        let corpus = Corpus::load_dir(dir.path()).unwrap();
        let ids: Vec<_> = corpus.documents().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["menus", "refunds"]);
        assert_eq!(corpus.documents()[1].text, "refund policy");
    }

    #[test]
    fn test_load_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = Corpus::load_dir(dir.path()).unwrap();
        assert!(corpus.is_empty());
    }

    #[test]
    fn test_load_missing_dir() {
        let result = Corpus::load_dir(Path::new("/nonexistent/guides"));
        assert!(matches!(result, Err(Error::Corpus(_))));
    }

    #[test]
    fn test_load_rejects_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.txt"), [0xff, 0xfe, 0x00]).unwrap();
        let result = Corpus::load_dir(dir.path());
        assert!(matches!(result, Err(Error::Corpus(_))));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = Corpus::new(vec![Document::new("a", "x"), Document::new("a", "y")]);
        assert!(matches!(result, Err(Error::Corpus(_))));
    }

    #[test]
    fn test_content_hash_tracks_text() {
        let a = Document::new("a", "same text");
        let b = Document::new("b", "same text");
        let c = Document::new("a", "other text");
        assert_eq!(a.content_hash(), b.content_hash());
        assert_ne!(a.content_hash(), c.content_hash());
        assert_eq!(a.content_hash().len(), 64);
    }
}
