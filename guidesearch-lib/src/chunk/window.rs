use crate::chunk::{Chunk, Chunker};
use crate::config::RetrievalConfig;
use crate::corpus::Document;
use crate::{Error, Result};

/// Word window chunker - splits on whitespace into fixed-size windows
///
/// Consecutive windows share `overlap` words. The last window may be
/// shorter than `chunk_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordWindowChunker {
    chunk_size: usize,
    overlap: usize,
}

impl WordWindowChunker {
    /// Create a chunker.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `chunk_size == 0` or
    /// `overlap >= chunk_size`, since the window would never advance.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::Configuration("chunk_size must be greater than zero".into()));
        }
        if overlap >= chunk_size {
            return Err(Error::Configuration(format!(
                "overlap ({overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, overlap })
    }

    pub fn from_config(config: &RetrievalConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.overlap)
    }

    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    #[must_use]
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split text into window texts, each words joined by single spaces.
    #[must_use]
    pub fn windows(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let stride = self.chunk_size - self.overlap;

        let mut windows = Vec::with_capacity(words.len().div_ceil(stride));
        for start in (0..words.len()).step_by(stride) {
            let end = (start + self.chunk_size).min(words.len());
            let window = words[start..end].join(" ");
            if !window.trim().is_empty() {
                windows.push(window);
            }
        }
        windows
    }
}

impl Chunker for WordWindowChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        self.windows(&document.text)
            .into_iter()
            .enumerate()
            .map(|(i, text)| Chunk::new(document.id.clone(), i, text))
            .collect()
    }

    fn fingerprint(&self) -> String {
        format!("words:{}:{}", self.chunk_size, self.overlap)
    }
}
