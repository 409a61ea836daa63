//! Retrieval and session configuration
//!
//! Loaded from a TOML file with two optional sections:
//!
//! ```toml
//! [retrieval]
//! chunk_size = 300
//! overlap = 50
//! top_matches = 6
//! neighbor_range = 2
//!
//! [session]
//! capacity = 1000
//! max_turns = 5
//! idle_timeout_secs = 3600
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::session::SessionConfig;
use crate::{Error, Result};

/// Top-level configuration file layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl Config {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Configuration(format!("{}: {e}", path.display())))?;
        config.retrieval.validate()?;
        info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }
}

/// Parameters for chunking and neighbor-expanded retrieval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Words per chunk.
    pub chunk_size: usize,
    /// Words shared between consecutive chunks.
    pub overlap: usize,
    /// Number of best-scoring chunks kept before neighbor expansion.
    pub top_matches: usize,
    /// Chunks included on each side of a match.
    pub neighbor_range: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            chunk_size: 300,
            overlap: 50,
            top_matches: 6,
            neighbor_range: 2,
        }
    }
}

impl RetrievalConfig {
    /// Create a builder starting from the defaults.
    #[must_use]
    pub fn builder() -> RetrievalConfigBuilder {
        RetrievalConfigBuilder::default()
    }

    /// Load only the `[retrieval]` section of a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        Config::load(path).map(|config| config.retrieval)
    }

    /// Check that the parameters can drive the chunker and ranker.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::Configuration("chunk_size must be greater than zero".into()));
        }
        if self.overlap >= self.chunk_size {
            return Err(Error::Configuration(format!(
                "overlap ({}) must be less than chunk_size ({})",
                self.overlap, self.chunk_size
            )));
        }
        if self.top_matches == 0 {
            return Err(Error::Configuration("top_matches must be greater than zero".into()));
        }
        Ok(())
    }
}

/// Builder for a validated [`RetrievalConfig`].
#[derive(Debug, Clone, Default)]
pub struct RetrievalConfigBuilder {
    config: RetrievalConfig,
}

impl RetrievalConfigBuilder {
    pub fn chunk_size(mut self, words: usize) -> Self {
        self.config.chunk_size = words;
        self
    }

    pub fn overlap(mut self, words: usize) -> Self {
        self.config.overlap = words;
        self
    }

    pub fn top_matches(mut self, count: usize) -> Self {
        self.config.top_matches = count;
        self
    }

    pub fn neighbor_range(mut self, chunks: usize) -> Self {
        self.config.neighbor_range = chunks;
        self
    }

    /// Build the config.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `overlap >= chunk_size`,
    /// `chunk_size == 0` or `top_matches == 0`.
    pub fn build(self) -> Result<RetrievalConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
