//! Context assembly for the prompt layer

use std::borrow::Borrow;

use crate::chunk::Chunk;

/// Join chunks into one numbered context block.
///
/// Chunks are numbered from 1 in the order given, trimmed, and separated by
/// a blank line. No chunks gives an empty string.
pub fn assemble_context<C: Borrow<Chunk>>(chunks: &[C]) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| format!("{}. {}", i + 1, chunk.borrow().text.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}
