use std::collections::{HashMap, HashSet};

use crate::chunk::Chunk;

/// Widen `seeds` to their neighbors and collect them in corpus order.
///
/// Every seed `(doc, idx)` contributes the keys `(doc, idx - range)` through
/// `(doc, idx + range)`. Keys below 0 or past the end of a document simply
/// match nothing. The result walks `corpus` once and emits each targeted
/// chunk a single time, so it is ordered by corpus position, never by score.
pub fn expand_neighbors<'a, I>(corpus: &'a [Chunk], seeds: I, neighbor_range: usize) -> Vec<&'a Chunk>
where
    I: IntoIterator<Item = &'a Chunk>,
{
    let targets = neighbor_targets(corpus, seeds, neighbor_range);
    collect_targets(corpus, &targets)
}

/// Keys `(document_id, chunk_index)` within `neighbor_range` of any seed.
///
/// Only keys that exist in `corpus` are produced, so the set never grows
/// past the size of the seeds' documents however large the range is.
pub fn neighbor_targets<'a, I>(corpus: &[Chunk], seeds: I, neighbor_range: usize) -> HashSet<(&'a str, usize)>
where
    I: IntoIterator<Item = &'a Chunk>,
{
    let mut last_index: HashMap<&str, usize> = HashMap::new();
    for chunk in corpus {
        let last = last_index.entry(chunk.document_id.as_str()).or_insert(0);
        *last = (*last).max(chunk.chunk_index);
    }

    let mut targets = HashSet::new();
    for seed in seeds {
        let Some(&doc_last) = last_index.get(seed.document_id.as_str()) else {
            continue;
        };
        let first = seed.chunk_index.saturating_sub(neighbor_range);
        let last = seed.chunk_index.saturating_add(neighbor_range).min(doc_last);
        for index in first..=last {
            targets.insert((seed.document_id.as_str(), index));
        }
    }
    targets
}

/// Chunks of `corpus` whose key is in `targets`, in corpus order, each once.
pub fn collect_targets<'a>(corpus: &'a [Chunk], targets: &HashSet<(&str, usize)>) -> Vec<&'a Chunk> {
    let mut seen = HashSet::new();
    corpus
        .iter()
        .filter(|chunk| targets.contains(&chunk.key()) && seen.insert(chunk.key()))
        .collect()
}
