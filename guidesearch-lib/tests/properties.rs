//! Property tests for chunking, scoring, neighbor expansion and snapshots.

use std::collections::HashSet;
use std::sync::Arc;

use guidesearch_lib::chunk::{Chunk, Chunker, WordWindowChunker};
use guidesearch_lib::config::RetrievalConfig;
use guidesearch_lib::context::assemble_context;
use guidesearch_lib::corpus::{Corpus, Document};
use guidesearch_lib::embed::HashEmbedder;
use guidesearch_lib::search::{Retriever, collect_targets, cosine_similarity, expand_neighbors, neighbor_targets};
use guidesearch_lib::store::EmbeddingStore;
use proptest::prelude::*;

/// `w0 w1 ... w{n-1}`, so a word's position can be read back from it.
fn numbered_words(n: usize) -> String {
    (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
}

fn word_position(word: &str) -> usize {
    word[1..].parse().unwrap()
}

/// Chunk size with a strictly smaller overlap.
fn arb_window() -> impl Strategy<Value = (usize, usize)> {
    (1usize..40).prop_flat_map(|size| (Just(size), 0..size))
}

/// Chunks for documents `d0, d1, ...` with the given chunk counts, in corpus order.
fn corpus_of(sizes: &[usize]) -> Vec<Chunk> {
    sizes
        .iter()
        .enumerate()
        .flat_map(|(d, &n)| (0..n).map(move |i| Chunk::new(format!("d{d}"), i, format!("d{d} chunk {i}"))))
        .collect()
}

fn keys(chunks: &[&Chunk]) -> Vec<(String, usize)> {
    chunks.iter().map(|c| (c.document_id.clone(), c.chunk_index)).collect()
}

mod prop_chunking {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn windows_cover_every_word_and_share_overlap(
            words in 0usize..400,
            (size, overlap) in arb_window(),
        ) {
            let chunker = WordWindowChunker::new(size, overlap).unwrap();
            let windows = chunker.windows(&numbered_words(words));
            let stride = size - overlap;

            let ranges: Vec<(usize, usize)> = windows
                .iter()
                .map(|w| {
                    let first = word_position(w.split(' ').next().unwrap());
                    let last = word_position(w.split(' ').last().unwrap());
                    (first, last + 1)
                })
                .collect();

            let mut covered = vec![false; words];
            for &(start, end) in &ranges {
                prop_assert!(end - start <= size);
                for seen in &mut covered[start..end] {
                    *seen = true;
                }
            }
            prop_assert!(covered.iter().all(|&c| c));

            for (i, pair) in ranges.windows(2).enumerate() {
                let (prev, next) = (pair[0], pair[1]);
                prop_assert_eq!(prev.0, i * stride);
                prop_assert_eq!(next.0, prev.0 + stride);
                // full-length windows share exactly `overlap` words with the next one
                if prev.1 - prev.0 == size {
                    prop_assert_eq!(prev.1 - next.0, overlap);
                }
            }
        }

        #[test]
        fn chunking_is_deterministic(
            text in "[a-z \n]{0,300}",
            (size, overlap) in arb_window(),
        ) {
            let chunker = WordWindowChunker::new(size, overlap).unwrap();
            let doc = Document::new("guide", text);
            prop_assert_eq!(chunker.chunk(&doc), chunker.chunk(&doc));
        }
    }
}

mod prop_scoring {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn cosine_stays_in_range(
            pair in (1usize..32).prop_flat_map(|dim| (
                proptest::collection::vec(-1000.0f32..1000.0, dim),
                proptest::collection::vec(-1000.0f32..1000.0, dim),
            )),
        ) {
            let (a, b) = pair;
            let score = cosine_similarity(&a, &b);
            prop_assert!((-1.0..=1.0).contains(&score));
        }

        #[test]
        fn zero_vector_scores_zero(
            v in proptest::collection::vec(-1000.0f32..1000.0, 1..32),
        ) {
            let zero = vec![0.0; v.len()];
            prop_assert_eq!(cosine_similarity(&zero, &v), 0.0);
            prop_assert_eq!(cosine_similarity(&v, &zero), 0.0);
        }
    }
}

mod prop_expansion {
    use super::*;

    /// Document sizes plus seed positions given as (document, index) picks.
    fn arb_selection() -> impl Strategy<Value = (Vec<usize>, Vec<(usize, usize)>, usize)> {
        proptest::collection::vec(1usize..15, 1..5).prop_flat_map(|sizes| {
            let docs = sizes.len();
            (
                Just(sizes),
                proptest::collection::vec((0..docs, 0usize..15), 0..8),
                prop_oneof![0usize..4, Just(usize::MAX)],
            )
        })
    }

    fn seeds<'a>(corpus: &'a [Chunk], picks: &[(usize, usize)]) -> Vec<&'a Chunk> {
        picks
            .iter()
            .filter_map(|&(d, i)| {
                let id = format!("d{d}");
                corpus.iter().find(|c| c.document_id == id && c.chunk_index == i)
            })
            .collect()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn output_follows_corpus_order((sizes, picks, range) in arb_selection()) {
            let corpus = corpus_of(&sizes);
            // seeds arrive in arbitrary (score) order
            let seeds = seeds(&corpus, &picks);
            let selected = keys(&expand_neighbors(&corpus, seeds, range));

            let mut sorted = selected.clone();
            sorted.sort();
            sorted.dedup();
            prop_assert_eq!(selected, sorted);
        }

        #[test]
        fn expanding_again_adds_nothing((sizes, picks, range) in arb_selection()) {
            let corpus = corpus_of(&sizes);
            let seeds = seeds(&corpus, &picks);
            let selected = expand_neighbors(&corpus, seeds.iter().copied(), range);

            // the same seeds, repeated, reach the same chunks
            let doubled = expand_neighbors(&corpus, seeds.iter().chain(seeds.iter()).copied(), range);
            prop_assert_eq!(keys(&doubled), keys(&selected));

            // folding the expansion back into the selection changes nothing
            let mut targets = neighbor_targets(&corpus, selected.iter().copied(), 0);
            targets.extend(neighbor_targets(&corpus, seeds.iter().copied(), range));
            let refolded = collect_targets(&corpus, &targets);
            prop_assert_eq!(keys(&refolded), keys(&selected));
        }

        #[test]
        fn every_seed_is_selected((sizes, picks, range) in arb_selection()) {
            let corpus = corpus_of(&sizes);
            let seeds = seeds(&corpus, &picks);
            let selected: HashSet<_> = keys(&expand_neighbors(&corpus, seeds.iter().copied(), range))
                .into_iter()
                .collect();

            for seed in seeds {
                prop_assert!(selected.contains(&(seed.document_id.clone(), seed.chunk_index)));
            }
        }
    }
}

mod prop_snapshot {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(20))]

        #[test]
        fn save_then_load_preserves_chunks(
            texts in proptest::collection::vec("[a-z]{1,8}( [a-z]{1,8}){0,40}", 1..5),
            (size, overlap) in arb_window(),
        ) {
            let documents = texts
                .into_iter()
                .enumerate()
                .map(|(i, text)| Document::new(format!("guide-{i}"), text))
                .collect();
            let corpus = Corpus::new(documents).unwrap();
            let chunker = WordWindowChunker::new(size, overlap).unwrap();
            let store = EmbeddingStore::build(&corpus, &chunker, &mut HashEmbedder::new(16), None).unwrap();

            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("store.json");
            store.save(&path).unwrap();
            let loaded = EmbeddingStore::load(&path).unwrap();

            prop_assert_eq!(loaded.len(), store.len());
            for (a, b) in loaded.chunks().iter().zip(store.chunks()) {
                prop_assert_eq!(a.key(), b.key());
                prop_assert_eq!(&a.text, &b.text);
                prop_assert_eq!(a.embedding.len(), b.embedding.len());
                for (x, y) in a.embedding.iter().zip(&b.embedding) {
                    prop_assert!((x - y).abs() <= 1e-6);
                }
            }
        }
    }
}

#[test]
fn empty_corpus_retrieves_nothing() {
    let corpus = Corpus::new(Vec::new()).unwrap();
    let chunker = WordWindowChunker::from_config(&RetrievalConfig::default()).unwrap();
    let mut embedder = HashEmbedder::default();
    let store = EmbeddingStore::build(&corpus, &chunker, &mut embedder, None).unwrap();
    assert!(store.is_empty());

    let mut retriever = Retriever::new(embedder, Arc::new(store), RetrievalConfig::default());
    let chunks = retriever.find_relevant_chunks("How do I refund an order?").unwrap();
    assert!(chunks.is_empty());
    assert_eq!(assemble_context(&chunks), "");
}

#[test]
fn incremental_index_matches_full_rebuild() {
    let chunker = WordWindowChunker::new(6, 2).unwrap();
    let before = Corpus::new(vec![
        Document::new("menus", "Menus are edited from the dashboard under the venue tab"),
        Document::new("refunds", "Open the order and press refund then confirm the amount"),
    ])
    .unwrap();
    let after = Corpus::new(vec![
        Document::new("menus", "Menus are edited from the dashboard under the venue tab"),
        Document::new("refunds", "Open the order and press refund then choose a reason"),
        Document::new("staff", "Invite staff from the team page"),
    ])
    .unwrap();

    let mut embedder = HashEmbedder::new(32);
    let first = EmbeddingStore::build(&before, &chunker, &mut embedder, None).unwrap();
    let incremental = EmbeddingStore::build(&after, &chunker, &mut embedder, Some(&first)).unwrap();
    let full = EmbeddingStore::build(&after, &chunker, &mut embedder, None).unwrap();

    assert_eq!(incremental, full);
}
