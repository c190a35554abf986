//! Top-k retrieval of corpus records for a natural-language query
//!
//! A [`Retriever`] owns a loaded [`IndexStore`] and an [`EmbeddingProvider`].
//! Each call embeds the query, normalizes the vector, runs an exact search
//! and maps index positions back to record texts.


use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

use crate::embeddings::{EmbeddingProvider, normalize};
use crate::store::IndexStore;
use crate::{RagError, Result};

/// Default number of snippets retrieved per question
pub const DEFAULT_TOP_K: usize = 7;

/// One retrieved record with its rank and similarity
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    /// 0-based rank within the result
    pub rank: usize,
    /// Position shared by the index vector and the record
    pub position: usize,
    pub score: f32,
    pub text: String,
}

impl fmt::Display for Hit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] idx={} score={:.4} :: {}",
            self.rank, self.position, self.score, self.text
        )
    }
}

/// Ordered result of one retrieval
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Retrieval {
    pub hits: Vec<Hit>,
    /// Search results dropped because their position had no record
    pub dropped: usize,
}

impl Retrieval {
    /// Snippet texts in rank order
    #[inline]
    pub fn texts(&self) -> Vec<&str> {
        self.hits.iter().map(|hit| hit.text.as_str()).collect()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Human-readable per-result listing
    #[inline]
    pub fn diagnostics(&self) -> String {
        let mut lines = vec!["Retrieved documents:".to_string()];
        lines.extend(self.hits.iter().map(|hit| format!("  {hit}")));
        if self.dropped > 0 {
            lines.push(format!("  ({} out-of-range matches dropped)", self.dropped));
        }
        lines.join("\n")
    }
}

/// Validate a user-supplied k, which may come from a signed CLI argument
#[inline]
pub fn parse_top_k(k: i64) -> Result<usize> {
    usize::try_from(k)
        .ok()
        .filter(|k| *k > 0)
        .ok_or_else(|| RagError::InvalidArgument(format!("k must be a positive integer, got {k}")))
}

#[derive(Debug)]
pub struct Retriever<E> {
    store: IndexStore,
    embedder: E,
    strict: bool,
}

impl<E: EmbeddingProvider> Retriever<E> {
    #[inline]
    pub fn new(store: IndexStore, embedder: E) -> Self {
        Self {
            store,
            embedder,
            strict: false,
        }
    }

    /// Open the store from disk and wrap it
    #[inline]
    pub fn open(index_path: &Path, records_path: &Path, embedder: E) -> Result<Self> {
        Ok(Self::new(IndexStore::open(index_path, records_path)?, embedder))
    }

    /// In strict mode any index/record misalignment fails with `IndexCorruption`
    /// instead of dropping unresolvable hits
    #[inline]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    #[inline]
    pub fn store(&self) -> &IndexStore {
        &self.store
    }

    #[inline]
    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    /// Reload index and records from disk; consistency is checked again
    #[inline]
    pub fn reload(&mut self) -> Result<()> {
        self.store = self.store.reopen()?;
        Ok(())
    }

    /// Retrieve up to `k` records most similar to `query`
    #[inline]
    pub fn retrieve(&self, query: &str, k: usize) -> Result<Retrieval> {
        validate_request(query, k)?;

        let report = self.store.consistency();
        if self.strict && !report.is_consistent {
            return Err(RagError::IndexCorruption(report.summary()));
        }

        let index = self.store.index();
        let mut embedding = self.embedder.embed(query)?;
        if embedding.len() != index.dimension() {
            return Err(RagError::DimensionMismatch {
                expected: index.dimension(),
                actual: embedding.len(),
            });
        }
        normalize(&mut embedding);

        let neighbors = index.search(&embedding, k)?;
        debug!(
            "Search for {:?} returned {} of {} requested neighbors",
            query,
            neighbors.len(),
            k
        );

        let records = self.store.records();
        let mut retrieval = Retrieval::default();
        for neighbor in neighbors {
            match records.get(neighbor.position) {
                Some(text) => retrieval.hits.push(Hit {
                    rank: retrieval.hits.len(),
                    position: neighbor.position,
                    score: neighbor.score,
                    text: text.to_string(),
                }),
                None if self.strict => {
                    return Err(RagError::IndexCorruption(format!(
                        "search returned position {} but only {} records exist",
                        neighbor.position,
                        records.len()
                    )));
                }
                None => {
                    warn!(
                        "Dropping match at position {} (only {} records)",
                        neighbor.position,
                        records.len()
                    );
                    retrieval.dropped += 1;
                }
            }
        }

        for hit in &retrieval.hits {
            debug!("{}", hit);
        }

        Ok(retrieval)
    }
}

/// One-shot retrieval: load the store, search once, discard it
#[inline]
pub fn retrieve<E: EmbeddingProvider>(
    query: &str,
    k: usize,
    index_path: &Path,
    records_path: &Path,
    embedder: E,
) -> Result<Retrieval> {
    validate_request(query, k)?;
    Retriever::open(index_path, records_path, embedder)?.retrieve(query, k)
}

/// Reject blank questions before any index or network work
#[inline]
pub fn parse_query(query: &str) -> Result<&str> {
    if query.trim().is_empty() {
        return Err(RagError::InvalidArgument("query must not be empty".to_string()));
    }
    Ok(query)
}

fn validate_request(query: &str, k: usize) -> Result<()> {
    parse_query(query)?;
    if k == 0 {
        return Err(RagError::InvalidArgument(
            "k must be a positive integer, got 0".to_string(),
        ));
    }
    Ok(())
}
