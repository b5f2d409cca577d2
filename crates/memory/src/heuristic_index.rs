//! Embedding search over the heuristic module library.

use async_trait::async_trait;
use eco_core::{Embedder, HeuristicHit, HeuristicSearch, RetrievalError};
use std::sync::Arc;

use crate::vector::rank_by_similarity;

/// Kind label for cognitive heuristics.
pub const KIND_COGNITIVE: &str = "cognitiva";
/// Kind label for philosophical modules.
pub const KIND_PHILOSOPHICAL: &str = "filosofico";

struct IndexedHeuristic {
    hit: HeuristicHit,
    embedding: Vec<f32>,
}

/// Ranks heuristic modules by similarity between the input and each module's
/// descriptive text (typically its trigger phrases).
pub struct HeuristicIndex {
    embedder: Arc<dyn Embedder>,
    entries: Vec<IndexedHeuristic>,
    threshold: f32,
    max_results: usize,
    kinds: Vec<String>,
}

impl HeuristicIndex {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            entries: Vec::new(),
            threshold: 0.75,
            max_results: 5,
            kinds: vec![KIND_COGNITIVE.into(), KIND_PHILOSOPHICAL.into()],
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Restrict results to these kinds. An empty list allows every kind.
    pub fn with_kinds<I, S>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.kinds = kinds.into_iter().map(Into::into).collect();
        self
    }

    /// Index a module under `kind`, described by `text`.
    pub async fn add(&mut self, file: &str, kind: &str, text: &str) -> Result<(), RetrievalError> {
        let embedding = self.embedder.embed(text).await?;
        self.entries.push(IndexedHeuristic {
            hit: HeuristicHit {
                file: file.to_string(),
                kind: kind.to_string(),
                similarity: 0.0,
            },
            embedding,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl HeuristicSearch for HeuristicIndex {
    fn name(&self) -> &str {
        "heuristic_index"
    }

    async fn search(
        &self,
        text: &str,
        _user_id: Option<&str>,
    ) -> Result<Vec<HeuristicHit>, RetrievalError> {
        if text.trim().is_empty() || self.entries.is_empty() {
            return Ok(Vec::new());
        }
        let query = self.embedder.embed(text).await?;

        let ranked = rank_by_similarity(
            self.entries
                .iter()
                .filter(|e| self.kinds.is_empty() || self.kinds.contains(&e.hit.kind))
                .map(|e| (e.embedding.as_slice(), &e.hit)),
            &query,
            self.max_results,
            self.threshold,
        );

        Ok(ranked
            .into_iter()
            .map(|(similarity, hit)| HeuristicHit {
                similarity,
                ..hit.clone()
            })
            .collect())
    }
}
