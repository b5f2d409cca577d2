//! Retrieval collaborators: embedding, semantic search, fuzzy matching.
//!
//! The assembler only combines their results: thresholds, ordering and
//! promotion live in `eco-assembler`. Each call may fail; callers treat a
//! failure as an empty result.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RetrievalError;
use crate::memory::MemoryRecord;

/// Turns text into a dense vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embedder name, for logs.
    fn name(&self) -> &str;

    /// Output vector length.
    fn dimensions(&self) -> usize;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError>;
}

/// Semantic search over a user's records.
///
/// One trait serves memories, references and narrative chains; the
/// assembler holds a separate instance per collection.
#[async_trait]
pub trait RecordSearch: Send + Sync {
    /// Backend name, for logs.
    fn name(&self) -> &str;

    /// Ranked records for `text`, each carrying a similarity score.
    async fn search(&self, user_id: &str, text: &str) -> Result<Vec<MemoryRecord>, RetrievalError>;
}

/// A heuristic module suggested by fuzzy or semantic matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeuristicHit {
    /// Module filename to load.
    #[serde(alias = "arquivo")]
    pub file: String,

    /// Heuristic family, e.g. `cognitiva` or `filosofico`.
    #[serde(default, alias = "tipo")]
    pub kind: String,

    /// Match strength, 0–1.
    #[serde(default)]
    pub similarity: f32,
}

/// Embedding-based search over the heuristic module library.
#[async_trait]
pub trait HeuristicSearch: Send + Sync {
    fn name(&self) -> &str;

    async fn search(
        &self,
        text: &str,
        user_id: Option<&str>,
    ) -> Result<Vec<HeuristicHit>, RetrievalError>;
}

/// Fuzzy text matcher consulted when no cognitive trigger matches directly.
///
/// Its similarity floor is its own business: it returns only viable
/// candidates, best first, or nothing.
#[async_trait]
pub trait FuzzyHeuristicMatcher: Send + Sync {
    fn name(&self) -> &str;

    async fn rank(&self, text: &str) -> Result<Vec<HeuristicHit>, RetrievalError>;
}
