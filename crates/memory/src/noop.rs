//! No-op retrieval: disables semantic search entirely.

use async_trait::async_trait;
use eco_core::{
    FuzzyHeuristicMatcher, HeuristicHit, HeuristicSearch, MemoryRecord, RecordSearch,
    RetrievalError,
};

/// Finds nothing, for every kind of search.
pub struct NoopSearch;

#[async_trait]
impl RecordSearch for NoopSearch {
    fn name(&self) -> &str {
        "none"
    }

    async fn search(&self, _user_id: &str, _text: &str) -> Result<Vec<MemoryRecord>, RetrievalError> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl HeuristicSearch for NoopSearch {
    fn name(&self) -> &str {
        "none"
    }

    async fn search(
        &self,
        _text: &str,
        _user_id: Option<&str>,
    ) -> Result<Vec<HeuristicHit>, RetrievalError> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl FuzzyHeuristicMatcher for NoopSearch {
    fn name(&self) -> &str {
        "none"
    }

    async fn rank(&self, _text: &str) -> Result<Vec<HeuristicHit>, RetrievalError> {
        Ok(Vec::new())
    }
}
