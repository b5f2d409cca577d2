//! In-memory per-user vector index over memory records.
//!
//! One index per collection (memories, references, narrative chains). The
//! `RecordSet` loader splits a single JSONL file into the three.

use async_trait::async_trait;
use eco_core::{Embedder, MemoryRecord, RecordSearch, RetrievalError};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::vector::rank_by_similarity;

/// Which collection a JSONL line belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordCollection {
    #[default]
    #[serde(alias = "memoria")]
    Memory,
    #[serde(alias = "referencia")]
    Reference,
    #[serde(alias = "encadeamento")]
    Chain,
}

struct IndexedRecord {
    user_id: String,
    record: MemoryRecord,
    embedding: Vec<f32>,
}

/// Cosine-similarity search over one user-scoped collection.
pub struct RecordIndex {
    name: String,
    embedder: Arc<dyn Embedder>,
    entries: RwLock<Vec<IndexedRecord>>,
    limit: usize,
}

impl RecordIndex {
    pub const DEFAULT_LIMIT: usize = 10;

    pub fn new(name: impl Into<String>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            name: name.into(),
            embedder,
            entries: RwLock::new(Vec::new()),
            limit: Self::DEFAULT_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Embed a record's summary and add it for `user_id`.
    pub async fn insert(&self, user_id: &str, record: MemoryRecord) -> Result<(), RetrievalError> {
        let embedding = self.embedder.embed(&record.summary).await?;
        self.entries.write().await.push(IndexedRecord {
            user_id: user_id.to_string(),
            record,
            embedding,
        });
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl RecordSearch for RecordIndex {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, user_id: &str, text: &str) -> Result<Vec<MemoryRecord>, RetrievalError> {
        let query = self.embedder.embed(text).await?;
        let entries = self.entries.read().await;

        let ranked = rank_by_similarity(
            entries
                .iter()
                .filter(|e| e.user_id == user_id)
                .map(|e| (e.embedding.as_slice(), &e.record)),
            &query,
            self.limit,
            0.0,
        );

        tracing::debug!(
            index = %self.name,
            user_id,
            hits = ranked.len(),
            "Record search"
        );

        Ok(ranked
            .into_iter()
            .map(|(score, record)| record.clone().with_similarity(score))
            .collect())
    }
}

/// One JSONL line: a record plus its owner and collection.
#[derive(Deserialize)]
struct RecordLine {
    #[serde(default)]
    collection: RecordCollection,

    #[serde(alias = "userId", alias = "usuario_id")]
    user_id: String,

    #[serde(flatten)]
    record: MemoryRecord,
}

/// The three searchable collections.
pub struct RecordSet {
    pub memories: Arc<RecordIndex>,
    pub references: Arc<RecordIndex>,
    pub chains: Arc<RecordIndex>,
}

impl RecordSet {
    pub fn empty(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            memories: Arc::new(RecordIndex::new("memories", embedder.clone())),
            references: Arc::new(RecordIndex::new("references", embedder.clone())),
            chains: Arc::new(RecordIndex::new("chains", embedder)),
        }
    }

    /// Load records from a JSONL file. Blank lines are skipped; a malformed
    /// line fails the whole load with its line number.
    pub async fn load_jsonl(path: &Path, embedder: Arc<dyn Embedder>) -> Result<Self, RetrievalError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| RetrievalError::Unavailable(format!("{}: {e}", path.display())))?;
        Self::from_jsonl(&content, embedder).await
    }

    pub async fn from_jsonl(content: &str, embedder: Arc<dyn Embedder>) -> Result<Self, RetrievalError> {
        let set = Self::empty(embedder);

        for (idx, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let parsed: RecordLine = serde_json::from_str(line).map_err(|e| {
                RetrievalError::Unavailable(format!("record line {}: {e}", idx + 1))
            })?;
            set.index_for(parsed.collection)
                .insert(&parsed.user_id, parsed.record)
                .await?;
        }

        tracing::info!(
            memories = set.memories.len().await,
            references = set.references.len().await,
            chains = set.chains.len().await,
            "Record indexes loaded"
        );
        Ok(set)
    }

    pub fn index_for(&self, collection: RecordCollection) -> &Arc<RecordIndex> {
        match collection {
            RecordCollection::Memory => &self.memories,
            RecordCollection::Reference => &self.references,
            RecordCollection::Chain => &self.chains,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedder::HashingEmbedder;

    fn embedder() -> Arc<dyn Embedder> {
        Arc::new(HashingEmbedder::default())
    }

    #[tokio::test]
    async fn search_is_scoped_to_user() {
        let index = RecordIndex::new("memories", embedder());
        index
            .insert("ana", MemoryRecord::new("medo de falar em público"))
            .await
            .unwrap();
        index
            .insert("bia", MemoryRecord::new("medo de falar em público"))
            .await
            .unwrap();

        let hits = index.search("ana", "medo de falar").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert!(index.search("carla", "medo de falar").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn results_carry_similarity_best_first() {
        let index = RecordIndex::new("memories", embedder());
        index
            .insert("u", MemoryRecord::new("viagem de férias na praia"))
            .await
            .unwrap();
        index
            .insert("u", MemoryRecord::new("ansiedade antes da prova"))
            .await
            .unwrap();

        let hits = index.search("u", "ansiedade antes da prova").await.unwrap();
        assert_eq!(hits[0].summary, "ansiedade antes da prova");
        assert!(hits[0].similarity_or_zero() > 0.99);
        assert!(hits.windows(2).all(|w| w[0].similarity >= w[1].similarity));
    }

    #[tokio::test]
    async fn limit_caps_results() {
        let index = RecordIndex::new("memories", embedder()).with_limit(1);
        for text in ["tristeza", "tristeza profunda", "tristeza leve"] {
            index.insert("u", MemoryRecord::new(text)).await.unwrap();
        }
        assert_eq!(index.search("u", "tristeza").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn jsonl_splits_collections() {
        let jsonl = r#"
{"user_id": "u1", "resumo_eco": "briga com a irmã", "intensidade": 8, "tags": ["familia"]}
{"collection": "reference", "user_id": "u1", "summary": "texto sobre perdão"}

{"collection": "chain", "userId": "u1", "summary": "conversa anterior sobre a irmã"}
"#;
        let set = RecordSet::from_jsonl(jsonl, embedder()).await.unwrap();
        assert_eq!(set.memories.len().await, 1);
        assert_eq!(set.references.len().await, 1);
        assert_eq!(set.chains.len().await, 1);

        let hits = set.memories.search("u1", "irmã").await.unwrap();
        assert_eq!(hits[0].intensity, Some(8.0));
        assert_eq!(hits[0].tags, ["familia"]);
    }

    #[tokio::test]
    async fn malformed_line_reports_position() {
        let jsonl = "{\"user_id\": \"u\", \"summary\": \"ok\"}\nnot json\n";
        let err = RecordSet::from_jsonl(jsonl, embedder()).await.err().unwrap();
        assert!(err.to_string().contains("line 2"));
    }

    #[tokio::test]
    async fn missing_file_is_unavailable() {
        let result = RecordSet::load_jsonl(Path::new("/nonexistent/records.jsonl"), embedder()).await;
        assert!(matches!(result, Err(RetrievalError::Unavailable(_))));
    }
}
