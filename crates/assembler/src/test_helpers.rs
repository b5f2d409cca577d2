//! Shared mock collaborators for assembler tests.

use async_trait::async_trait;
use eco_core::{
    ContentProvider, FuzzyHeuristicMatcher, HeuristicHit, HeuristicSearch, MemoryRecord,
    ModuleError, OpennessHeuristic, OpennessValue, RecordSearch, RetrievalError, Tokenizer,
    TokenizerError,
};
use eco_memory::StaticProvider;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A record with summary, intensity and similarity set.
pub fn record(summary: &str, intensity: f32, similarity: f32) -> MemoryRecord {
    MemoryRecord::new(summary)
        .with_intensity(intensity)
        .with_similarity(similarity)
}

/// An in-memory content root.
pub fn static_root(modules: &[(&str, &str)]) -> Arc<dyn ContentProvider> {
    let provider = modules
        .iter()
        .fold(StaticProvider::new("static"), |p, (file, text)| {
            p.with_module(*file, *text)
        });
    Arc::new(provider)
}

/// A content root that fails every lookup.
pub struct BrokenProvider;

#[async_trait]
impl ContentProvider for BrokenProvider {
    fn name(&self) -> &str {
        "broken"
    }

    async fn lookup(&self, file: &str) -> Result<Option<String>, ModuleError> {
        Err(ModuleError::Unreadable {
            root: "broken".into(),
            file: file.into(),
            reason: "permission denied".into(),
        })
    }
}

/// Always answers with the same openness value.
pub struct FixedOpenness(pub OpennessValue);

impl FixedOpenness {
    pub fn named(name: &str) -> Self {
        Self(OpennessValue::Named(name.into()))
    }

    pub fn numeric(n: f64) -> Self {
        Self(OpennessValue::Numeric(n))
    }
}

#[async_trait]
impl OpennessHeuristic for FixedOpenness {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn score(&self, _text: &str) -> Result<OpennessValue, RetrievalError> {
        Ok(self.0.clone())
    }
}

pub struct FailingOpenness;

#[async_trait]
impl OpennessHeuristic for FailingOpenness {
    fn name(&self) -> &str {
        "failing"
    }

    async fn score(&self, _text: &str) -> Result<OpennessValue, RetrievalError> {
        Err(RetrievalError::ScoringFailed("model offline".into()))
    }
}

/// Returns fixed records and counts calls.
pub struct ScriptedSearch {
    records: Vec<MemoryRecord>,
    delay: Option<Duration>,
    calls: Mutex<usize>,
}

impl ScriptedSearch {
    pub fn new(records: Vec<MemoryRecord>) -> Self {
        Self {
            records,
            delay: None,
            calls: Mutex::new(0),
        }
    }

    /// Answer only after `delay` has elapsed.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl RecordSearch for ScriptedSearch {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn search(&self, _user_id: &str, _text: &str) -> Result<Vec<MemoryRecord>, RetrievalError> {
        *self.calls.lock().unwrap() += 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.records.clone())
    }
}

/// Fails every search, of every kind.
pub struct FailingSearch;

#[async_trait]
impl RecordSearch for FailingSearch {
    fn name(&self) -> &str {
        "failing"
    }

    async fn search(&self, _user_id: &str, _text: &str) -> Result<Vec<MemoryRecord>, RetrievalError> {
        Err(RetrievalError::SearchFailed {
            backend: "failing".into(),
            reason: "connection refused".into(),
        })
    }
}

#[async_trait]
impl HeuristicSearch for FailingSearch {
    fn name(&self) -> &str {
        "failing"
    }

    async fn search(
        &self,
        _text: &str,
        _user_id: Option<&str>,
    ) -> Result<Vec<HeuristicHit>, RetrievalError> {
        Err(RetrievalError::Unavailable("index not built".into()))
    }
}

fn hits(files: &[&str]) -> Vec<HeuristicHit> {
    files
        .iter()
        .map(|f| HeuristicHit {
            file: f.to_string(),
            kind: "cognitiva".into(),
            similarity: 0.9,
        })
        .collect()
}

/// Fuzzy matcher returning fixed candidates, best first.
pub struct ScriptedFuzzy {
    hits: Vec<HeuristicHit>,
    calls: Mutex<usize>,
}

impl ScriptedFuzzy {
    pub fn new(files: &[&str]) -> Self {
        Self {
            hits: hits(files),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl FuzzyHeuristicMatcher for ScriptedFuzzy {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn rank(&self, _text: &str) -> Result<Vec<HeuristicHit>, RetrievalError> {
        *self.calls.lock().unwrap() += 1;
        Ok(self.hits.clone())
    }
}

pub struct FailingFuzzy;

#[async_trait]
impl FuzzyHeuristicMatcher for FailingFuzzy {
    fn name(&self) -> &str {
        "failing"
    }

    async fn rank(&self, _text: &str) -> Result<Vec<HeuristicHit>, RetrievalError> {
        Err(RetrievalError::Unavailable("fuzzy service down".into()))
    }
}

/// Heuristic search returning fixed hits.
pub struct ScriptedHeuristics {
    hits: Vec<HeuristicHit>,
}

impl ScriptedHeuristics {
    pub fn new(files: &[&str]) -> Self {
        Self { hits: hits(files) }
    }
}

#[async_trait]
impl HeuristicSearch for ScriptedHeuristics {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn search(
        &self,
        _text: &str,
        _user_id: Option<&str>,
    ) -> Result<Vec<HeuristicHit>, RetrievalError> {
        Ok(self.hits.clone())
    }
}

/// One token per character; remembers how many tokens were last decoded.
pub struct CharTokenizer {
    last_decode: Mutex<Option<usize>>,
}

impl CharTokenizer {
    pub fn new() -> Self {
        Self {
            last_decode: Mutex::new(None),
        }
    }

    pub fn last_decode_len(&self) -> Option<usize> {
        *self.last_decode.lock().unwrap()
    }
}

#[async_trait]
impl Tokenizer for CharTokenizer {
    fn name(&self) -> &str {
        "char"
    }

    async fn encode(&self, text: &str) -> Result<Vec<u32>, TokenizerError> {
        Ok(text.chars().map(u32::from).collect())
    }

    async fn decode(&self, tokens: &[u32]) -> Result<String, TokenizerError> {
        *self.last_decode.lock().unwrap() = Some(tokens.len());
        tokens
            .iter()
            .map(|t| char::from_u32(*t).ok_or_else(|| TokenizerError::Decode(format!("bad id {t}"))))
            .collect()
    }
}

pub struct FailingTokenizer;

#[async_trait]
impl Tokenizer for FailingTokenizer {
    fn name(&self) -> &str {
        "failing"
    }

    async fn encode(&self, _text: &str) -> Result<Vec<u32>, TokenizerError> {
        Err(TokenizerError::Unavailable("no vocabulary".into()))
    }

    async fn decode(&self, _tokens: &[u32]) -> Result<String, TokenizerError> {
        Err(TokenizerError::Unavailable("no vocabulary".into()))
    }
}
