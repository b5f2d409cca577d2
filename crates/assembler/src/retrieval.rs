//! Memory selection: forced records, semantic retrieval, thresholds,
//! promotion and tag filtering.

use eco_config::RetrievalConfig;
use eco_core::{EmotionalProfile, MemoryRecord, RecordSearch, TechnicalBlock};

/// Stems that mark a request to recall something, matched on normalized input.
const RECALL_STEMS: [&str; 5] = ["lembr", "record", "memor", "recall", "remember"];

#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalSettings {
    pub default_threshold: f32,
    pub recall_threshold: f32,
    pub promotion_intensity: f32,
    pub chain_limit: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self::from_config(&RetrievalConfig::default())
    }
}

impl RetrievalSettings {
    pub fn from_config(config: &RetrievalConfig) -> Self {
        Self {
            default_threshold: config.default_threshold,
            recall_threshold: config.recall_threshold,
            promotion_intensity: config.promotion_intensity,
            chain_limit: config.chain_limit,
        }
    }

    /// Similarity floor for this input.
    pub fn threshold_for(&self, normalized: &str) -> f32 {
        if is_recall_query(normalized) {
            tracing::info!("Recall question detected, lowering similarity threshold");
            self.recall_threshold
        } else {
            self.default_threshold
        }
    }
}

pub fn is_recall_query(normalized: &str) -> bool {
    RECALL_STEMS.iter().any(|stem| normalized.contains(stem))
}

/// The single synthetic record used in forced method mode.
pub fn forced_record(block: &TechnicalBlock, input: &str) -> MemoryRecord {
    MemoryRecord {
        summary: block
            .analysis_summary
            .clone()
            .unwrap_or_else(|| input.to_string()),
        tags: block.tags.clone(),
        intensity: Some(block.intensity.unwrap_or(0.0)),
        dominant_emotion: block.dominant_emotion.clone(),
        ..Default::default()
    }
}

/// A record standing for the current message, tagged with the profile's
/// recurring themes.
pub fn current_turn_record(profile: &EmotionalProfile, input: &str) -> MemoryRecord {
    MemoryRecord {
        summary: input.to_string(),
        tags: profile
            .themes_by_frequency()
            .into_iter()
            .map(String::from)
            .collect(),
        intensity: Some(0.0),
        dominant_emotion: profile.dominant_emotion().map(String::from),
        ..Default::default()
    }
}

/// Keep records whose similarity (missing = 0) meets the threshold.
pub fn filter_by_similarity(records: Vec<MemoryRecord>, threshold: f32) -> Vec<MemoryRecord> {
    records
        .into_iter()
        .filter(|r| r.similarity_or_zero() >= threshold)
        .collect()
}

/// Move the first intense, relevant record to the front. Everything else
/// keeps its relative order; at most one record moves.
pub fn promote_intense(
    mut records: Vec<MemoryRecord>,
    min_intensity: f32,
    threshold: f32,
) -> Vec<MemoryRecord> {
    let found = records
        .iter()
        .position(|r| r.intensity_or_zero() >= min_intensity && r.similarity_or_zero() >= threshold);
    if let Some(idx) = found {
        tracing::info!(index = idx, "Promoting intense memory to the front");
        let record = records.remove(idx);
        records.insert(0, record);
    }
    records
}

/// Keep records sharing at least one tag with `targets`. No targets, no
/// filtering.
pub fn filter_by_tags(records: Vec<MemoryRecord>, targets: &[String]) -> Vec<MemoryRecord> {
    if targets.is_empty() {
        return records;
    }
    records
        .into_iter()
        .filter(|r| r.tags.iter().any(|t| targets.contains(t)))
        .collect()
}

/// Query memories and references concurrently, then filter, promote and
/// tag-filter. Each search failure counts as an empty result.
pub async fn retrieve_memories(
    memories: &dyn RecordSearch,
    references: &dyn RecordSearch,
    user_id: &str,
    input: &str,
    normalized: &str,
    target_tags: &[String],
    settings: &RetrievalSettings,
) -> Vec<MemoryRecord> {
    let threshold = settings.threshold_for(normalized);

    let (found_memories, found_references) = tokio::join!(
        memories.search(user_id, input),
        references.search(user_id, input)
    );
    let found_memories = found_memories.unwrap_or_else(|e| {
        tracing::warn!(backend = memories.name(), error = %e, "Memory search failed");
        Vec::new()
    });
    let found_references = found_references.unwrap_or_else(|e| {
        tracing::warn!(backend = references.name(), error = %e, "Reference search failed");
        Vec::new()
    });

    let mut selected = filter_by_similarity(found_memories, threshold);
    selected.extend(filter_by_similarity(found_references, threshold));

    let selected = promote_intense(selected, settings.promotion_intensity, threshold);

    for (idx, m) in selected.iter().enumerate() {
        tracing::debug!(
            index = idx + 1,
            summary = %m.summary.chars().take(30).collect::<String>(),
            intensity = ?m.intensity,
            similarity = ?m.similarity,
            "Retrieved memory"
        );
    }

    filter_by_tags(selected, target_tags)
}

/// Up to `limit` narrative chains. Failure counts as none.
pub async fn retrieve_chains(
    chains: &dyn RecordSearch,
    user_id: &str,
    input: &str,
    limit: usize,
) -> Vec<MemoryRecord> {
    match chains.search(user_id, input).await {
        Ok(mut found) => {
            found.truncate(limit);
            found
        }
        Err(e) => {
            tracing::warn!(backend = chains.name(), error = %e, "Narrative chain search failed");
            Vec::new()
        }
    }
}
