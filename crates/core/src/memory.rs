//! Memory records: prior emotional moments selected for the narrative.
//!
//! Records are ephemeral: built per request from caller input, retrieval
//! results, or a forced technical block. The assembler only normalizes their
//! openness field and reorders them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::openness::{OpennessLevel, OpennessValue};

/// A single remembered moment, reference, or narrative-chain entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// When the memory was created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Summary text shown in the narrative
    #[serde(alias = "resumo_eco")]
    pub summary: String,

    /// Tags for categorization
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Emotional strength, 0–10
    #[serde(default, alias = "intensidade", skip_serializing_if = "Option::is_none")]
    pub intensity: Option<f32>,

    /// Relevance to the current input, 0–1 (retrieved records only)
    #[serde(default, alias = "similaridade", skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f32>,

    /// Dominant emotion at the time
    #[serde(default, alias = "emocao_principal", skip_serializing_if = "Option::is_none")]
    pub dominant_emotion: Option<String>,

    /// Openness level, as number or name until normalized
    #[serde(default, alias = "nivel_abertura", skip_serializing_if = "Option::is_none")]
    pub openness: Option<OpennessValue>,
}

impl MemoryRecord {
    /// A record carrying only summary text.
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            ..Default::default()
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = Some(intensity);
        self
    }

    pub fn with_similarity(mut self, similarity: f32) -> Self {
        self.similarity = Some(similarity);
        self
    }

    pub fn with_emotion(mut self, emotion: impl Into<String>) -> Self {
        self.dominant_emotion = Some(emotion.into());
        self
    }

    /// Intensity, with a missing value read as 0.
    pub fn intensity_or_zero(&self) -> f32 {
        self.intensity.unwrap_or(0.0)
    }

    /// Similarity, with a missing value read as 0.
    pub fn similarity_or_zero(&self) -> f32 {
        self.similarity.unwrap_or(0.0)
    }

    /// The dominant emotion, ignoring blank strings.
    pub fn emotion(&self) -> Option<&str> {
        self.dominant_emotion
            .as_deref()
            .filter(|e| !e.trim().is_empty())
    }

    /// Resolved openness level; absent or unrecognized values read as level 1.
    pub fn openness_level(&self) -> OpennessLevel {
        self.openness
            .as_ref()
            .and_then(OpennessValue::to_level)
            .unwrap_or_default()
    }

    /// Rewrite the openness field into its numeric 1–3 form.
    pub fn normalize_openness(&mut self) {
        self.openness = Some(self.openness_level().into());
    }
}

/// Precomputed analysis supplied with forced "method" mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechnicalBlock {
    #[serde(default, alias = "analise_resumo", skip_serializing_if = "Option::is_none")]
    pub analysis_summary: Option<String>,

    #[serde(default, alias = "intensidade", skip_serializing_if = "Option::is_none")]
    pub intensity: Option<f32>,

    #[serde(default, alias = "emocao_principal", skip_serializing_if = "Option::is_none")]
    pub dominant_emotion: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}
