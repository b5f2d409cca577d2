//! Long-term emotional profile supplied by the caller.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregated emotional history of a user. Read-only to the assembler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmotionalProfile {
    /// Emotion name → how often it was observed.
    #[serde(default, alias = "emocoes_frequentes")]
    pub frequent_emotions: BTreeMap<String, u32>,

    /// Theme name → how often it recurred.
    #[serde(default, alias = "temas_recorrentes")]
    pub recurring_themes: BTreeMap<String, u32>,

    /// When the last significant interaction happened, as supplied.
    #[serde(
        default,
        alias = "ultima_interacao_significativa",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_significant_interaction: Option<String>,

    /// Free-text summary written by a previous analysis pass.
    #[serde(default, alias = "resumo_geral_ia", skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl EmotionalProfile {
    /// Emotion names, most frequent first (ties by name).
    pub fn emotions_by_frequency(&self) -> Vec<&str> {
        by_frequency(&self.frequent_emotions)
    }

    /// Theme names, most frequent first (ties by name).
    pub fn themes_by_frequency(&self) -> Vec<&str> {
        by_frequency(&self.recurring_themes)
    }

    /// The single most frequent emotion, if any were recorded.
    pub fn dominant_emotion(&self) -> Option<&str> {
        self.emotions_by_frequency().into_iter().next()
    }
}

fn by_frequency(map: &BTreeMap<String, u32>) -> Vec<&str> {
    let mut entries: Vec<(&String, &u32)> = map.iter().collect();
    // BTreeMap iteration is already name-ordered; a stable sort keeps that for ties.
    entries.sort_by(|a, b| b.1.cmp(a.1));
    entries.into_iter().map(|(name, _)| name.as_str()).collect()
}
