//! The module catalog: trigger tables, emotional rules and the prompt matrix.
//!
//! Static for the lifetime of the process. The assembler only reads it.

use eco_core::{EmotionalModuleRule, PromptMatrix, RuleError, TriggerRule};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Cognitive heuristics, first match wins (table order is priority)
    #[serde(default, alias = "heuristicasTriggerMap")]
    pub cognitive: Vec<TriggerRule>,

    /// Any trigger activates; every matching entry loads
    #[serde(default, alias = "filosoficosTriggerMap")]
    pub philosophical: Vec<TriggerRule>,

    /// Every trigger must match
    #[serde(default, alias = "estoicosTriggerMap")]
    pub stoic: Vec<TriggerRule>,

    #[serde(default, alias = "emocionaisTriggerMap")]
    pub emotional: Vec<EmotionalModuleRule>,

    #[serde(default)]
    pub matrix: PromptMatrix,

    /// Heuristic filename → tags a retrieved memory must carry
    #[serde(default)]
    pub heuristic_tags: BTreeMap<String, Vec<String>>,

    #[serde(default)]
    pub openness: OpennessLexicon,
}

/// Marker phrases for the lexical openness heuristic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpennessLexicon {
    #[serde(default = "default_deep_markers")]
    pub deep_markers: Vec<String>,

    #[serde(default = "default_reflective_markers")]
    pub reflective_markers: Vec<String>,
}

fn default_deep_markers() -> Vec<String> {
    [
        "nao aguento",
        "desesper",
        "vazio",
        "sem sentido",
        "trauma",
        "luto",
        "can't take",
        "hopeless",
        "empty inside",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_reflective_markers() -> Vec<String> {
    [
        "sinto",
        "sentindo",
        "pensando",
        "refletir",
        "por que",
        "ansios",
        "triste",
        "cansad",
        "feel",
        "wonder",
        "anxious",
        "sad",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for OpennessLexicon {
    fn default() -> Self {
        Self {
            deep_markers: default_deep_markers(),
            reflective_markers: default_reflective_markers(),
        }
    }
}

impl Catalog {
    /// Load a catalog from a TOML file.
    pub fn load_from(path: &Path) -> Result<Self, CatalogError> {
        if !path.exists() {
            return Err(CatalogError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path).map_err(|e| CatalogError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let catalog = Self::from_toml_str(&content).map_err(|e| match e {
            CatalogError::ParseError { reason, .. } => CatalogError::ParseError {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })?;

        tracing::info!(
            path = %path.display(),
            cognitive = catalog.cognitive.len(),
            philosophical = catalog.philosophical.len(),
            stoic = catalog.stoic.len(),
            emotional = catalog.emotional.len(),
            "Module catalog loaded"
        );
        Ok(catalog)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, CatalogError> {
        toml::from_str(content).map_err(|e| CatalogError::ParseError {
            path: PathBuf::new(),
            reason: e.to_string(),
        })
    }

    /// Target tags declared for a heuristic module, if any.
    pub fn tags_for_heuristic(&self, file: &str) -> &[String] {
        self.heuristic_tags
            .get(file)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Conditions in the prompt matrix that do not parse.
    ///
    /// These modules can never activate; `eco check` reports them.
    pub fn invalid_conditions(&self) -> Vec<(String, RuleError)> {
        self.matrix
            .conditions
            .iter()
            .filter_map(|(file, rule)| {
                eco_rules::parse_condition(&rule.expression)
                    .err()
                    .map(|e| (file.clone(), e))
            })
            .collect()
    }

    /// Every distinct filename the catalog refers to, sorted.
    pub fn referenced_files(&self) -> Vec<&str> {
        let mut files: Vec<&str> = self
            .cognitive
            .iter()
            .chain(&self.philosophical)
            .chain(&self.stoic)
            .map(|r| r.file.as_str())
            .chain(self.emotional.iter().flat_map(|r| {
                std::iter::once(r.file.as_str()).chain(r.related.iter().map(String::as_str))
            }))
            .chain(self.matrix.always_include.iter().map(String::as_str))
            .chain(self.matrix.by_level.values().flatten().map(String::as_str))
            .filter(|f| !f.trim().is_empty())
            .collect();
        files.sort_unstable();
        files.dedup();
        files
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog not found at {0}")]
    NotFound(PathBuf),

    #[error("Failed to read catalog at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse catalog at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },
}
