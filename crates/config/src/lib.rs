//! Configuration loading and validation for Eco.
//!
//! Loads runtime settings from `~/.eco/config.toml` with environment
//! variable overrides, and the module catalog (trigger tables, emotional
//! rules, prompt matrix) from a separate TOML document.

mod catalog;

pub use catalog::{Catalog, CatalogError, OpennessLexicon};

use eco_core::ContentRoot;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.eco/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where module text and the catalog live
    #[serde(default)]
    pub content: ContentConfig,

    /// Similarity thresholds and retrieval limits
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Final prompt token ceiling
    #[serde(default)]
    pub budget: BudgetConfig,

    /// HTTP gateway
    #[serde(default)]
    pub gateway: GatewayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,

    /// Directory names under `assets_dir`, one per content root
    #[serde(default)]
    pub roots: RootDirs,

    /// Catalog path; relative paths resolve against `assets_dir`
    #[serde(default = "default_catalog_file")]
    pub catalog_file: PathBuf,
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("assets")
}
fn default_catalog_file() -> PathBuf {
    PathBuf::from("catalog.toml")
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            assets_dir: default_assets_dir(),
            roots: RootDirs::default(),
            catalog_file: default_catalog_file(),
        }
    }
}

impl ContentConfig {
    /// Directory backing a content root.
    pub fn root_dir(&self, root: ContentRoot) -> PathBuf {
        self.assets_dir.join(self.roots.name_of(root))
    }

    /// Resolved catalog path.
    pub fn catalog_path(&self) -> PathBuf {
        if self.catalog_file.is_absolute() {
            self.catalog_file.clone()
        } else {
            self.assets_dir.join(&self.catalog_file)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootDirs {
    #[serde(default = "default_emotional_dir")]
    pub emotional: String,
    #[serde(default = "default_stoic_dir")]
    pub stoic: String,
    #[serde(default = "default_philosophical_dir")]
    pub philosophical: String,
    #[serde(default = "default_cognitive_dir")]
    pub cognitive: String,
    #[serde(default = "default_base_dir")]
    pub base: String,
}

fn default_emotional_dir() -> String {
    "emotional".into()
}
fn default_stoic_dir() -> String {
    "philosophical/stoic".into()
}
fn default_philosophical_dir() -> String {
    "philosophical".into()
}
fn default_cognitive_dir() -> String {
    "cognitive".into()
}
fn default_base_dir() -> String {
    "base".into()
}

impl Default for RootDirs {
    fn default() -> Self {
        Self {
            emotional: default_emotional_dir(),
            stoic: default_stoic_dir(),
            philosophical: default_philosophical_dir(),
            cognitive: default_cognitive_dir(),
            base: default_base_dir(),
        }
    }
}

impl RootDirs {
    pub fn name_of(&self, root: ContentRoot) -> &str {
        match root {
            ContentRoot::Emotional => &self.emotional,
            ContentRoot::Stoic => &self.stoic,
            ContentRoot::Philosophical => &self.philosophical,
            ContentRoot::Cognitive => &self.cognitive,
            ContentRoot::Base => &self.base,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Minimum similarity for memories and references
    #[serde(default = "default_threshold")]
    pub default_threshold: f32,

    /// Relaxed threshold when the user asks to recall something
    #[serde(default = "default_recall_threshold")]
    pub recall_threshold: f32,

    /// Intensity at which a memory is moved to the front
    #[serde(default = "default_promotion_intensity")]
    pub promotion_intensity: f32,

    #[serde(default = "default_chain_limit")]
    pub chain_limit: usize,

    #[serde(default = "default_heuristic_threshold")]
    pub heuristic_threshold: f32,

    #[serde(default = "default_heuristic_match_count")]
    pub heuristic_match_count: usize,

    /// Minimum score for fuzzy heuristic candidates
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f32,

    /// JSONL file of indexed memories, references and chains
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub records_file: Option<PathBuf>,
}

fn default_threshold() -> f32 {
    0.55
}
fn default_recall_threshold() -> f32 {
    0.30
}
fn default_promotion_intensity() -> f32 {
    7.0
}
fn default_chain_limit() -> usize {
    3
}
fn default_heuristic_threshold() -> f32 {
    0.75
}
fn default_heuristic_match_count() -> usize {
    5
}
fn default_fuzzy_threshold() -> f32 {
    0.6
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_threshold: default_threshold(),
            recall_threshold: default_recall_threshold(),
            promotion_intensity: default_promotion_intensity(),
            chain_limit: default_chain_limit(),
            heuristic_threshold: default_heuristic_threshold(),
            heuristic_match_count: default_heuristic_match_count(),
            fuzzy_threshold: default_fuzzy_threshold(),
            records_file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetConfig {
    #[serde(default = "default_max_prompt_tokens")]
    pub max_prompt_tokens: usize,

    /// Tokens dropped below the ceiling when truncating
    #[serde(default = "default_truncation_margin")]
    pub truncation_margin: usize,

    /// HuggingFace `tokenizer.json`; only used with the `hf-tokenizer` feature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokenizer_file: Option<PathBuf>,
}

fn default_max_prompt_tokens() -> usize {
    8000
}
fn default_truncation_margin() -> usize {
    100
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            max_prompt_tokens: default_max_prompt_tokens(),
            truncation_margin: default_truncation_margin(),
            tokenizer_file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    42618
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.eco/config.toml).
    ///
    /// Environment overrides (highest priority):
    /// - `ECO_ASSETS_DIR`
    /// - `ECO_CATALOG`
    /// - `ECO_MAX_TOKENS`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (normally the process env).
    pub fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(dir) = lookup("ECO_ASSETS_DIR") {
            self.content.assets_dir = PathBuf::from(dir);
        }
        if let Some(catalog) = lookup("ECO_CATALOG") {
            self.content.catalog_file = PathBuf::from(catalog);
        }
        if let Some(max) = lookup("ECO_MAX_TOKENS") {
            self.budget.max_prompt_tokens = max.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!("ECO_MAX_TOKENS is not a number: {max}"))
            })?;
        }
        self.validate()
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".eco")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let r = &self.retrieval;
        for (name, value) in [
            ("default_threshold", r.default_threshold),
            ("recall_threshold", r.recall_threshold),
            ("heuristic_threshold", r.heuristic_threshold),
            ("fuzzy_threshold", r.fuzzy_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ValidationError(format!(
                    "retrieval.{name} must be between 0.0 and 1.0"
                )));
            }
        }

        if self.budget.truncation_margin >= self.budget.max_prompt_tokens {
            return Err(ConfigError::ValidationError(
                "budget.truncation_margin must be smaller than budget.max_prompt_tokens".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
