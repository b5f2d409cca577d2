//! Error types for the Eco domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own enum. The assembly pipeline never lets
//! these escape: every one is caught at its call site and logged.

use thiserror::Error;

/// A module could not be resolved from a content root.
#[derive(Debug, Clone, Error)]
pub enum ModuleError {
    #[error("Module not found: {0}")]
    NotFound(String),

    #[error("Module {file} unreadable in {root}: {reason}")]
    Unreadable {
        root: String,
        file: String,
        reason: String,
    },

    #[error("Invalid module name: {0:?}")]
    InvalidName(String),
}

/// An embedding or semantic search collaborator failed.
#[derive(Debug, Clone, Error)]
pub enum RetrievalError {
    #[error("Embedding generation failed: {0}")]
    EmbeddingFailed(String),

    #[error("Search failed in {backend}: {reason}")]
    SearchFailed { backend: String, reason: String },

    #[error("Openness scoring failed: {0}")]
    ScoringFailed(String),

    #[error("Retrieval backend unavailable: {0}")]
    Unavailable(String),
}

/// A conditional-module expression could not be parsed or evaluated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleError {
    #[error("empty condition expression")]
    Empty,

    #[error("condition parse error in {expression:?}: {detail}")]
    Parse { expression: String, detail: String },

    #[error("unknown variable {0:?} (expected intensity or level)")]
    UnknownVariable(String),
}

/// The tokenizer collaborator was unavailable or failed.
#[derive(Debug, Clone, Error)]
pub enum TokenizerError {
    #[error("Tokenizer unavailable: {0}")]
    Unavailable(String),

    #[error("Token encoding failed: {0}")]
    Encode(String),

    #[error("Token decoding failed: {0}")]
    Decode(String),
}
