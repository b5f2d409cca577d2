//! # Eco Core
//!
//! Domain types, collaborator traits, and error definitions for the Eco
//! context assembler. This crate has **no framework dependencies**; it
//! defines the model that every other crate builds against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (embedding, semantic search, fuzzy matching,
//! tokenization, module content storage, openness scoring) is a trait here.
//! Implementations live in `eco-memory` and `eco-assembler`, so the pipeline
//! can be exercised with in-memory stubs.

pub mod content;
pub mod error;
pub mod memory;
pub mod openness;
pub mod profile;
pub mod request;
pub mod retrieval;
pub mod rules;
pub mod text;
pub mod tokenizer;

// Re-export key types at crate root for ergonomics
pub use content::{ContentProvider, ContentRoot};
pub use error::{ModuleError, RetrievalError, RuleError, TokenizerError};
pub use memory::{MemoryRecord, TechnicalBlock};
pub use openness::{OpennessHeuristic, OpennessLevel, OpennessValue};
pub use profile::EmotionalProfile;
pub use request::AssemblyRequest;
pub use retrieval::{Embedder, FuzzyHeuristicMatcher, HeuristicHit, HeuristicSearch, RecordSearch};
pub use rules::{ConditionalModuleRule, ConditionalRule, EmotionalModuleRule, PromptMatrix, TriggerRule};
pub use text::normalize;
pub use tokenizer::Tokenizer;
