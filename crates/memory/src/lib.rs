//! Reference collaborator implementations for Eco.
//!
//! Everything here is a plain, dependency-light stand-in for the production
//! services the assembler talks to: directory-backed module storage, a
//! feature-hashing embedder, in-memory vector indexes and a fuzzy trigger
//! matcher. They make the `eco` binary runnable without external services.

pub mod content;
pub mod embedder;
pub mod fuzzy;
pub mod heuristic_index;
pub mod noop;
pub mod record_index;
pub mod vector;

pub use content::{DirectoryProvider, StaticProvider};
pub use embedder::HashingEmbedder;
pub use fuzzy::BigramFuzzyMatcher;
pub use heuristic_index::HeuristicIndex;
pub use noop::NoopSearch;
pub use record_index::{RecordCollection, RecordIndex, RecordSet};
pub use vector::{cosine_similarity, rank_by_similarity};
