//! The Eco context assembly pipeline.
//!
//! Turns a user's latest message, optional emotional profile and prior
//! memories into one deterministic prompt for the downstream model:
//!
//! 1. **Greeting shortcut**: brief greetings get the greeting template only
//! 2. **Openness**: classify the input into level 1–3
//! 3. **Triggers**: cognitive, philosophical and stoic keyword tables
//! 4. **Retrieval**: memories, references and narrative chains
//! 5. **Modules**: always-include, level-conditional, triggered, emotional
//! 6. **Narrative**: emotional state and memory narrative blocks
//! 7. **Budget**: tokenize and truncate to the ceiling
//!
//! Every collaborator failure is soft: it is logged and the pipeline
//! continues with an empty result. The one exception is a missing greeting
//! template, which yields a short error string.

pub mod builder;
pub mod emotional;
pub mod greeting;
pub mod loader;
pub mod narrative;
pub mod openness;
pub mod prompt;
pub mod retrieval;
pub mod selector;
pub mod token;
pub mod triggers;
pub mod wiring;

#[cfg(test)]
mod test_helpers;

pub use builder::{AssemblyReport, AssemblySettings, ContextBuilder};
pub use loader::{AssemblyContext, ModuleBlock, ModuleCategory, ModuleLoader};
pub use openness::LexicalOpennessHeuristic;
pub use prompt::{PromptSection, PromptSections};
pub use retrieval::RetrievalSettings;
pub use token::{BudgetOutcome, HeuristicTokenizer, TokenBudget};
pub use wiring::{WiringError, build_from_config, load_catalog};

#[cfg(feature = "hf-tokenizer")]
pub use token::HfTokenizer;
