//! Production wiring: a `ContextBuilder` assembled from `AppConfig`.
//!
//! Content roots become `DirectoryProvider`s under `content.assets_dir`,
//! retrieval runs against in-memory indexes built with the hashing embedder,
//! and the catalog's trigger phrases double as the heuristic library.

use eco_config::{AppConfig, Catalog, CatalogError};
use eco_core::{ContentRoot, Embedder, RetrievalError, TokenizerError};
use eco_memory::heuristic_index::{KIND_COGNITIVE, KIND_PHILOSOPHICAL};
use eco_memory::{
    BigramFuzzyMatcher, DirectoryProvider, HashingEmbedder, HeuristicIndex, RecordCollection,
    RecordSet,
};
use std::path::PathBuf;
use std::sync::Arc;

use crate::builder::{AssemblySettings, ContextBuilder};

#[derive(Debug, thiserror::Error)]
pub enum WiringError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Failed to load records from {}: {source}", path.display())]
    Records {
        path: PathBuf,
        source: RetrievalError,
    },

    #[error("Tokenizer error: {0}")]
    Tokenizer(#[from] TokenizerError),
}

/// Load the catalog named by the config. A missing file is not an error:
/// the assembler runs with an empty catalog.
pub fn load_catalog(config: &AppConfig) -> Result<Catalog, CatalogError> {
    match Catalog::load_from(&config.content.catalog_path()) {
        Err(CatalogError::NotFound(path)) => {
            tracing::warn!(path = %path.display(), "Module catalog not found, continuing with an empty catalog");
            Ok(Catalog::default())
        }
        other => other,
    }
}

/// Build the context builder used by the binary and the gateway.
pub async fn build_from_config(config: &AppConfig) -> Result<ContextBuilder, WiringError> {
    let catalog = load_catalog(config)?;
    let embedder: Arc<dyn Embedder> = Arc::new(HashingEmbedder::default());

    let records = match &config.retrieval.records_file {
        Some(path) => RecordSet::load_jsonl(path, embedder.clone())
            .await
            .map_err(|source| WiringError::Records {
                path: path.clone(),
                source,
            })?,
        None => {
            tracing::info!("No records file configured, semantic retrieval returns nothing");
            RecordSet::empty(embedder.clone())
        }
    };

    let heuristics = heuristic_index(&catalog, embedder, config).await;
    let fuzzy = catalog
        .cognitive
        .iter()
        .fold(
            BigramFuzzyMatcher::new(config.retrieval.fuzzy_threshold),
            |matcher, rule| matcher.with_phrases(&rule.file, &rule.triggers),
        );

    let mut builder = ContextBuilder::new(catalog)
        .with_heuristic_search(Arc::new(heuristics))
        .with_fuzzy_matcher(Arc::new(fuzzy))
        .with_memory_search(records.index_for(RecordCollection::Memory).clone())
        .with_reference_search(records.index_for(RecordCollection::Reference).clone())
        .with_chain_search(records.index_for(RecordCollection::Chain).clone())
        .with_settings(AssemblySettings::from_config(config));

    for root in ContentRoot::SEARCH_ORDER {
        let dir = config.content.root_dir(root);
        if !dir.is_dir() {
            tracing::warn!(root = %root, dir = %dir.display(), "Content root directory missing");
        }
        builder = builder.with_root(root, Arc::new(DirectoryProvider::new(dir)));
    }

    if let Some(path) = &config.budget.tokenizer_file {
        builder = with_tokenizer_file(builder, path)?;
    }

    Ok(builder)
}

#[cfg(feature = "hf-tokenizer")]
fn with_tokenizer_file(
    builder: ContextBuilder,
    path: &std::path::Path,
) -> Result<ContextBuilder, WiringError> {
    let tokenizer = crate::token::HfTokenizer::from_file(path)?;
    tracing::info!(path = %path.display(), "HuggingFace tokenizer loaded");
    Ok(builder.with_tokenizer(Arc::new(tokenizer)))
}

#[cfg(not(feature = "hf-tokenizer"))]
fn with_tokenizer_file(
    builder: ContextBuilder,
    path: &std::path::Path,
) -> Result<ContextBuilder, WiringError> {
    tracing::warn!(
        path = %path.display(),
        "budget.tokenizer_file set but built without the hf-tokenizer feature, using the byte-chunk tokenizer"
    );
    Ok(builder)
}

/// Index cognitive and philosophical modules by their trigger phrases.
async fn heuristic_index(
    catalog: &Catalog,
    embedder: Arc<dyn Embedder>,
    config: &AppConfig,
) -> HeuristicIndex {
    let mut index = HeuristicIndex::new(embedder)
        .with_threshold(config.retrieval.heuristic_threshold)
        .with_max_results(config.retrieval.heuristic_match_count);

    let entries = catalog
        .cognitive
        .iter()
        .map(|rule| (rule, KIND_COGNITIVE))
        .chain(catalog.philosophical.iter().map(|rule| (rule, KIND_PHILOSOPHICAL)));

    for (rule, kind) in entries {
        let text = rule.triggers.join(" ");
        if rule.file.trim().is_empty() || text.trim().is_empty() {
            continue;
        }
        if let Err(e) = index.add(&rule.file, kind, &text).await {
            tracing::warn!(file = %rule.file, error = %e, "Failed to index heuristic module");
        }
    }

    tracing::debug!(entries = index.len(), "Heuristic index built");
    index
}
