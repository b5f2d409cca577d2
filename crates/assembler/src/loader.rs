//! Module loading across content roots, at most once per assembly.

use eco_core::{ContentProvider, ContentRoot, ModuleError};
use std::collections::HashSet;
use std::sync::Arc;

/// Label shown in a module block header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleCategory {
    Base,
    Cognitive,
    Philosophical,
    Stoic,
    Emotional,
    Related,
}

impl ModuleCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Base => "Base",
            Self::Cognitive => "Cognitive",
            Self::Philosophical => "Philosophical",
            Self::Stoic => "Stoic",
            Self::Emotional => "Emotional",
            Self::Related => "Related",
        }
    }
}

/// One loaded module.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleBlock {
    pub file: String,
    pub category: ModuleCategory,
    pub root: ContentRoot,
    /// Trimmed module text
    pub content: String,
}

impl ModuleBlock {
    pub fn render(&self) -> String {
        format!(
            "[Module {} → {}]\n{}",
            self.category.label(),
            self.file,
            self.content
        )
    }
}

/// Per-assembly accumulator: loaded blocks in call order plus the set of
/// filenames already inserted.
#[derive(Debug, Default)]
pub struct AssemblyContext {
    inserted: HashSet<String>,
    blocks: Vec<ModuleBlock>,
}

impl AssemblyContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, file: &str) -> bool {
        self.inserted.contains(file)
    }

    /// Append a block unless its file is already present. Returns whether
    /// it was appended.
    pub fn insert(&mut self, block: ModuleBlock) -> bool {
        if !self.inserted.insert(block.file.clone()) {
            return false;
        }
        self.blocks.push(block);
        true
    }

    pub fn blocks(&self) -> &[ModuleBlock] {
        &self.blocks
    }

    /// Loaded filenames in insertion order.
    pub fn files(&self) -> Vec<String> {
        self.blocks.iter().map(|b| b.file.clone()).collect()
    }
}

/// Resolves module filenames against an ordered list of content roots.
#[derive(Clone, Default)]
pub struct ModuleLoader {
    roots: Vec<(ContentRoot, Arc<dyn ContentProvider>)>,
}

impl ModuleLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the provider backing a root. Roots stay sorted
    /// in lookup order regardless of registration order.
    pub fn with_root(mut self, root: ContentRoot, provider: Arc<dyn ContentProvider>) -> Self {
        self.roots.retain(|(r, _)| *r != root);
        self.roots.push((root, provider));
        self.roots.sort_by_key(|(r, _)| *r);
        self
    }

    pub fn roots(&self) -> impl Iterator<Item = (ContentRoot, &str)> {
        self.roots.iter().map(|(r, p)| (*r, p.name()))
    }

    /// Read a module from one specific root.
    pub async fn read_from(&self, root: ContentRoot, file: &str) -> Result<Option<String>, ModuleError> {
        match self.roots.iter().find(|(r, _)| *r == root) {
            Some((_, provider)) => provider.lookup(file).await,
            None => Ok(None),
        }
    }

    /// First root holding `file`, in lookup order. Lookup errors are logged
    /// and treated as a miss.
    pub async fn resolve(&self, file: &str) -> Option<(ContentRoot, String)> {
        for (root, provider) in &self.roots {
            match provider.lookup(file).await {
                Ok(Some(text)) => return Some((*root, text)),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(root = %root, file, error = %e, "Module lookup failed, trying next root");
                }
            }
        }
        None
    }

    /// Load a module into the context once. Blank names, duplicates and
    /// missing modules are no-ops. Returns whether a block was added.
    pub async fn load_module(
        &self,
        ctx: &mut AssemblyContext,
        file: &str,
        category: ModuleCategory,
    ) -> bool {
        tracing::debug!(file, category = category.label(), "Inserting module");

        if file.trim().is_empty() {
            tracing::warn!(category = category.label(), "Ignoring module with blank filename");
            return false;
        }
        if ctx.contains(file) {
            tracing::info!(file, "Module already inserted");
            return false;
        }

        match self.resolve(file).await {
            Some((root, text)) => {
                tracing::info!(file, root = %root, "Module loaded");
                ctx.insert(ModuleBlock {
                    file: file.to_string(),
                    category,
                    root,
                    content: text.trim().to_string(),
                })
            }
            None => {
                tracing::warn!(file, "Module not found in any content root");
                false
            }
        }
    }
}
