//! Module content roots.
//!
//! Module text lives in five named roots. Lookup walks them in a fixed
//! priority order and stops at the first hit.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ModuleError;

/// The named content roots, declared in lookup priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentRoot {
    Emotional,
    Stoic,
    Philosophical,
    Cognitive,
    Base,
}

impl ContentRoot {
    /// Lookup order: emotional → stoic → philosophical → cognitive → base.
    pub const SEARCH_ORDER: [ContentRoot; 5] = [
        ContentRoot::Emotional,
        ContentRoot::Stoic,
        ContentRoot::Philosophical,
        ContentRoot::Cognitive,
        ContentRoot::Base,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Emotional => "emotional",
            Self::Stoic => "stoic",
            Self::Philosophical => "philosophical",
            Self::Cognitive => "cognitive",
            Self::Base => "base",
        }
    }
}

impl std::fmt::Display for ContentRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A store of module text, keyed by filename.
///
/// Implementations: directory-backed, in-memory.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Provider name (e.g. a directory path), for logs.
    fn name(&self) -> &str;

    /// `Ok(None)` when this provider has no such module.
    async fn lookup(&self, file: &str) -> Result<Option<String>, ModuleError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_order_matches_declaration_order() {
        let mut sorted = ContentRoot::SEARCH_ORDER;
        sorted.sort();
        assert_eq!(sorted, ContentRoot::SEARCH_ORDER);
        assert_eq!(ContentRoot::SEARCH_ORDER[0], ContentRoot::Emotional);
        assert_eq!(ContentRoot::SEARCH_ORDER[4], ContentRoot::Base);
    }
}
