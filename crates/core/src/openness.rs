//! Openness levels: how much emotional depth a message invites.
//!
//! Scoring itself is delegated to an [`OpennessHeuristic`]; this module owns
//! only the mapping of its raw answer onto the closed set {1, 2, 3}.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RetrievalError;
use crate::text::normalize;

/// The three openness levels. Level 1 gates off memory retrieval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpennessLevel {
    #[default]
    Superficial = 1,
    Reflective = 2,
    Deep = 3,
}

impl OpennessLevel {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Map an integral number in 1..=3 to a level.
    pub fn from_number(n: f64) -> Option<Self> {
        if n.fract() != 0.0 {
            return None;
        }
        match n as i64 {
            1 => Some(Self::Superficial),
            2 => Some(Self::Reflective),
            3 => Some(Self::Deep),
            _ => None,
        }
    }

    /// Map a textual level name (Portuguese or English, any case or accents).
    pub fn from_name(name: &str) -> Option<Self> {
        match normalize(name.trim()).as_str() {
            "baixo" | "low" => Some(Self::Superficial),
            "medio" | "medium" => Some(Self::Reflective),
            "alto" | "high" => Some(Self::Deep),
            _ => None,
        }
    }

    /// Word used in the prompt banner and the emotional-state block.
    pub fn descriptor(self) -> &'static str {
        match self {
            Self::Superficial => "superficial",
            Self::Reflective => "reflective",
            Self::Deep => "deep",
        }
    }

    /// Whether retrieval and narrative sections are allowed at this level.
    pub fn allows_retrieval(self) -> bool {
        self > Self::Superficial
    }
}

impl std::fmt::Display for OpennessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.descriptor(), self.as_u8())
    }
}

/// A raw openness answer: either a level name or a number.
///
/// Appears both as the heuristic's output and on caller-supplied memory
/// records, where it is normalized before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OpennessValue {
    Numeric(f64),
    Named(String),
}

impl OpennessValue {
    /// Resolve to a level, or `None` when ambiguous or out of range.
    pub fn to_level(&self) -> Option<OpennessLevel> {
        match self {
            Self::Numeric(n) => OpennessLevel::from_number(*n),
            Self::Named(name) => OpennessLevel::from_name(name),
        }
    }
}

impl From<OpennessLevel> for OpennessValue {
    fn from(level: OpennessLevel) -> Self {
        Self::Numeric(f64::from(level.as_u8()))
    }
}

/// External scorer deciding how open a message is.
#[async_trait]
pub trait OpennessHeuristic: Send + Sync {
    /// Heuristic name, for logs.
    fn name(&self) -> &str;

    /// Score the raw (un-normalized) message text.
    async fn score(&self, text: &str) -> Result<OpennessValue, RetrievalError>;
}
