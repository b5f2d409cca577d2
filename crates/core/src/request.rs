//! The single request object accepted by the assembler.

use serde::{Deserialize, Serialize};

use crate::memory::{MemoryRecord, TechnicalBlock};
use crate::profile::EmotionalProfile;

/// Everything the caller knows about the current turn. Every field is
/// optional; an empty request still assembles a prompt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssemblyRequest {
    #[serde(default, alias = "perfil", skip_serializing_if = "Option::is_none")]
    pub profile: Option<EmotionalProfile>,

    /// The user's latest message
    #[serde(default, alias = "ultimaMsg", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, alias = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Display name substituted into the greeting template
    #[serde(default, alias = "userName", skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,

    /// Memories already retrieved by the caller
    #[serde(default, alias = "mems", skip_serializing_if = "Option::is_none")]
    pub memories: Option<Vec<MemoryRecord>>,

    #[serde(default, alias = "forcarMetodoViva")]
    pub force_method: bool,

    #[serde(default, alias = "blocoTecnicoForcado", skip_serializing_if = "Option::is_none")]
    pub technical_block: Option<TechnicalBlock>,
}

impl AssemblyRequest {
    /// A request carrying only a message.
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            message: Some(text.into()),
            ..Default::default()
        }
    }

    /// The trimmed message, or `""`.
    pub fn input(&self) -> &str {
        self.message.as_deref().map(str::trim).unwrap_or_default()
    }

    /// The user id, ignoring blank strings.
    pub fn user(&self) -> Option<&str> {
        self.user_id.as_deref().filter(|id| !id.trim().is_empty())
    }

    /// The technical block, only when forced method mode is on.
    pub fn forced_block(&self) -> Option<&TechnicalBlock> {
        self.technical_block.as_ref().filter(|_| self.force_method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_is_a_valid_request() {
        let req: AssemblyRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req, AssemblyRequest::default());
        assert_eq!(req.input(), "");
    }

    #[test]
    fn forced_block_requires_the_flag() {
        let mut req = AssemblyRequest {
            technical_block: Some(TechnicalBlock::default()),
            ..Default::default()
        };
        assert!(req.forced_block().is_none());
        req.force_method = true;
        assert!(req.forced_block().is_some());
    }

    #[test]
    fn accepts_original_field_names() {
        let json = r#"{"ultimaMsg": "  estou cansado ", "userId": "u1", "forcarMetodoViva": true}"#;
        let req: AssemblyRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.input(), "estou cansado");
        assert_eq!(req.user(), Some("u1"));
        assert!(req.force_method);
    }
}
