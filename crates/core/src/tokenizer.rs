//! Tokenizer trait used by the token budget enforcer.

use async_trait::async_trait;

use crate::error::TokenizerError;

/// Encodes text to token ids and back.
#[async_trait]
pub trait Tokenizer: Send + Sync {
    fn name(&self) -> &str;

    async fn encode(&self, text: &str) -> Result<Vec<u32>, TokenizerError>;

    async fn decode(&self, tokens: &[u32]) -> Result<String, TokenizerError>;
}
