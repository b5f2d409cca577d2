//! Token budget enforcement and the built-in tokenizers.

use async_trait::async_trait;
use eco_config::BudgetConfig;
use eco_core::{Tokenizer, TokenizerError};

/// Prompt ceiling. Prompts above `max_tokens` are cut to
/// `max_tokens - margin` tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenBudget {
    pub max_tokens: usize,
    pub margin: usize,
}

impl Default for TokenBudget {
    fn default() -> Self {
        Self::from_config(&BudgetConfig::default())
    }
}

impl TokenBudget {
    pub fn from_config(config: &BudgetConfig) -> Self {
        Self {
            max_tokens: config.max_prompt_tokens,
            margin: config.truncation_margin,
        }
    }

    /// Tokens kept when truncating.
    pub fn keep(&self) -> usize {
        self.max_tokens.saturating_sub(self.margin)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BudgetOutcome {
    pub text: String,
    /// Token count before truncation; `None` if the tokenizer failed
    pub token_count: Option<usize>,
    pub truncated: bool,
}

/// Tokenize and, when over the ceiling, keep the first `budget.keep()`
/// tokens. Tokenizer failures return the text untouched.
pub async fn enforce(tokenizer: &dyn Tokenizer, text: String, budget: &TokenBudget) -> BudgetOutcome {
    let tokens = match tokenizer.encode(&text).await {
        Ok(tokens) => tokens,
        Err(e) => {
            tracing::warn!(tokenizer = tokenizer.name(), error = %e, "Token counting failed, prompt left untruncated");
            return BudgetOutcome {
                text,
                token_count: None,
                truncated: false,
            };
        }
    };

    let count = tokens.len();
    tracing::info!(tokens = count, "Estimated prompt tokens");
    if count <= budget.max_tokens {
        return BudgetOutcome {
            text,
            token_count: Some(count),
            truncated: false,
        };
    }

    tracing::warn!(tokens = count, max = budget.max_tokens, "Prompt over token ceiling, truncating");
    match tokenizer.decode(&tokens[..budget.keep()]).await {
        Ok(cut) => BudgetOutcome {
            text: cut,
            token_count: Some(count),
            truncated: true,
        },
        Err(e) => {
            tracing::warn!(tokenizer = tokenizer.name(), error = %e, "Token decoding failed, prompt left untruncated");
            BudgetOutcome {
                text,
                token_count: Some(count),
                truncated: false,
            }
        }
    }
}

// ── Byte-chunk tokenizer ─────────────────────────────────────────────────

const BYTES_PER_TOKEN: usize = 3;

/// Lossless tokenizer packing up to three UTF-8 bytes into each id.
///
/// The high byte of an id holds the chunk length (1–3), the low 24 bits the
/// bytes. Roughly one token per three bytes, close enough to BPE counts on
/// Latin text for budgeting. Decoding a prefix that ends mid-character drops
/// the incomplete character.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicTokenizer;

impl HeuristicTokenizer {
    pub fn encode_text(text: &str) -> Vec<u32> {
        text.as_bytes()
            .chunks(BYTES_PER_TOKEN)
            .map(|chunk| {
                let mut id = (chunk.len() as u32) << 24;
                for (i, b) in chunk.iter().enumerate() {
                    id |= u32::from(*b) << (16 - 8 * i);
                }
                id
            })
            .collect()
    }

    pub fn decode_ids(ids: &[u32]) -> Result<String, TokenizerError> {
        let mut bytes = Vec::with_capacity(ids.len() * BYTES_PER_TOKEN);
        for id in ids {
            let len = (id >> 24) as usize;
            if len == 0 || len > BYTES_PER_TOKEN {
                return Err(TokenizerError::Decode(format!("invalid token id {id:#x}")));
            }
            for i in 0..len {
                bytes.push((id >> (16 - 8 * i)) as u8);
            }
        }

        match String::from_utf8(bytes) {
            Ok(text) => Ok(text),
            Err(e) if e.utf8_error().error_len().is_none() => {
                let valid = e.utf8_error().valid_up_to();
                let mut bytes = e.into_bytes();
                bytes.truncate(valid);
                String::from_utf8(bytes).map_err(|e| TokenizerError::Decode(e.to_string()))
            }
            Err(e) => Err(TokenizerError::Decode(e.to_string())),
        }
    }
}

#[async_trait]
impl Tokenizer for HeuristicTokenizer {
    fn name(&self) -> &str {
        "byte_chunk"
    }

    async fn encode(&self, text: &str) -> Result<Vec<u32>, TokenizerError> {
        Ok(Self::encode_text(text))
    }

    async fn decode(&self, tokens: &[u32]) -> Result<String, TokenizerError> {
        Self::decode_ids(tokens)
    }
}

// ── HuggingFace tokenizer ────────────────────────────────────────────────

/// A `tokenizer.json` loaded with the HuggingFace `tokenizers` crate.
#[cfg(feature = "hf-tokenizer")]
pub struct HfTokenizer {
    inner: tokenizers::Tokenizer,
}

#[cfg(feature = "hf-tokenizer")]
impl HfTokenizer {
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, TokenizerError> {
        let inner = tokenizers::Tokenizer::from_file(path.as_ref())
            .map_err(|e| TokenizerError::Unavailable(format!("Failed to load tokenizer: {e}")))?;
        Ok(Self { inner })
    }
}

#[cfg(feature = "hf-tokenizer")]
#[async_trait]
impl Tokenizer for HfTokenizer {
    fn name(&self) -> &str {
        "huggingface"
    }

    async fn encode(&self, text: &str) -> Result<Vec<u32>, TokenizerError> {
        let encoding = self
            .inner
            .encode(text, false)
            .map_err(|e| TokenizerError::Encode(e.to_string()))?;
        Ok(encoding.get_ids().to_vec())
    }

    async fn decode(&self, tokens: &[u32]) -> Result<String, TokenizerError> {
        self.inner
            .decode(tokens, false)
            .map_err(|e| TokenizerError::Decode(e.to_string()))
    }
}
