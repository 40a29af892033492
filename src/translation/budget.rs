//! Input token budget.

use crate::error::{Result, SubtransError};
use tiktoken_rs::CoreBPE;
use tracing::debug;

/// Number of trailing tokens dropped at most when a cut lands inside a
/// multi-byte character.
const MAX_DECODE_BACKOFF: usize = 4;

/// Text after applying the budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Truncated {
    pub text: String,
    pub original_tokens: usize,
    pub kept_tokens: usize,
}

impl Truncated {
    pub fn was_truncated(&self) -> bool {
        self.kept_tokens < self.original_tokens
    }
}

/// Caps the number of tokens sent to the model.
pub struct TokenBudget {
    bpe: CoreBPE,
    max_tokens: usize,
}

impl TokenBudget {
    /// Build a budget for a named tokenizer encoding.
    pub fn new(encoding: &str, max_tokens: usize) -> Result<Self> {
        let bpe = match encoding {
            "cl100k_base" => tiktoken_rs::cl100k_base(),
            "o200k_base" => tiktoken_rs::o200k_base(),
            "p50k_base" => tiktoken_rs::p50k_base(),
            "r50k_base" => tiktoken_rs::r50k_base(),
            other => {
                return Err(SubtransError::Tokenizer(format!(
                    "Unknown encoding: {}",
                    other
                )))
            }
        }
        .map_err(|e| SubtransError::Tokenizer(e.to_string()))?;

        Ok(Self { bpe, max_tokens })
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    /// Count the tokens in a string.
    pub fn count(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }

    /// Truncate text to at most `max_tokens` tokens.
    ///
    /// Text within the budget is returned unchanged.
    pub fn apply(&self, text: &str) -> Result<Truncated> {
        let tokens = self.bpe.encode_with_special_tokens(text);
        let original_tokens = tokens.len();

        if original_tokens <= self.max_tokens {
            return Ok(Truncated {
                text: text.to_string(),
                original_tokens,
                kept_tokens: original_tokens,
            });
        }

        let mut keep = self.max_tokens;
        loop {
            match self.bpe.decode(tokens[..keep].to_vec()) {
                Ok(decoded) => {
                    debug!("Truncated input from {} to {} tokens", original_tokens, keep);
                    return Ok(Truncated {
                        text: decoded,
                        original_tokens,
                        kept_tokens: keep,
                    });
                }
                Err(e) if keep == 0 || self.max_tokens - keep >= MAX_DECODE_BACKOFF => {
                    return Err(SubtransError::Tokenizer(format!(
                        "Failed to decode truncated input: {}",
                        e
                    )));
                }
                Err(_) => keep -= 1,
            }
        }
    }
}
