//! Translator gateway.
//!
//! Wraps the chat-completion service behind a trait so the pipeline can be
//! driven by a scripted translator in tests.

mod budget;
mod openai;

pub use budget::{TokenBudget, Truncated};
pub use openai::{classify_api_error, OpenAITranslator};

use crate::error::GatewayError;
use async_trait::async_trait;
use serde::Serialize;

/// Input was cut to fit the token budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TruncationNotice {
    /// Tokens in the original input.
    pub original_tokens: usize,
    /// Tokens actually sent.
    pub kept_tokens: usize,
}

/// A translation returned by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedText {
    /// Translated text, trimmed of surrounding whitespace.
    pub text: String,
    /// Present when the input was truncated before sending.
    pub truncation: Option<TruncationNotice>,
}

impl TranslatedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            truncation: None,
        }
    }
}

/// Trait for translator implementations.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate one chunk of text.
    async fn translate(&self, text: &str) -> std::result::Result<TranslatedText, GatewayError>;
}
