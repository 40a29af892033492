//! OpenAI chat-completion translator.

use super::{TokenBudget, TranslatedText, Translator, TruncationNotice};
use crate::config::{Prompts, Settings, TranslationSettings};
use crate::error::{GatewayError, Result};
use crate::openai::{api_key_from_env, create_client_with_timeout};
use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Translator backed by the OpenAI chat-completion API.
pub struct OpenAITranslator {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    target_language: String,
    prompts: Prompts,
    budget: TokenBudget,
    has_api_key: bool,
}

impl OpenAITranslator {
    /// Create a translator from explicit settings and credentials.
    pub fn new(
        settings: &TranslationSettings,
        prompts: Prompts,
        api_key: Option<String>,
    ) -> Result<Self> {
        let client = create_client_with_timeout(
            api_key.as_deref(),
            settings.api_base.as_deref(),
            Duration::from_secs(settings.timeout_seconds),
        )?;
        let budget = TokenBudget::new(&settings.encoding, settings.max_input_tokens)?;

        Ok(Self {
            client,
            model: settings.model.clone(),
            target_language: settings.target_language.clone(),
            prompts,
            budget,
            has_api_key: api_key.is_some(),
        })
    }

    /// Create a translator from application settings and `OPENAI_API_KEY`.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;
        Self::new(&settings.translation, prompts, api_key_from_env())
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(
        &self,
        text: &str,
    ) -> std::result::Result<async_openai::types::CreateChatCompletionRequest, GatewayError> {
        let (system, user) = self.prompts.translation_messages(&self.target_language, text);

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()
                .map_err(|e| GatewayError::InvalidRequest(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user)
                .build()
                .map_err(|e| GatewayError::InvalidRequest(e.to_string()))?
                .into(),
        ];

        CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .build()
            .map_err(|e| GatewayError::InvalidRequest(e.to_string()))
    }
}

#[async_trait]
impl Translator for OpenAITranslator {
    #[instrument(skip(self, text), fields(chars = text.chars().count()))]
    async fn translate(&self, text: &str) -> std::result::Result<TranslatedText, GatewayError> {
        if !self.has_api_key {
            return Err(GatewayError::Auth(
                "OPENAI_API_KEY is not set (environment or .env file)".to_string(),
            ));
        }

        let budgeted = self
            .budget
            .apply(text)
            .map_err(|e| GatewayError::InvalidRequest(e.to_string()))?;

        let truncation = if budgeted.was_truncated() {
            info!(
                original_tokens = budgeted.original_tokens,
                kept_tokens = budgeted.kept_tokens,
                "Input exceeded the token budget and was truncated"
            );
            Some(TruncationNotice {
                original_tokens: budgeted.original_tokens,
                kept_tokens: budgeted.kept_tokens,
            })
        } else {
            None
        };

        let request = self.build_request(&budgeted.text)?;
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(classify_openai_error)?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .ok_or_else(|| {
                GatewayError::MalformedResponse("response contained no message content".to_string())
            })?;

        debug!("Received {} characters of translation", content.chars().count());

        Ok(TranslatedText {
            text: content.trim().to_string(),
            truncation,
        })
    }
}

/// Map a client error onto the gateway failure classes.
fn classify_openai_error(err: OpenAIError) -> GatewayError {
    match err {
        OpenAIError::Reqwest(e) => GatewayError::Network(e.to_string()),
        OpenAIError::ApiError(api) => {
            classify_api_error(api.r#type.as_deref(), api.code.as_deref(), &api.message)
        }
        OpenAIError::JSONDeserialize(e) => GatewayError::MalformedResponse(e.to_string()),
        OpenAIError::InvalidArgument(msg) => GatewayError::InvalidRequest(msg),
        other => GatewayError::Api(other.to_string()),
    }
}

/// Classify a service-side API error by its type, code and message.
pub fn classify_api_error(kind: Option<&str>, code: Option<&str>, message: &str) -> GatewayError {
    const AUTH: &[&str] = &[
        "invalid_api_key",
        "invalid_organization",
        "authentication_error",
        "permission_denied",
    ];
    const QUOTA: &[&str] = &[
        "insufficient_quota",
        "rate_limit_exceeded",
        "rate_limit_error",
        "billing_hard_limit_reached",
    ];

    let matches = |set: &[&str]| {
        kind.is_some_and(|k| set.contains(&k)) || code.is_some_and(|c| set.contains(&c))
    };

    if matches(AUTH) || message.contains("Incorrect API key") {
        GatewayError::Auth(message.to_string())
    } else if matches(QUOTA) {
        GatewayError::Quota(message.to_string())
    } else {
        GatewayError::Api(message.to_string())
    }
}
