//! OpenAI-compatible chat completions transformer.
//!
//! Works with the OpenAI API and any endpoint speaking the same protocol
//! via a base URL override.

use std::time::Duration;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

use super::prompt::{build_prompt, system_prompt};
use super::{Operation, ProviderConfig, TransformOptions, Transformer};
use crate::error::TransformError;

const PROVIDER_NAME: &str = "openai";

/// Chat completions transformer.
pub struct OpenAiTransformer {
    client: Client<OpenAIConfig>,
    timeout: Duration,
}

impl std::fmt::Debug for OpenAiTransformer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiTransformer")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl OpenAiTransformer {
    /// Creates a transformer from provider settings.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::NotConfigured`] if no usable API key is set.
    pub fn new(config: &ProviderConfig) -> Result<Self, TransformError> {
        let api_key = config
            .usable_api_key()
            .ok_or_else(|| TransformError::NotConfigured {
                provider: PROVIDER_NAME.to_string(),
                reason: "OPENAI_API_KEY is not set".to_string(),
            })?;

        let mut openai_config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(base) = config.api_base.as_deref() {
            openai_config = openai_config.with_api_base(base);
        }

        Ok(Self {
            client: Client::with_config(openai_config),
            timeout: config.timeout,
        })
    }

    #[allow(deprecated)]
    fn build_request(
        text: &str,
        operation: &Operation,
        options: &TransformOptions,
    ) -> Result<CreateChatCompletionRequest, OpenAIError> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_prompt(operation))
                .build()?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(build_prompt(text, operation))
                .build()?
                .into(),
        ];

        CreateChatCompletionRequestArgs::default()
            .model(options.model_or_default())
            .messages(messages)
            .max_tokens(options.max_output_tokens)
            .temperature(options.temperature.clamp(0.0, 2.0))
            .build()
    }
}

#[async_trait]
impl Transformer for OpenAiTransformer {
    #[instrument(skip(self, text, options), fields(chars = text.len(), model = options.model_or_default()))]
    async fn transform(
        &self,
        text: &str,
        operation: &Operation,
        options: &TransformOptions,
    ) -> Result<String, TransformError> {
        let request = Self::build_request(text, operation, options)
            .map_err(|e| TransformError::InvalidResponse(e.to_string()))?;

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| TransformError::Timeout {
                seconds: self.timeout.as_secs(),
            })?
            .map_err(|e| TransformError::Request(e.to_string()))?;

        debug!(choices = response.choices.len(), "completion received");

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(TransformError::EmptyResponse {
                provider: PROVIDER_NAME.to_string(),
            });
        }
        Ok(content)
    }

    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Provider;

    #[test]
    fn test_new_requires_key() {
        let config = ProviderConfig::default();
        let err = OpenAiTransformer::new(&config).unwrap_err();
        assert!(matches!(err, TransformError::NotConfigured { .. }));
        assert!(err.to_string().contains("openai is not configured"));
    }

    #[test]
    fn test_new_with_key_and_base() {
        let config = ProviderConfig {
            provider: Provider::OpenAi,
            api_key: Some("sk-test".to_string()),
            api_base: Some("http://127.0.0.1:1/v1".to_string()),
            timeout: Duration::from_secs(5),
        };
        let transformer = OpenAiTransformer::new(&config).unwrap();
        assert_eq!(transformer.name(), "openai");
    }

    #[test]
    fn test_build_request() {
        let options = TransformOptions {
            model: Some("gpt-4o-mini".to_string()),
            ..TransformOptions::default()
        };
        let request = OpenAiTransformer::build_request(
            "Hola",
            &Operation::Translate {
                target_language: "en".to_string(),
            },
            &options,
        )
        .unwrap();

        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.temperature, Some(0.3));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_request_error() {
        let config = ProviderConfig {
            provider: Provider::OpenAi,
            api_key: Some("sk-test".to_string()),
            api_base: Some("http://127.0.0.1:1/v1".to_string()),
            timeout: Duration::from_secs(5),
        };
        let transformer = OpenAiTransformer::new(&config).unwrap();
        let result = transformer
            .transform("text", &Operation::Transcribe, &TransformOptions::default())
            .await;
        assert!(matches!(
            result,
            Err(TransformError::Request(_) | TransformError::Timeout { .. })
        ));
    }
}
