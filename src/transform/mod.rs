//! Text transformation capability.
//!
//! A transformer turns one bounded segment into its transcribed
//! (corrected) or translated form. Backends are pluggable:
//!
//! # Feature Flags
//!
//! - `openai`: Enables the OpenAI-compatible chat completions backend
//! - Without the feature: only the demo backend is available
//!
//! The demo backend is also used whenever the selected provider is not
//! configured, so the pipeline can always run end to end.

mod demo;
#[cfg(feature = "openai")]
mod openai;
pub mod prompt;

pub use demo::DemoTransformer;
#[cfg(feature = "openai")]
pub use openai::OpenAiTransformer;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{TransformError, ValidationError};

/// Default model requested from the provider.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Default cap on generated tokens per segment.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 4000;

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Default provider request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// API keys that mean "not configured".
const PLACEHOLDER_KEYS: &[&str] = &["demo-key"];

/// The requested transformation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Operation {
    /// Correct spelling, punctuation, and formatting.
    Transcribe,
    /// Translate into the target language.
    Translate {
        /// Language code or name, e.g. `es`.
        #[serde(rename = "targetLanguage")]
        target_language: String,
    },
}

impl Operation {
    /// Builds an operation from its wire name and optional target language.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnsupportedOperation`] for unknown names and
    /// [`ValidationError::MissingTargetLanguage`] when translating without a
    /// non-blank target language.
    ///
    /// # Examples
    ///
    /// ```
    /// use chunkstream::transform::Operation;
    ///
    /// let op = Operation::parse("translate", Some("fr")).unwrap();
    /// assert_eq!(op.target_language(), Some("fr"));
    /// assert!(Operation::parse("translate", None).is_err());
    /// assert!(Operation::parse("summarize", None).is_err());
    /// ```
    pub fn parse(name: &str, target_language: Option<&str>) -> Result<Self, ValidationError> {
        match name.trim() {
            "transcribe" => Ok(Self::Transcribe),
            "translate" => match target_language.map(str::trim) {
                Some(lang) if !lang.is_empty() => Ok(Self::Translate {
                    target_language: lang.to_string(),
                }),
                _ => Err(ValidationError::MissingTargetLanguage),
            },
            other => Err(ValidationError::UnsupportedOperation {
                operation: other.to_string(),
            }),
        }
    }

    /// Returns the wire name of the operation.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Transcribe => "transcribe",
            Self::Translate { .. } => "translate",
        }
    }

    /// Returns the target language for translations.
    #[must_use]
    pub fn target_language(&self) -> Option<&str> {
        match self {
            Self::Transcribe => None,
            Self::Translate { target_language } => Some(target_language),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transcribe => f.write_str("transcribe"),
            Self::Translate { target_language } => write!(f, "translate ({target_language})"),
        }
    }
}

/// Per-request generation options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformOptions {
    /// Maximum tokens to generate.
    pub max_output_tokens: u32,
    /// Sampling temperature (0.0 - 2.0).
    pub temperature: f32,
    /// Model hint; the backend default is used when absent.
    pub model: Option<String>,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            model: None,
        }
    }
}

impl TransformOptions {
    /// Returns the model to request, falling back to [`DEFAULT_MODEL`].
    #[must_use]
    pub fn model_or_default(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }
}

/// Converts one segment according to an operation.
///
/// Implementations must be thread-safe (`Send + Sync`). Timeouts are the
/// transformer's own responsibility.
#[async_trait]
pub trait Transformer: Send + Sync {
    /// Transforms a single segment.
    ///
    /// # Errors
    ///
    /// Returns a [`TransformError`] on misconfiguration, request failure,
    /// timeout, or an empty or unusable response.
    async fn transform(
        &self,
        text: &str,
        operation: &Operation,
        options: &TransformOptions,
    ) -> Result<String, TransformError>;

    /// Returns the backend name.
    fn name(&self) -> &'static str;
}

/// Available transformer backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// OpenAI-compatible chat completions.
    #[default]
    OpenAi,
    /// Offline preview backend.
    Demo,
}

impl Provider {
    /// Returns the provider name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Demo => "demo",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "demo" => Ok(Self::Demo),
            _ => Err(format!("unknown provider: {s} (expected openai or demo)")),
        }
    }
}

/// Backend selection and connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Selected backend.
    pub provider: Provider,
    /// API key for the backend.
    pub api_key: Option<String>,
    /// Base URL override for OpenAI-compatible endpoints.
    pub api_base: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            api_key: None,
            api_base: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ProviderConfig {
    /// Returns the API key if it is present and not a placeholder.
    #[must_use]
    pub fn usable_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && !PLACEHOLDER_KEYS.contains(key))
    }

    /// Returns true if the selected provider can make real requests.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        match self.provider {
            Provider::OpenAi => cfg!(feature = "openai") && self.usable_api_key().is_some(),
            Provider::Demo => true,
        }
    }
}

/// Creates the transformer for a provider configuration.
///
/// - `demo`: Returns [`DemoTransformer`]
/// - `openai` with a usable key: Returns `OpenAiTransformer`
/// - `openai` without a key: Logs a warning and returns [`DemoTransformer`]
#[cfg(feature = "openai")]
#[must_use]
pub fn create_transformer(config: &ProviderConfig) -> Arc<dyn Transformer> {
    match config.provider {
        Provider::Demo => Arc::new(DemoTransformer::new()),
        Provider::OpenAi => match OpenAiTransformer::new(config) {
            Ok(transformer) => Arc::new(transformer),
            Err(e) => {
                warn!(error = %e, "falling back to demo transformer");
                Arc::new(DemoTransformer::with_label(config.provider.as_str()))
            }
        },
    }
}

/// Creates the transformer for a provider configuration.
///
/// Without the `openai` feature every provider resolves to [`DemoTransformer`].
#[cfg(not(feature = "openai"))]
#[must_use]
pub fn create_transformer(config: &ProviderConfig) -> Arc<dyn Transformer> {
    if config.provider != Provider::Demo {
        warn!(
            provider = %config.provider,
            "built without provider support, falling back to demo transformer"
        );
        return Arc::new(DemoTransformer::with_label(config.provider.as_str()));
    }
    Arc::new(DemoTransformer::new())
}
