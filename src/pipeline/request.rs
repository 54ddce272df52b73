//! Processing requests and their validation.

use serde::{Deserialize, Serialize};

use crate::core::ChunkBudget;
use crate::error::ValidationError;
use crate::transform::{Operation, TransformOptions};

/// Per-job overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOptions {
    /// Segment ceiling in characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_chunk_size: Option<usize>,
    /// Windowed overlap in characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlap_size: Option<usize>,
    /// Maximum tokens generated per segment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Sampling temperature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Model hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// A submitted job, as received on the wire.
///
/// # Examples
///
/// ```
/// use chunkstream::pipeline::ProcessRequest;
///
/// let request: ProcessRequest = serde_json::from_str(
///     r#"{"text":"Hola","operation":"translate","targetLanguage":"en","options":{"maxChunkSize":500}}"#,
/// )
/// .unwrap();
/// let job = request.validate().unwrap();
/// assert_eq!(job.budget.max_size(), 500);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRequest {
    /// Text to process.
    #[serde(default)]
    pub text: String,
    /// Operation name: `transcribe` or `translate`.
    #[serde(default)]
    pub operation: String,
    /// Target language for translation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_language: Option<String>,
    /// Per-job overrides.
    #[serde(default)]
    pub options: RequestOptions,
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    /// Operation to apply.
    pub operation: Operation,
    /// Segmentation budget.
    pub budget: ChunkBudget,
    /// Generation options for the transformer.
    pub options: TransformOptions,
}

impl ProcessRequest {
    /// Creates a request with default options.
    #[must_use]
    pub fn new(text: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            operation: operation.into(),
            ..Self::default()
        }
    }

    /// Sets the target language.
    #[must_use]
    pub fn with_target_language(mut self, language: impl Into<String>) -> Self {
        self.target_language = Some(language.into());
        self
    }

    /// Sets the per-job overrides.
    #[must_use]
    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    /// Validates the operation and budget overrides.
    ///
    /// Empty text is accepted; it becomes a single empty segment.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for an unsupported operation, a
    /// translation without target language, or an invalid budget.
    pub fn validate(&self) -> Result<ValidatedRequest, ValidationError> {
        let operation = Operation::parse(&self.operation, self.target_language.as_deref())?;
        let budget =
            ChunkBudget::from_overrides(self.options.max_chunk_size, self.options.overlap_size)?;

        let defaults = TransformOptions::default();
        let options = TransformOptions {
            max_output_tokens: self.options.max_tokens.unwrap_or(defaults.max_output_tokens),
            temperature: self.options.temperature.unwrap_or(defaults.temperature),
            model: self.options.model.clone(),
        };

        Ok(ValidatedRequest {
            operation,
            budget,
            options,
        })
    }
}
