//! Offline demo transformer.
//!
//! Returns a tagged preview of each segment without network access.

use std::time::Duration;

use async_trait::async_trait;

use super::{Operation, TransformOptions, Transformer};
use crate::error::TransformError;
use crate::io::unicode::truncate_chars;

/// Characters of input echoed back in the preview.
const PREVIEW_CHARS: usize = 100;

/// Demo transformer.
///
/// Produces `[DEMO - LABEL] ...` previews of the first 100 characters of a
/// segment. Useful for exercising the pipeline without credentials.
///
/// # Examples
///
/// ```
/// use chunkstream::transform::{DemoTransformer, Operation, TransformOptions, Transformer};
///
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// let out = rt
///     .block_on(DemoTransformer::new().transform(
///         "Hello",
///         &Operation::Transcribe,
///         &TransformOptions::default(),
///     ))
///     .unwrap();
/// assert!(out.starts_with("[DEMO]"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DemoTransformer {
    /// Provider label shown in the tag.
    label: Option<String>,
    /// Simulated latency per call.
    latency: Duration,
}

impl DemoTransformer {
    /// Creates a demo transformer with no label and no latency.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a demo transformer standing in for a named provider.
    #[must_use]
    pub fn with_label(label: &str) -> Self {
        Self {
            label: Some(label.to_uppercase()),
            latency: Duration::ZERO,
        }
    }

    /// Sets a simulated latency per call.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn tag(&self) -> String {
        self.label
            .as_ref()
            .map_or_else(|| "[DEMO]".to_string(), |label| format!("[DEMO - {label}]"))
    }
}

#[async_trait]
impl Transformer for DemoTransformer {
    async fn transform(
        &self,
        text: &str,
        operation: &Operation,
        _options: &TransformOptions,
    ) -> Result<String, TransformError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let preview = truncate_chars(text, PREVIEW_CHARS);
        let tag = self.tag();
        Ok(match operation {
            Operation::Transcribe => format!("{tag} Transcribed and corrected text: {preview}..."),
            Operation::Translate { target_language } => {
                format!("{tag} Text translated to {target_language}: {preview}...")
            }
        })
    }

    fn name(&self) -> &'static str {
        "demo"
    }
}
