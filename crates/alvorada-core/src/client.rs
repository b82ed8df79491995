//! Model client adapter.
//!
//! Binds a provider to one model identifier and turns a formatted prompt into
//! the raw text the model returned. One request per call, JSON object mode,
//! no retries.

use std::fmt;
use std::sync::Arc;

use tracing::instrument;

use crate::traits::{CompletionRequest, LlmProvider, ResponseFormat};

/// Which model to evaluate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    /// Provider name (e.g. "openai").
    pub provider: String,
    /// Model identifier (e.g. "gpt-5").
    pub model: String,
}

impl ModelSpec {
    /// Parse `provider/model`; a bare model name uses `default_provider`.
    ///
    /// Only the first `/` separates the provider, so Ollama tags such as
    /// `ollama/library/llama3:8b` keep their slashes.
    pub fn parse(s: &str, default_provider: &str) -> Self {
        match s.trim().split_once('/') {
            Some((provider, model)) if !provider.is_empty() && !model.is_empty() => Self {
                provider: provider.to_string(),
                model: model.to_string(),
            },
            _ => Self {
                provider: default_provider.to_string(),
                model: s.trim().to_string(),
            },
        }
    }
}

impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider, self.model)
    }
}

/// Generation settings applied to every request.
#[derive(Debug, Clone, Default)]
pub struct GenerationSettings {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
}

/// A provider bound to a single model.
#[derive(Clone)]
pub struct ModelClient {
    provider: Arc<dyn LlmProvider>,
    spec: ModelSpec,
    settings: GenerationSettings,
}

impl ModelClient {
    pub fn new(provider: Arc<dyn LlmProvider>, spec: ModelSpec, settings: GenerationSettings) -> Self {
        Self {
            provider,
            spec,
            settings,
        }
    }

    pub fn spec(&self) -> &ModelSpec {
        &self.spec
    }

    /// Send `prompt` and return the raw response content.
    #[instrument(skip(self, prompt), fields(model = %self.spec))]
    pub async fn invoke(&self, prompt: &str) -> anyhow::Result<String> {
        let request = CompletionRequest {
            model: self.spec.model.clone(),
            prompt: prompt.to_string(),
            response_format: ResponseFormat::JsonObject,
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        let response = self.provider.complete(&request).await?;
        tracing::debug!(
            latency_ms = response.latency_ms,
            total_tokens = response.token_usage.total_tokens,
            "completion received"
        );
        Ok(response.content)
    }
}

impl fmt::Debug for ModelClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelClient")
            .field("provider", &self.provider.name())
            .field("spec", &self.spec)
            .field("settings", &self.settings)
            .finish()
    }
}
