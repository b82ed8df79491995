//! Core trait definitions for LLM providers.
//!
//! The async `LlmProvider` trait is implemented by the `alvorada-providers`
//! crate; the engine only ever talks to `dyn LlmProvider`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Trait for LLM backends that answer a single completion request.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g. "openai").
    fn name(&self) -> &str;

    /// Issue one completion request. Implementations never retry.
    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<CompletionResponse>;

    /// List known models for this provider.
    fn available_models(&self) -> Vec<ModelInfo>;
}

/// Shape the provider is asked to constrain its output to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// A single JSON object.
    #[default]
    JsonObject,
    /// Free text.
    Text,
}

/// One completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Model identifier as the provider knows it (e.g. "gpt-5").
    pub model: String,
    /// The fully rendered prompt, sent as a single user message.
    pub prompt: String,
    #[serde(default)]
    pub response_format: ResponseFormat,
    /// Maximum tokens to generate; provider default when unset.
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Sampling temperature; provider default when unset.
    #[serde(default)]
    pub temperature: Option<f64>,
}

/// Response from a completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// The raw message content.
    pub content: String,
    /// Model that actually produced the response.
    pub model: String,
    pub token_usage: TokenUsage,
    pub latency_ms: u64,
}

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Information about an available model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model identifier.
    pub id: String,
    /// Human-readable model name.
    pub name: String,
    /// Provider name.
    pub provider: String,
    /// Maximum context window size in tokens.
    pub max_context: u32,
    /// Whether the provider can force a JSON object response for this model.
    pub json_mode: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_format_wire_name() {
        assert_eq!(
            serde_json::to_string(&ResponseFormat::JsonObject).unwrap(),
            "\"json_object\""
        );
        assert_eq!(ResponseFormat::default(), ResponseFormat::JsonObject);
    }

    #[test]
    fn request_defaults_to_json_object() {
        let request: CompletionRequest =
            serde_json::from_str(r#"{"model": "gpt-5", "prompt": "hi"}"#).unwrap();
        assert_eq!(request.response_format, ResponseFormat::JsonObject);
        assert_eq!(request.max_tokens, None);
    }
}
