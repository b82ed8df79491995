//! Mock provider for testing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use alvorada_core::error::ProviderError;
use alvorada_core::traits::{
    CompletionRequest, CompletionResponse, LlmProvider, ModelInfo, TokenUsage,
};

const DEFAULT_RESPONSE: &str = r#"{"chosen_answer": "a"}"#;

type ErrorFactory = Box<dyn Fn() -> ProviderError + Send + Sync>;

enum Reply {
    Content(String),
    Error(ErrorFactory),
}

/// A mock LLM provider for exercising the evaluator without real API calls.
///
/// Replies are chosen by prompt substring; the first registered rule that
/// matches wins, otherwise the default response is returned.
pub struct MockProvider {
    rules: Vec<(String, Reply)>,
    default_response: String,
    latency: Option<Duration>,
    call_count: AtomicU32,
    last_request: Mutex<Option<CompletionRequest>>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::with_fixed_response(DEFAULT_RESPONSE)
    }
}

impl MockProvider {
    /// A mock that answers `{"chosen_answer": "a"}` to everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock that always returns the same content.
    pub fn with_fixed_response(response: &str) -> Self {
        Self {
            rules: Vec::new(),
            default_response: response.to_string(),
            latency: None,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Reply with `content` when the prompt contains `needle`.
    pub fn with_response(mut self, needle: &str, content: &str) -> Self {
        self.rules
            .push((needle.to_string(), Reply::Content(content.to_string())));
        self
    }

    /// Fail with the error built by `make` when the prompt contains `needle`.
    pub fn with_error(
        mut self,
        needle: &str,
        make: impl Fn() -> ProviderError + Send + Sync + 'static,
    ) -> Self {
        self.rules
            .push((needle.to_string(), Reply::Error(Box::new(make))));
        self
    }

    /// Sleep this long before every reply.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of calls made to this provider.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// The last request made to this provider.
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<CompletionResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let reply = self
            .rules
            .iter()
            .find(|(needle, _)| request.prompt.contains(needle.as_str()))
            .map(|(_, reply)| reply);

        let content = match reply {
            Some(Reply::Error(make)) => return Err(make().into()),
            Some(Reply::Content(content)) => content.clone(),
            None => self.default_response.clone(),
        };

        // Rough estimate
        let prompt_tokens = (request.prompt.len() / 4) as u32;
        let completion_tokens = (content.len() / 4) as u32;

        Ok(CompletionResponse {
            content,
            model: request.model.clone(),
            token_usage: TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            },
            latency_ms: self.latency.map_or(0, |d| d.as_millis() as u64),
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![ModelInfo {
            id: "mock-model".into(),
            name: "Mock Model".into(),
            provider: "mock".into(),
            max_context: 100_000,
            json_mode: true,
        }]
    }
}
