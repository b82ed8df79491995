//! Error types for the evaluation pipeline.
//!
//! `ProviderError` lives here rather than in `alvorada-providers` so the
//! engine and scorer can classify provider failures without string matching.

use thiserror::Error;

/// Errors that surface to the caller of the evaluation pipeline.
///
/// Only template lookup (at evaluator construction) and aggregation over an
/// empty result set are allowed to escape a run; everything that goes wrong
/// for a single question is absorbed into a failed `EvaluationResult`.
#[derive(Debug, Error)]
pub enum EvalError {
    /// No prompt template with this name exists.
    #[error("prompt template not found: {name} (available: {})", .available.join(", "))]
    TemplateNotFound { name: String, available: Vec<String> },

    /// A template file exists but could not be read.
    #[error("failed to read prompt template {name}: {source}")]
    TemplateRead {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// A question could not be rendered into the template.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Accuracy was requested over an empty result set.
    #[error("cannot aggregate an empty result set")]
    EmptyResults,
}

/// Errors raised while substituting a question into a prompt template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The template never references a required placeholder.
    #[error("template is missing the `{{{0}}}` placeholder")]
    MissingPlaceholder(&'static str),

    /// The template references a placeholder nobody supplies.
    #[error("template references unknown placeholder `{{{0}}}`")]
    UnknownPlaceholder(String),

    /// A `{` or `}` without a partner at the given byte offset.
    #[error("unbalanced brace at byte {0} of template")]
    UnbalancedBrace(usize),
}

/// Reasons a single model call did not yield a usable answer.
#[derive(Debug, Error)]
pub enum ModelCallError {
    /// The provider call itself failed (auth, network, rate limit, ...).
    #[error("{0:#}")]
    Provider(anyhow::Error),

    /// The payload was not valid JSON.
    #[error("model response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The payload was JSON, but not an object.
    #[error("model response is not a JSON object")]
    NotAnObject,

    /// The object has no `chosen_answer` key.
    #[error("model response is missing `chosen_answer`")]
    MissingChosenAnswer,

    /// `chosen_answer` is present but not a string.
    #[error("`chosen_answer` must be a string, got {0}")]
    InvalidChosenAnswer(String),
}

/// Errors that can occur when interacting with an LLM provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Returns `true` for failures that will not go away on their own.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            ProviderError::AuthenticationFailed(_) | ProviderError::ModelNotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_error_messages_name_the_placeholder() {
        assert_eq!(
            FormatError::MissingPlaceholder("options").to_string(),
            "template is missing the `{options}` placeholder"
        );
        assert_eq!(
            FormatError::UnknownPlaceholder("answer".into()).to_string(),
            "template references unknown placeholder `{answer}`"
        );
    }

    #[test]
    fn template_not_found_lists_alternatives() {
        let err = EvalError::TemplateNotFound {
            name: "few_shot".into(),
            available: vec!["chain_of_thought".into(), "zero_shot".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("few_shot"));
        assert!(msg.contains("chain_of_thought, zero_shot"));
    }

    #[test]
    fn provider_failure_keeps_cause_chain() {
        let err = ModelCallError::Provider(
            anyhow::Error::new(ProviderError::Timeout(120)).context("openai completion"),
        );
        assert_eq!(err.to_string(), "openai completion: request timed out after 120s");
    }

    #[test]
    fn permanent_provider_errors() {
        assert!(ProviderError::AuthenticationFailed("bad key".into()).is_permanent());
        assert!(!ProviderError::RateLimited { retry_after_ms: 5000 }.is_permanent());
    }
}
