//! Batch runner.
//!
//! Drives formatter → model client → scorer over an ordered question set.
//! A question that fails never aborts the batch; it becomes a failed result
//! in its slot. Questions run one at a time unless a concurrency limit above
//! one is configured, in which case results are put back in input order.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::client::{GenerationSettings, ModelClient, ModelSpec};
use crate::error::{EvalError, ProviderError};
use crate::formatter::format_question;
use crate::model::{EvaluationResult, QuestionRecord};
use crate::report::{RunContext, RunSummary};
use crate::scorer;
use crate::template::{PromptTemplate, TemplateStore};
use crate::traits::LlmProvider;

/// Configuration for the evaluator.
#[derive(Debug, Clone)]
pub struct EvalEngineConfig {
    /// Maximum model calls in flight. 1 means strictly sequential.
    pub concurrency: usize,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
}

impl Default for EvalEngineConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            max_tokens: None,
            temperature: None,
        }
    }
}

/// Progress reporting trait. Purely observational.
pub trait ProgressReporter: Send + Sync {
    /// `index` is zero-based.
    fn on_question_start(&self, index: usize, total: usize, question_id: &str);
    fn on_question_complete(&self, index: usize, total: usize, result: &EvaluationResult);
    fn on_batch_complete(&self, total: usize, correct: usize, failed: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_question_start(&self, _: usize, _: usize, _: &str) {}
    fn on_question_complete(&self, _: usize, _: usize, _: &EvaluationResult) {}
    fn on_batch_complete(&self, _: usize, _: usize, _: usize, _: Duration) {}
}

/// Evaluates questions against one model with one prompt template.
#[derive(Debug, Clone)]
pub struct Evaluator {
    client: ModelClient,
    template: PromptTemplate,
    config: EvalEngineConfig,
}

impl Evaluator {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        model: ModelSpec,
        template: PromptTemplate,
        config: EvalEngineConfig,
    ) -> Self {
        let settings = GenerationSettings {
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        };
        Self {
            client: ModelClient::new(provider, model, settings),
            template,
            config,
        }
    }

    /// Build an evaluator, resolving `template_name` through `store`.
    ///
    /// This is the only place a missing template is reported.
    pub fn from_store(
        provider: Arc<dyn LlmProvider>,
        model: ModelSpec,
        store: &TemplateStore,
        template_name: &str,
        config: EvalEngineConfig,
    ) -> Result<Self, EvalError> {
        let template = store.load(template_name)?;
        Ok(Self::new(provider, model, template, config))
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    pub fn model(&self) -> &ModelSpec {
        self.client.spec()
    }

    /// Evaluate a single question. Never fails.
    pub async fn evaluate_question(&self, question: &QuestionRecord) -> EvaluationResult {
        let prompt = match format_question(question, &self.template) {
            Ok(prompt) => prompt,
            Err(e) => {
                tracing::warn!(question_id = %question.question_id, "format failed: {e}");
                return scorer::failure(question, &e);
            }
        };

        let outcome = self.client.invoke(&prompt).await;
        if let Err(e) = &outcome {
            match e.downcast_ref::<ProviderError>() {
                Some(provider_error) if provider_error.is_permanent() => {
                    tracing::error!(question_id = %question.question_id, "model call failed: {e:#}")
                }
                _ => tracing::warn!(question_id = %question.question_id, "model call failed: {e:#}"),
            }
        }

        let result = scorer::score(question, outcome);
        if let Some(error) = result.error() {
            tracing::debug!(question_id = %question.question_id, "question failed: {error}");
        }
        result
    }

    /// Evaluate `questions`, returning one result per question in input order.
    pub async fn evaluate_batch(
        &self,
        questions: &[QuestionRecord],
        progress: &dyn ProgressReporter,
    ) -> Vec<EvaluationResult> {
        let start = Instant::now();
        let total = questions.len();

        let results = if self.config.concurrency <= 1 {
            let mut results = Vec::with_capacity(total);
            for (index, question) in questions.iter().enumerate() {
                progress.on_question_start(index, total, &question.question_id);
                let result = self.evaluate_question(question).await;
                progress.on_question_complete(index, total, &result);
                results.push(result);
            }
            results
        } else {
            self.evaluate_bounded(questions, progress).await
        };

        let correct = results.iter().filter(|r| r.is_correct()).count();
        let failed = results.iter().filter(|r| r.is_failure()).count();
        progress.on_batch_complete(total, correct, failed, start.elapsed());

        results
    }

    async fn evaluate_bounded(
        &self,
        questions: &[QuestionRecord],
        progress: &dyn ProgressReporter,
    ) -> Vec<EvaluationResult> {
        let total = questions.len();
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));
        let mut futures = FuturesUnordered::new();

        for (index, question) in questions.iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            futures.push(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => {
                        progress.on_question_start(index, total, &question.question_id);
                        self.evaluate_question(question).await
                    }
                    Err(e) => scorer::failure(question, &e),
                };
                (index, result)
            });
        }

        let mut slots: Vec<Option<EvaluationResult>> = vec![None; total];
        while let Some((index, result)) = futures.next().await {
            progress.on_question_complete(index, total, &result);
            slots[index] = Some(result);
        }

        slots.into_iter().flatten().collect()
    }

    /// Evaluate `questions` and aggregate them into a run summary.
    ///
    /// `filters` is recorded verbatim in the summary metadata. An empty
    /// question set is rejected with [`EvalError::EmptyResults`] before any
    /// model call is made.
    pub async fn run(
        &self,
        questions: &[QuestionRecord],
        filters: Option<serde_json::Value>,
        progress: &dyn ProgressReporter,
    ) -> Result<RunSummary, EvalError> {
        if questions.is_empty() {
            return Err(EvalError::EmptyResults);
        }

        let run_id = Uuid::new_v4();
        let started_at = chrono::Utc::now();
        let start = Instant::now();
        tracing::info!(
            %run_id,
            model = %self.client.spec(),
            template = self.template.name(),
            questions = questions.len(),
            "starting evaluation run"
        );

        let results = self.evaluate_batch(questions, progress).await;

        RunSummary::assemble(
            results,
            RunContext {
                run_id,
                started_at,
                model: self.client.spec().to_string(),
                prompt_template: self.template.name().to_string(),
                filters,
                duration_ms: start.elapsed().as_millis() as u64,
            },
        )
    }
}
