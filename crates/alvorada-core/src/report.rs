//! Run summary types with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EvalError;
use crate::model::EvaluationResult;
use crate::statistics::{compute_aggregate_stats, SubjectStat};

/// Terminal output of an evaluation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub metadata: RunMetadata,
    /// Results in question order.
    pub results: Vec<EvaluationResult>,
    pub accuracy_by_subject: IndexMap<String, SubjectStat>,
}

/// Descriptive fields for a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    pub run_id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// Model identifier as given by the user (e.g. "openai/gpt-5").
    pub model: String,
    pub prompt_template: String,
    pub total_questions: usize,
    pub correct: usize,
    pub failed: usize,
    pub accuracy: f64,
    /// Upstream filter criteria, opaque to the pipeline.
    pub filters: Option<serde_json::Value>,
    pub duration_ms: u64,
}

/// What the caller knows about a run besides its results.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub model: String,
    pub prompt_template: String,
    pub filters: Option<serde_json::Value>,
    pub duration_ms: u64,
}

impl RunSummary {
    /// Aggregate `results` and attach run metadata.
    ///
    /// Fails with [`EvalError::EmptyResults`] for an empty batch.
    pub fn assemble(results: Vec<EvaluationResult>, context: RunContext) -> Result<Self, EvalError> {
        let stats = compute_aggregate_stats(&results)?;
        Ok(Self {
            metadata: RunMetadata {
                run_id: context.run_id,
                timestamp: context.started_at,
                model: context.model,
                prompt_template: context.prompt_template,
                total_questions: stats.total,
                correct: stats.correct,
                failed: stats.failed,
                accuracy: stats.accuracy,
                filters: context.filters,
                duration_ms: context.duration_ms,
            },
            results,
            accuracy_by_subject: stats.by_subject,
        })
    }

    /// Save the summary as pretty-printed JSON.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize run summary")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write results to {}", path.display()))?;
        Ok(())
    }

    /// Load a summary from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read results from {}", path.display()))?;
        let summary: RunSummary =
            serde_json::from_str(&content).context("failed to parse results JSON")?;
        Ok(summary)
    }
}

/// `<YYYYmmdd_HHMMSS>_<model>_<template>.json`, with `/` and `:` in the
/// model identifier replaced by `_`.
pub fn default_file_name(timestamp: DateTime<Utc>, model: &str, prompt_template: &str) -> String {
    let model = model.replace(['/', ':'], "_");
    format!(
        "{}_{model}_{prompt_template}.json",
        timestamp.format("%Y%m%d_%H%M%S")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FailedQuestion, ScoredAnswer};
    use chrono::TimeZone;

    fn context() -> RunContext {
        RunContext {
            run_id: Uuid::nil(),
            started_at: Utc.with_ymd_and_hms(2025, 3, 9, 14, 5, 7).unwrap(),
            model: "openai/gpt-5".into(),
            prompt_template: "zero_shot".into(),
            filters: Some(serde_json::json!({"subjects": ["Matemática"]})),
            duration_ms: 1200,
        }
    }

    fn results() -> Vec<EvaluationResult> {
        let mut extra = serde_json::Map::new();
        extra.insert("explanation".into(), "Soma simples: 2 + 2 = 4.".into());
        vec![
            EvaluationResult::Success(ScoredAnswer {
                question_id: "q1".into(),
                subject: "Matemática".into(),
                exam_name: "ENEM".into(),
                chosen_answer: "b".into(),
                correct: true,
                extra,
            }),
            EvaluationResult::Failure(FailedQuestion {
                question_id: "q2".into(),
                error: "authentication failed: invalid key".into(),
            }),
        ]
    }

    #[test]
    fn assemble_fills_metadata() {
        let summary = RunSummary::assemble(results(), context()).unwrap();
        assert_eq!(summary.metadata.total_questions, 2);
        assert_eq!(summary.metadata.correct, 1);
        assert_eq!(summary.metadata.failed, 1);
        assert_eq!(summary.metadata.accuracy, 0.5);
        assert_eq!(summary.accuracy_by_subject.len(), 2);
        assert_eq!(summary.results[1].question_id(), "q2");
    }

    #[test]
    fn assemble_rejects_empty_batch() {
        assert!(matches!(
            RunSummary::assemble(vec![], context()),
            Err(EvalError::EmptyResults)
        ));
    }

    #[test]
    fn json_roundtrip_preserves_non_ascii() {
        let summary = RunSummary::assemble(results(), context()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("run.json");

        summary.save_json(&path).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("Matemática"));
        assert!(raw.contains("\"accuracy_by_subject\""));

        let loaded = RunSummary::load_json(&path).unwrap();
        assert_eq!(loaded.results, summary.results);
        assert_eq!(loaded.metadata.model, "openai/gpt-5");
        assert_eq!(
            loaded.accuracy_by_subject.keys().collect::<Vec<_>>(),
            vec!["Matemática", "Unknown"]
        );
    }

    #[test]
    fn file_name_sanitizes_model() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            default_file_name(ts, "ollama/llama3:8b", "chain_of_thought"),
            "20250309_140507_ollama_llama3_8b_chain_of_thought.json"
        );
    }
}
