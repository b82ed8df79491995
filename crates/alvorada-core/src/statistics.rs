//! Accuracy aggregation.
//!
//! Pure functions of the result list: aggregating the same results twice
//! yields identical statistics.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::EvalError;
use crate::model::EvaluationResult;

/// Bucket for results without a subject (failed questions).
pub const UNKNOWN_SUBJECT: &str = "Unknown";

/// Accuracy for a single subject.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubjectStat {
    pub accuracy: f64,
    pub correct: usize,
    pub total: usize,
}

/// Aggregate statistics over one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub total: usize,
    pub correct: usize,
    pub failed: usize,
    pub accuracy: f64,
    /// Per-subject breakdown in first-occurrence order.
    pub by_subject: IndexMap<String, SubjectStat>,
}

/// Fraction of `results` that are correct.
pub fn overall_accuracy(results: &[EvaluationResult]) -> Result<f64, EvalError> {
    if results.is_empty() {
        return Err(EvalError::EmptyResults);
    }
    let correct = results.iter().filter(|r| r.is_correct()).count();
    Ok(correct as f64 / results.len() as f64)
}

/// Group `results` by subject in a single pass.
pub fn accuracy_by_subject(results: &[EvaluationResult]) -> IndexMap<String, SubjectStat> {
    let mut counts: IndexMap<&str, (usize, usize)> = IndexMap::new();
    for r in results {
        let entry = counts.entry(r.subject().unwrap_or(UNKNOWN_SUBJECT)).or_default();
        entry.1 += 1;
        if r.is_correct() {
            entry.0 += 1;
        }
    }

    counts
        .into_iter()
        .map(|(subject, (correct, total))| {
            (
                subject.to_string(),
                SubjectStat {
                    accuracy: correct as f64 / total as f64,
                    correct,
                    total,
                },
            )
        })
        .collect()
}

/// Compute overall and per-subject statistics.
pub fn compute_aggregate_stats(results: &[EvaluationResult]) -> Result<AggregateStats, EvalError> {
    let accuracy = overall_accuracy(results)?;
    Ok(AggregateStats {
        total: results.len(),
        correct: results.iter().filter(|r| r.is_correct()).count(),
        failed: results.iter().filter(|r| r.is_failure()).count(),
        accuracy,
        by_subject: accuracy_by_subject(results),
    })
}
