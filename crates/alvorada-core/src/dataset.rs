//! Question corpus loading, filtering, statistics and validation.
//!
//! Question files are either a JSON array of records (`.json`) or one record
//! per line (`.jsonl` / `.ndjson`).

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::model::{QuestionRecord, OPTION_LETTERS};

/// Seed used for sampling when none is given.
pub const DEFAULT_SEED: u64 = 42;

/// Load all questions from `path`.
pub fn load_questions(path: &Path) -> Result<Vec<QuestionRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question file: {}", path.display()))?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("jsonl") | Some("ndjson") => parse_json_lines(&content)
            .with_context(|| format!("failed to parse question file: {}", path.display())),
        Some("json") => serde_json::from_str(&content)
            .with_context(|| format!("failed to parse question file: {}", path.display())),
        _ => anyhow::bail!(
            "unsupported question file format: {} (expected .json, .jsonl or .ndjson)",
            path.display()
        ),
    }
}

fn parse_json_lines(content: &str) -> Result<Vec<QuestionRecord>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line).with_context(|| format!("line {}", index + 1))
        })
        .collect()
}

/// Criteria narrowing a question set before evaluation.
///
/// Empty lists and `None` bounds mean "no constraint".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionFilter {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subjects: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exams: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub years: Vec<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exam_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_year: Option<i32>,
    /// Case-insensitive substring of the question statement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contains_text: Option<String>,
    /// Keep a random sample of at most this many questions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_size: Option<usize>,
    #[serde(default = "default_seed")]
    pub random_seed: u64,
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

impl Default for QuestionFilter {
    fn default() -> Self {
        Self {
            subjects: Vec::new(),
            exams: Vec::new(),
            years: Vec::new(),
            exam_types: Vec::new(),
            min_year: None,
            max_year: None,
            contains_text: None,
            sample_size: None,
            random_seed: DEFAULT_SEED,
        }
    }
}

impl QuestionFilter {
    /// Whether this filter leaves every question in place.
    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
            && self.exams.is_empty()
            && self.years.is_empty()
            && self.exam_types.is_empty()
            && self.min_year.is_none()
            && self.max_year.is_none()
            && self.contains_text.is_none()
            && self.sample_size.is_none()
    }

    /// Whether `question` passes every criterion except sampling.
    pub fn matches(&self, question: &QuestionRecord) -> bool {
        (self.subjects.is_empty() || self.subjects.contains(&question.subject))
            && (self.exams.is_empty() || self.exams.contains(&question.exam_name))
            && (self.years.is_empty() || self.years.contains(&question.exam_year))
            && (self.exam_types.is_empty() || self.exam_types.contains(&question.exam_type))
            && self.min_year.map_or(true, |min| question.exam_year >= min)
            && self.max_year.map_or(true, |max| question.exam_year <= max)
            && self.contains_text.as_deref().map_or(true, |needle| {
                question
                    .question_statement
                    .to_lowercase()
                    .contains(&needle.to_lowercase())
            })
    }

    /// Filter `questions`, then sample if requested.
    ///
    /// Sampling is deterministic for a given seed and keeps the order in which
    /// questions were drawn. A sample size at or above the filtered count still
    /// draws every question, so the result is a seeded shuffle.
    pub fn apply(&self, questions: Vec<QuestionRecord>) -> Vec<QuestionRecord> {
        let mut kept: Vec<QuestionRecord> =
            questions.into_iter().filter(|q| self.matches(q)).collect();

        if let Some(n) = self.sample_size {
            let n = n.min(kept.len());
            let mut rng = StdRng::seed_from_u64(self.random_seed);
            let picked = rand::seq::index::sample(&mut rng, kept.len(), n).into_vec();
            let mut slots: Vec<Option<QuestionRecord>> = kept.into_iter().map(Some).collect();
            kept = picked
                .into_iter()
                .filter_map(|index| slots[index].take())
                .collect();
        }
        kept
    }

    /// The filter as opaque run metadata, `None` when nothing was filtered.
    pub fn to_metadata(&self) -> Option<serde_json::Value> {
        if self.is_empty() {
            return None;
        }
        serde_json::to_value(self).ok()
    }
}

/// Descriptive statistics over a question set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetStats {
    pub total_questions: usize,
    /// Questions per subject, most frequent first.
    pub subjects: IndexMap<String, usize>,
    /// The ten most frequent exams.
    pub exams: IndexMap<String, usize>,
    pub exam_types: IndexMap<String, usize>,
    pub years: YearStats,
    /// Mean number of populated alternatives per question.
    pub avg_alternatives: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearStats {
    pub min: i32,
    pub max: i32,
    /// The ten most frequent years.
    pub distribution: IndexMap<i32, usize>,
}

impl DatasetStats {
    /// `None` for an empty question set.
    pub fn compute(questions: &[QuestionRecord]) -> Option<Self> {
        let min = questions.iter().map(|q| q.exam_year).min()?;
        let max = questions.iter().map(|q| q.exam_year).max()?;

        let options: usize = questions.iter().map(QuestionRecord::option_count).sum();

        Some(Self {
            total_questions: questions.len(),
            subjects: value_counts(questions.iter().map(|q| q.subject.clone()), None),
            exams: value_counts(questions.iter().map(|q| q.exam_name.clone()), Some(10)),
            exam_types: value_counts(questions.iter().map(|q| q.exam_type.clone()), None),
            years: YearStats {
                min,
                max,
                distribution: value_counts(questions.iter().map(|q| q.exam_year), Some(10)),
            },
            avg_alternatives: options as f64 / questions.len() as f64,
        })
    }
}

/// Count occurrences, most frequent first; ties keep first-occurrence order.
fn value_counts<K, I>(values: I, limit: Option<usize>) -> IndexMap<K, usize>
where
    K: std::hash::Hash + Eq,
    I: IntoIterator<Item = K>,
{
    let mut counts: IndexMap<K, usize> = IndexMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }
    counts.sort_by(|_, a, _, b| b.cmp(a));
    if let Some(limit) = limit {
        counts.truncate(limit);
    }
    counts
}

/// A problem found in a question record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    pub question_id: Option<String>,
    pub message: String,
}

/// Check records against the question invariants.
pub fn validate_questions(questions: &[QuestionRecord]) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let mut seen = HashSet::new();

    if questions.is_empty() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "question set is empty".into(),
        });
    }

    for q in questions {
        let mut warn = |message: String| {
            warnings.push(ValidationWarning {
                question_id: Some(q.question_id.clone()),
                message,
            })
        };

        if !seen.insert(q.question_id.as_str()) {
            warn("duplicate question_id".into());
        }
        if q.question_statement.trim().is_empty() {
            warn("question statement is empty".into());
        }
        let count = q.option_count();
        if !(2..=OPTION_LETTERS.len()).contains(&count) {
            warn(format!("has {count} populated alternatives, expected 2 to 5"));
        }
        if !q.answer_is_populated() {
            warn(format!(
                "correct_answer {:?} does not reference a populated alternative",
                q.correct_answer
            ));
        }
    }

    warnings
}
