//! Response scoring.
//!
//! Turns the model client's outcome for one question into exactly one
//! `EvaluationResult`. Nothing in here can fail: every problem becomes a
//! `Failure` result.

use serde_json::{Map, Value};

use crate::error::ModelCallError;
use crate::model::{EvaluationResult, FailedQuestion, QuestionRecord, ScoredAnswer};

/// Keys owned by the scored result; a model echoing them never overrides the
/// source record and never reaches the extension map.
const RESERVED_KEYS: &[&str] = &[
    "chosen_answer",
    "correct",
    "question_id",
    "subject",
    "exam_name",
];

/// Parse a raw model payload into its chosen letter and extra fields.
pub fn parse_response(content: &str) -> Result<(String, Map<String, Value>), ModelCallError> {
    let value: Value = serde_json::from_str(content)?;
    let Value::Object(mut object) = value else {
        return Err(ModelCallError::NotAnObject);
    };

    let chosen = match object.remove("chosen_answer") {
        Some(Value::String(letter)) => letter,
        Some(other) => return Err(ModelCallError::InvalidChosenAnswer(other.to_string())),
        None => return Err(ModelCallError::MissingChosenAnswer),
    };

    object.retain(|key, _| !RESERVED_KEYS.contains(&key.as_str()));
    Ok((chosen, object))
}

/// Score a model outcome for `question`.
pub fn score(question: &QuestionRecord, outcome: anyhow::Result<String>) -> EvaluationResult {
    let parsed = outcome
        .map_err(ModelCallError::Provider)
        .and_then(|content| parse_response(&content));

    match parsed {
        Ok((chosen_answer, extra)) => EvaluationResult::Success(ScoredAnswer {
            question_id: question.question_id.clone(),
            subject: question.subject.clone(),
            exam_name: question.exam_name.clone(),
            correct: chosen_answer == question.correct_answer,
            chosen_answer,
            extra,
        }),
        Err(e) => failure(question, &e),
    }
}

/// A failed result for `question` carrying the stringified cause.
pub fn failure(question: &QuestionRecord, cause: &dyn std::fmt::Display) -> EvaluationResult {
    EvaluationResult::Failure(FailedQuestion {
        question_id: question.question_id.clone(),
        error: cause.to_string(),
    })
}
