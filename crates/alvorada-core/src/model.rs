//! Core data model types.
//!
//! Questions are read-only inputs; evaluation results are produced exactly
//! once per question by the scorer and never mutated afterwards.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde::ser::SerializeStruct;

/// Option letters in presentation order.
pub const OPTION_LETTERS: [char; 5] = ['a', 'b', 'c', 'd', 'e'];

/// A single multiple-choice exam question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    /// Unique identifier. Numeric ids in source files are stringified.
    #[serde(deserialize_with = "string_or_number")]
    pub question_id: String,
    /// The question text.
    pub question_statement: String,
    #[serde(default)]
    pub alternative_a: Option<String>,
    #[serde(default)]
    pub alternative_b: Option<String>,
    #[serde(default)]
    pub alternative_c: Option<String>,
    #[serde(default)]
    pub alternative_d: Option<String>,
    #[serde(default)]
    pub alternative_e: Option<String>,
    /// Letter of the correct alternative.
    pub correct_answer: String,
    pub subject: String,
    pub exam_name: String,
    pub exam_year: i32,
    #[serde(default)]
    pub exam_type: String,
}

impl QuestionRecord {
    /// The alternative text for `letter`, if present and non-empty.
    pub fn alternative(&self, letter: char) -> Option<&str> {
        let value = match letter {
            'a' => &self.alternative_a,
            'b' => &self.alternative_b,
            'c' => &self.alternative_c,
            'd' => &self.alternative_d,
            'e' => &self.alternative_e,
            _ => return None,
        };
        value.as_deref().filter(|text| !text.is_empty())
    }

    /// Populated alternatives in letter order.
    pub fn options(&self) -> impl Iterator<Item = (char, &str)> + '_ {
        OPTION_LETTERS
            .iter()
            .filter_map(move |&letter| self.alternative(letter).map(|text| (letter, text)))
    }

    /// Number of populated alternatives.
    pub fn option_count(&self) -> usize {
        self.options().count()
    }

    /// Whether `correct_answer` names a populated alternative.
    pub fn answer_is_populated(&self) -> bool {
        let mut chars = self.correct_answer.chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) => self.alternative(letter).is_some(),
            _ => false,
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Int(n) => n.to_string(),
        Id::Float(f) => f.to_string(),
    })
}

/// Outcome of evaluating one question.
///
/// Serialized flat: a success carries the source record's identifying fields,
/// the model's chosen letter and any extra keys the model returned; a failure
/// carries only the question id, the error and `correct: false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EvaluationResult {
    Success(ScoredAnswer),
    Failure(FailedQuestion),
}

/// A parsed and scored model answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredAnswer {
    pub question_id: String,
    pub subject: String,
    pub exam_name: String,
    pub chosen_answer: String,
    pub correct: bool,
    /// Additional keys from the model's JSON object (e.g. an explanation).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A question whose formatting, model call or response parsing failed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FailedQuestion {
    pub question_id: String,
    pub error: String,
}

impl Serialize for FailedQuestion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FailedQuestion", 3)?;
        state.serialize_field("question_id", &self.question_id)?;
        state.serialize_field("error", &self.error)?;
        state.serialize_field("correct", &false)?;
        state.end()
    }
}

impl EvaluationResult {
    pub fn question_id(&self) -> &str {
        match self {
            EvaluationResult::Success(s) => &s.question_id,
            EvaluationResult::Failure(f) => &f.question_id,
        }
    }

    /// Subject of the source question; `None` for failures.
    pub fn subject(&self) -> Option<&str> {
        match self {
            EvaluationResult::Success(s) => Some(&s.subject),
            EvaluationResult::Failure(_) => None,
        }
    }

    pub fn chosen_answer(&self) -> Option<&str> {
        match self {
            EvaluationResult::Success(s) => Some(&s.chosen_answer),
            EvaluationResult::Failure(_) => None,
        }
    }

    pub fn is_correct(&self) -> bool {
        matches!(self, EvaluationResult::Success(s) if s.correct)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            EvaluationResult::Success(_) => None,
            EvaluationResult::Failure(f) => Some(&f.error),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, EvaluationResult::Failure(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn question() -> QuestionRecord {
        QuestionRecord {
            question_id: "enem-2022-17".into(),
            question_statement: "Qual é a capital do Brasil?".into(),
            alternative_a: Some("Rio de Janeiro".into()),
            alternative_b: Some("Brasília".into()),
            alternative_c: Some(String::new()),
            alternative_d: None,
            alternative_e: Some("Salvador".into()),
            correct_answer: "b".into(),
            subject: "Geografia".into(),
            exam_name: "ENEM".into(),
            exam_year: 2022,
            exam_type: "vestibular".into(),
        }
    }

    #[test]
    fn options_skip_empty_alternatives() {
        let q = question();
        let letters: Vec<char> = q.options().map(|(l, _)| l).collect();
        assert_eq!(letters, vec!['a', 'b', 'e']);
        assert_eq!(q.option_count(), 3);
        assert_eq!(q.alternative('c'), None);
        assert_eq!(q.alternative('z'), None);
    }

    #[test]
    fn answer_must_reference_populated_option() {
        let mut q = question();
        assert!(q.answer_is_populated());
        q.correct_answer = "c".into();
        assert!(!q.answer_is_populated());
        q.correct_answer = "ab".into();
        assert!(!q.answer_is_populated());
    }

    #[test]
    fn numeric_question_id_is_stringified() {
        let q: QuestionRecord = serde_json::from_value(json!({
            "question_id": 4211,
            "question_statement": "2 + 2?",
            "alternative_a": "3",
            "alternative_b": "4",
            "correct_answer": "b",
            "subject": "Matemática",
            "exam_name": "FUVEST",
            "exam_year": 2019
        }))
        .unwrap();
        assert_eq!(q.question_id, "4211");
        assert_eq!(q.alternative_c, None);
        assert_eq!(q.exam_type, "");
    }

    #[test]
    fn failure_serializes_with_correct_false() {
        let result = EvaluationResult::Failure(FailedQuestion {
            question_id: "q3".into(),
            error: "network error: connection reset".into(),
        });
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            json!({"question_id": "q3", "error": "network error: connection reset", "correct": false})
        );
    }

    #[test]
    fn success_flattens_extra_fields() {
        let mut extra = serde_json::Map::new();
        extra.insert("explanation".into(), json!("Brasília é a capital federal."));
        let result = EvaluationResult::Success(ScoredAnswer {
            question_id: "q1".into(),
            subject: "Geografia".into(),
            exam_name: "ENEM".into(),
            chosen_answer: "b".into(),
            correct: true,
            extra,
        });

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["explanation"], "Brasília é a capital federal.");
        assert_eq!(value["correct"], true);

        let back: EvaluationResult = serde_json::from_value(value).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn failure_deserializes_from_flat_shape() {
        let back: EvaluationResult = serde_json::from_value(
            json!({"question_id": "q9", "error": "boom", "correct": false}),
        )
        .unwrap();
        assert!(back.is_failure());
        assert_eq!(back.subject(), None);
        assert_eq!(back.error(), Some("boom"));
        assert!(!back.is_correct());
    }
}
