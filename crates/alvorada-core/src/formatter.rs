//! Renders a question into a model-ready prompt.

use crate::error::FormatError;
use crate::model::QuestionRecord;
use crate::template::PromptTemplate;

/// Build the options block: one `"<letter>) <text>"` line per populated
/// alternative, in letter order.
pub fn options_block(question: &QuestionRecord) -> String {
    question
        .options()
        .map(|(letter, text)| format!("{letter}) {text}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Substitute `question` into `template`.
pub fn format_question(
    question: &QuestionRecord,
    template: &PromptTemplate,
) -> Result<String, FormatError> {
    render(
        template.text(),
        &question.question_statement,
        &options_block(question),
    )
}

/// Fill the `{question}` and `{options}` placeholders of `pattern`.
///
/// `{{` and `}}` produce literal braces. Every placeholder must be one of
/// the two known names and both must appear at least once.
pub fn render(pattern: &str, question: &str, options: &str) -> Result<String, FormatError> {
    let mut out = String::with_capacity(pattern.len() + question.len() + options.len());
    let mut saw_question = false;
    let mut saw_options = false;
    let mut rest = pattern;
    let mut offset = 0;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with("{{") || tail.starts_with("}}") {
            out.push_str(&tail[..1]);
            rest = &tail[2..];
            offset += pos + 2;
            continue;
        }

        if tail.starts_with('}') {
            return Err(FormatError::UnbalancedBrace(offset + pos));
        }

        let close = tail
            .find('}')
            .ok_or(FormatError::UnbalancedBrace(offset + pos))?;
        match &tail[1..close] {
            "question" => {
                out.push_str(question);
                saw_question = true;
            }
            "options" => {
                out.push_str(options);
                saw_options = true;
            }
            other if other.contains('{') => {
                return Err(FormatError::UnbalancedBrace(offset + pos));
            }
            other => return Err(FormatError::UnknownPlaceholder(other.to_string())),
        }
        rest = &tail[close + 1..];
        offset += pos + close + 1;
    }
    out.push_str(rest);

    if !saw_question {
        return Err(FormatError::MissingPlaceholder("question"));
    }
    if !saw_options {
        return Err(FormatError::MissingPlaceholder("options"));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(alternatives: [Option<&str>; 5]) -> QuestionRecord {
        let [a, b, c, d, e] = alternatives.map(|alt| alt.map(str::to_string));
        QuestionRecord {
            question_id: "q1".into(),
            question_statement: "Quanto é 2 + 2?".into(),
            alternative_a: a,
            alternative_b: b,
            alternative_c: c,
            alternative_d: d,
            alternative_e: e,
            correct_answer: "b".into(),
            subject: "Matemática".into(),
            exam_name: "ENEM".into(),
            exam_year: 2020,
            exam_type: "vestibular".into(),
        }
    }

    #[test]
    fn options_block_lists_all_five() {
        let q = question([Some("1"), Some("4"), Some("5"), Some("6"), Some("7")]);
        assert_eq!(options_block(&q), "a) 1\nb) 4\nc) 5\nd) 6\ne) 7");
    }

    #[test]
    fn options_block_skips_missing_without_gaps() {
        let q = question([Some("1"), None, Some(""), Some("4"), None]);
        assert_eq!(options_block(&q), "a) 1\nd) 4");
    }

    #[test]
    fn formats_into_template() {
        let q = question([Some("3"), Some("4"), None, None, None]);
        let template = PromptTemplate::new("t", "Q: {question}\n{options}\nAnswer:");
        assert_eq!(
            format_question(&q, &template).unwrap(),
            "Q: Quanto é 2 + 2?\na) 3\nb) 4\nAnswer:"
        );
    }

    #[test]
    fn escaped_braces_survive() {
        let rendered = render(r#"{question} {options} {{"chosen_answer": "x"}}"#, "Q", "O").unwrap();
        assert_eq!(rendered, r#"Q O {"chosen_answer": "x"}"#);
    }

    #[test]
    fn placeholders_may_repeat() {
        assert_eq!(render("{question}|{question}|{options}", "Q", "O").unwrap(), "Q|Q|O");
    }

    #[test]
    fn missing_placeholder_is_reported() {
        assert_eq!(
            render("only {question}", "Q", "O"),
            Err(FormatError::MissingPlaceholder("options"))
        );
        assert_eq!(
            render("only {options}", "Q", "O"),
            Err(FormatError::MissingPlaceholder("question"))
        );
    }

    #[test]
    fn unknown_placeholder_is_reported() {
        assert_eq!(
            render("{question} {options} {answer}", "Q", "O"),
            Err(FormatError::UnknownPlaceholder("answer".into()))
        );
    }

    #[test]
    fn unbalanced_braces_are_reported() {
        assert_eq!(
            render("{question} {options", "Q", "O"),
            Err(FormatError::UnbalancedBrace(11))
        );
        assert_eq!(
            render("{question} } {options}", "Q", "O"),
            Err(FormatError::UnbalancedBrace(11))
        );
    }

    #[test]
    fn substituted_text_is_not_reinterpreted() {
        let rendered = render("{question}\n{options}", "f(x) = {x}", "a) {y}").unwrap();
        assert_eq!(rendered, "f(x) = {x}\na) {y}");
    }

    #[test]
    fn builtin_templates_render() {
        let store = crate::template::TemplateStore::builtin();
        let q = question([Some("3"), Some("4"), None, None, None]);
        for name in store.available() {
            let prompt = format_question(&q, &store.load(&name).unwrap()).unwrap();
            assert!(prompt.contains("Quanto é 2 + 2?"));
            assert!(prompt.contains("a) 3\nb) 4"));
            assert!(prompt.contains(r#""chosen_answer""#));
        }
    }
}
