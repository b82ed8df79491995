//! The `alvorada validate` command.

use std::path::PathBuf;

use anyhow::Result;

use alvorada_core::dataset::{load_questions, validate_questions};

pub fn execute(data: PathBuf) -> Result<()> {
    let questions = load_questions(&data)?;
    println!("Question set: {} ({} questions)", data.display(), questions.len());

    let warnings = validate_questions(&questions);
    for w in &warnings {
        let prefix = w
            .question_id
            .as_ref()
            .map(|id| format!("  [{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("All questions valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
