//! The `alvorada run` command.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use alvorada_core::client::ModelSpec;
use alvorada_core::dataset::{load_questions, QuestionFilter};
use alvorada_core::engine::{EvalEngineConfig, Evaluator, ProgressReporter};
use alvorada_core::model::EvaluationResult;
use alvorada_core::report::{default_file_name, RunSummary};
use alvorada_core::template::TemplateStore;
use alvorada_core::traits::LlmProvider;
use alvorada_providers::load_config_from;

use crate::RunArgs;

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_question_start(&self, index: usize, total: usize, question_id: &str) {
        eprintln!("Evaluating {}/{total}: {question_id}", index + 1);
    }

    fn on_question_complete(&self, _index: usize, _total: usize, result: &EvaluationResult) {
        if let Some(error) = result.error() {
            eprintln!("  FAILED {}: {error}", result.question_id());
        }
    }

    fn on_batch_complete(&self, total: usize, correct: usize, failed: usize, elapsed: Duration) {
        eprintln!(
            "\nComplete: {correct}/{total} correct, {failed} failed ({:.1}s)",
            elapsed.as_secs_f64()
        );
    }
}

pub async fn execute(args: RunArgs) -> Result<()> {
    let config = load_config_from(args.config.as_deref())?;

    let concurrency = args.concurrency.unwrap_or(config.concurrency);
    anyhow::ensure!(concurrency >= 1, "concurrency must be at least 1");
    if let Some(temperature) = config.temperature {
        anyhow::ensure!(
            (0.0..=2.0).contains(&temperature),
            "temperature must be between 0.0 and 2.0"
        );
    }

    let model = ModelSpec::parse(
        args.model.as_deref().unwrap_or(&config.default_model),
        &config.default_provider,
    );
    let template_name = args
        .prompt
        .clone()
        .unwrap_or_else(|| config.default_prompt.clone());
    let store = match args.prompts_dir.as_ref().or(config.prompts_dir.as_ref()) {
        Some(dir) => TemplateStore::with_dir(dir),
        None => TemplateStore::builtin(),
    };

    let questions = load_questions(&args.data)?;
    let loaded = questions.len();

    let filter = QuestionFilter {
        subjects: args.subjects,
        exams: args.exams,
        years: args.years,
        exam_types: args.exam_types,
        min_year: args.min_year,
        max_year: args.max_year,
        contains_text: args.contains,
        sample_size: args.limit,
        random_seed: args.random_seed,
    };
    let questions = filter.apply(questions);
    anyhow::ensure!(
        !questions.is_empty(),
        "no questions left to evaluate ({loaded} loaded, 0 after filtering)"
    );

    let provider: Arc<dyn LlmProvider> = Arc::from(config.provider(&model.provider)?);
    let evaluator = Evaluator::from_store(
        provider,
        model,
        &store,
        &template_name,
        EvalEngineConfig {
            concurrency,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        },
    )?;

    eprintln!(
        "alvorada v{}: {} questions x {} with prompt '{}'",
        env!("CARGO_PKG_VERSION"),
        questions.len(),
        evaluator.model(),
        template_name
    );
    eprintln!();

    let summary = evaluator
        .run(&questions, filter.to_metadata(), &ConsoleReporter)
        .await?;

    print_summary(&summary);

    let path = match args.output {
        Some(path) => path,
        None => args.output_dir.unwrap_or(config.output_dir).join(default_file_name(
            summary.metadata.timestamp,
            &summary.metadata.model,
            &summary.metadata.prompt_template,
        )),
    };
    summary
        .save_json(&path)
        .with_context(|| format!("failed to save run summary for {}", summary.metadata.run_id))?;
    tracing::debug!(run_id = %summary.metadata.run_id, path = %path.display(), "run summary saved");
    println!("Results saved to: {}", path.display());

    Ok(())
}

fn print_summary(summary: &RunSummary) {
    let meta = &summary.metadata;
    println!(
        "Accuracy: {:.2}% ({}/{} correct, {} failed)",
        meta.accuracy * 100.0,
        meta.correct,
        meta.total_questions,
        meta.failed
    );

    let mut table = Table::new();
    table.set_header(vec!["Subject", "Accuracy", "Correct", "Total"]);
    for (subject, stat) in &summary.accuracy_by_subject {
        table.add_row(vec![
            Cell::new(subject),
            Cell::new(format!("{:.2}%", stat.accuracy * 100.0)),
            Cell::new(stat.correct),
            Cell::new(stat.total),
        ]);
    }
    println!("{table}");
}
