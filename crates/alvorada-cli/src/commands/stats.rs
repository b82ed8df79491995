//! The `alvorada stats` command.

use std::fmt::Display;
use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use alvorada_core::dataset::{load_questions, DatasetStats};

pub fn execute(data: PathBuf) -> Result<()> {
    let questions = load_questions(&data)?;
    let Some(stats) = DatasetStats::compute(&questions) else {
        println!("{}: no questions.", data.display());
        return Ok(());
    };

    println!("Dataset: {}", data.display());
    println!("Total questions: {}", stats.total_questions);
    println!("Years: {} to {}", stats.years.min, stats.years.max);
    println!("Average alternatives: {:.2}", stats.avg_alternatives);

    println!("\nSubjects");
    println!("{}", counts_table("Subject", &stats.subjects));
    println!("\nExams (top 10)");
    println!("{}", counts_table("Exam", &stats.exams));
    println!("\nExam types");
    println!("{}", counts_table("Type", &stats.exam_types));
    println!("\nYears (top 10)");
    println!("{}", counts_table("Year", &stats.years.distribution));

    Ok(())
}

fn counts_table<'a, K: Display + 'a>(
    label: &str,
    counts: impl IntoIterator<Item = (&'a K, &'a usize)>,
) -> Table {
    let mut table = Table::new();
    table.set_header(vec![label, "Questions"]);
    for (key, count) in counts {
        table.add_row(vec![Cell::new(key), Cell::new(count)]);
    }
    table
}
