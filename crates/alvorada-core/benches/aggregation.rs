use criterion::{black_box, criterion_group, criterion_main, Criterion};

use alvorada_core::model::{EvaluationResult, FailedQuestion, ScoredAnswer};
use alvorada_core::statistics::{accuracy_by_subject, compute_aggregate_stats};

const SUBJECTS: [&str; 8] = [
    "Matemática",
    "Física",
    "Química",
    "Biologia",
    "História",
    "Geografia",
    "Português",
    "Inglês",
];

fn make_results(n: usize) -> Vec<EvaluationResult> {
    (0..n)
        .map(|i| {
            if i % 17 == 0 {
                EvaluationResult::Failure(FailedQuestion {
                    question_id: i.to_string(),
                    error: "rate limited, retry after 5000ms".into(),
                })
            } else {
                EvaluationResult::Success(ScoredAnswer {
                    question_id: i.to_string(),
                    subject: SUBJECTS[i % SUBJECTS.len()].into(),
                    exam_name: "ENEM".into(),
                    chosen_answer: "a".into(),
                    correct: i % 3 != 0,
                    extra: Default::default(),
                })
            }
        })
        .collect()
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");

    for n in [100, 1_000, 10_000] {
        let results = make_results(n);
        group.bench_function(format!("compute_aggregate_stats/{n}"), |b| {
            b.iter(|| compute_aggregate_stats(black_box(&results)))
        });
        group.bench_function(format!("accuracy_by_subject/{n}"), |b| {
            b.iter(|| accuracy_by_subject(black_box(&results)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_aggregate);
criterion_main!(benches);
