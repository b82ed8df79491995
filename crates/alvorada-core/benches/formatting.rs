use criterion::{black_box, criterion_group, criterion_main, Criterion};

use alvorada_core::formatter::format_question;
use alvorada_core::model::QuestionRecord;
use alvorada_core::scorer::parse_response;
use alvorada_core::template::TemplateStore;

fn make_question(statement_len: usize) -> QuestionRecord {
    QuestionRecord {
        question_id: "bench".into(),
        question_statement: "Considere o texto a seguir. ".repeat(statement_len / 28 + 1),
        alternative_a: Some("A fotossíntese ocorre nos cloroplastos.".into()),
        alternative_b: Some("A respiração celular ocorre no núcleo.".into()),
        alternative_c: None,
        alternative_d: Some("O ribossomo sintetiza lipídios.".into()),
        alternative_e: Some("A mitocôndria armazena amido.".into()),
        correct_answer: "a".into(),
        subject: "Biologia".into(),
        exam_name: "ENEM".into(),
        exam_year: 2021,
        exam_type: "vestibular".into(),
    }
}

fn bench_format_question(c: &mut Criterion) {
    let mut group = c.benchmark_group("format_question");
    let store = TemplateStore::builtin();

    for name in ["zero_shot", "chain_of_thought", "role_playing"] {
        let template = store.load(name).unwrap();
        let question = make_question(400);
        group.bench_function(name, |b| {
            b.iter(|| format_question(black_box(&question), black_box(&template)))
        });
    }

    let template = store.load("zero_shot").unwrap();
    let long = make_question(8_000);
    group.bench_function("zero_shot_long_statement", |b| {
        b.iter(|| format_question(black_box(&long), black_box(&template)))
    });

    group.finish();
}

fn bench_parse_response(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_response");

    let minimal = r#"{"chosen_answer": "a"}"#;
    let with_reasoning = r#"{"reasoning": "A alternativa a descreve corretamente o processo; as demais confundem organelas.", "chosen_answer": "a", "confidence": 0.82}"#;

    group.bench_function("minimal", |b| b.iter(|| parse_response(black_box(minimal))));
    group.bench_function("with_reasoning", |b| {
        b.iter(|| parse_response(black_box(with_reasoning)))
    });

    group.finish();
}

criterion_group!(benches, bench_format_question, bench_parse_response);
criterion_main!(benches);
