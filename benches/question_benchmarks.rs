use criterion::{Criterion, black_box, criterion_group, criterion_main};

use mathfc::engine::Difficulty;
use mathfc::engine::answer::evaluate;
use mathfc::engine::chart_data::{ChartCategory, ChartMode, to_series};
use mathfc::engine::question::{Question, QuestionGenerator};
use mathfc::engine::random::RngSource;
use mathfc::engine::ranges::RangeTable;
use mathfc::engine::stats::PlayerStats;
use mathfc::engine::Operation;

fn bench_generate(c: &mut Criterion) {
    let table = RangeTable::default();
    let generator = QuestionGenerator::new(&table);
    let mut rng = RngSource::seeded(42);

    c.bench_function("generate question (expert)", |b| {
        b.iter(|| generator.generate(black_box(Difficulty::Expert), &mut rng))
    });
}

fn bench_evaluate(c: &mut Criterion) {
    let question = Question::new(7, 8, Operation::Multiply);
    let mut rng = RngSource::seeded(7);

    c.bench_function("evaluate with distractors", |b| {
        b.iter(|| evaluate(black_box(&question), &mut rng))
    });
}

fn bench_series(c: &mut Criterion) {
    let mut stats = PlayerStats::default();
    for i in 0..1000u32 {
        let op = [Operation::Add, Operation::Subtract, Operation::Multiply, Operation::Divide]
            [(i % 4) as usize];
        let level = Difficulty::from_level((i % 4) as u8 + 1).unwrap_or(Difficulty::Easy);
        // ~14% error rate
        let _ = stats.record(i % 7 != 0, op, level);
    }
    let snapshot = stats.snapshot();

    c.bench_function("operations series (percent)", |b| {
        b.iter(|| {
            to_series(
                black_box(&snapshot),
                ChartCategory::Operations,
                ChartMode::Percent,
            )
        })
    });
}

criterion_group!(benches, bench_generate, bench_evaluate, bench_series);
criterion_main!(benches);
