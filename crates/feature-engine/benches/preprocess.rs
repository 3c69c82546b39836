use criterion::{black_box, criterion_group, criterion_main, Criterion};
use feature_engine::{preprocess, FeatureVector, Payload, RawRecord};

fn record(department: &str) -> RawRecord {
    RawRecord::new()
        .with("satisfaction_level", 0.38)
        .with("last_evaluation", 0.53)
        .with("number_project", 2)
        .with("average_monthly_hours", 157)
        .with("time_spend_company", 3)
        .with("work_accident", 0)
        .with("promotion_last_5years", 0)
        .with("department", department)
        .with("salary", "low")
}

fn bench_single(c: &mut Criterion) {
    let input = record("sales");
    c.bench_function("feature_vector_from_record", |b| {
        b.iter(|| FeatureVector::from_record(black_box(&input)))
    });
}

fn bench_batch(c: &mut Criterion) {
    let departments = ["sales", "technical", "support", "IT", "RandD"];
    let input = Payload::Batch((0..256).map(|i| record(departments[i % departments.len()])).collect());
    c.bench_function("preprocess_batch_256", |b| b.iter(|| preprocess(black_box(&input))));
}

criterion_group!(benches, bench_single, bench_batch);
criterion_main!(benches);
