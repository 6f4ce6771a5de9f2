use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hyperdrive_train::data::{Dataset, Value};
use hyperdrive_train::evaluation::evaluate;
use hyperdrive_train::preprocessing::encode;
use hyperdrive_train::training::{train, HyperparameterConfig, TrainValidationSplitter};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Attrition-shaped table: a few low-cardinality categoricals and one wide one
fn create_attrition_data(n_rows: usize) -> Dataset {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let departments = ["Sales", "Research & Development", "Human Resources"];
    let travel = ["Travel_Rarely", "Travel_Frequently", "Non-Travel"];

    let mut dept = Vec::with_capacity(n_rows);
    let mut trav = Vec::with_capacity(n_rows);
    let mut overtime = Vec::with_capacity(n_rows);
    let mut income = Vec::with_capacity(n_rows);
    let mut attrition = Vec::with_capacity(n_rows);

    for _ in 0..n_rows {
        let ot = rng.gen_bool(0.3);
        let band = rng.gen_range(0..200i64);
        let p_leave = if ot { 0.35 } else { 0.1 } + if band < 40 { 0.15 } else { 0.0 };

        dept.push(Value::from(departments[rng.gen_range(0..3)]));
        trav.push(Value::from(travel[rng.gen_range(0..3)]));
        overtime.push(Value::from(if ot { "Yes" } else { "No" }));
        income.push(Value::from(band * 100));
        attrition.push(Value::from(if rng.gen_bool(p_leave) { "Yes" } else { "No" }));
    }

    Dataset::from_columns(vec![
        ("Department".to_string(), dept),
        ("BusinessTravel".to_string(), trav),
        ("OverTime".to_string(), overtime),
        ("MonthlyIncome".to_string(), income),
        ("Attrition".to_string(), attrition),
    ])
    .unwrap()
}

fn bench_encode(c: &mut Criterion) {
    let ds = create_attrition_data(1470);
    c.bench_function("encode_1470", |b| b.iter(|| encode(black_box(&ds), "Attrition").unwrap()));
}

fn bench_training(c: &mut Criterion) {
    let mut group = c.benchmark_group("training");
    group.sample_size(10);

    for n_rows in [500, 1470, 5000].iter() {
        let encoded = encode(&create_attrition_data(*n_rows), "Attrition").unwrap();
        let split = TrainValidationSplitter::default().split(&encoded.x, &encoded.y).unwrap();

        group.bench_with_input(BenchmarkId::new("fit", n_rows), &split, |b, s| {
            b.iter(|| train(&HyperparameterConfig::default(), black_box(&s.x_train), black_box(&s.y_train)).unwrap())
        });
    }

    group.finish();
}

fn bench_evaluation(c: &mut Criterion) {
    let encoded = encode(&create_attrition_data(1470), "Attrition").unwrap();
    let split = TrainValidationSplitter::default().split(&encoded.x, &encoded.y).unwrap();
    let model = train(&HyperparameterConfig::default(), &split.x_train, &split.y_train).unwrap();

    c.bench_function("evaluate_1470", |b| {
        b.iter(|| evaluate(black_box(&model), &split.x_val, &split.y_val).unwrap())
    });
}

criterion_group!(benches, bench_encode, bench_training, bench_evaluation);
criterion_main!(benches);
