//! Integration test: encoding, splitting, training and evaluation

use hyperdrive_train::data::{Dataset, Value};
use hyperdrive_train::error::HyperdriveError;
use hyperdrive_train::evaluation::evaluate;
use hyperdrive_train::preprocessing::{encode, fit, transform};
use hyperdrive_train::training::{split, train, HyperparameterConfig, TrainValidationSplitter};
use ndarray::{Array1, Array2};
use std::collections::HashSet;

fn employees(n: usize) -> Dataset {
    let roles = ["Sales Executive", "Research Scientist", "Laboratory Technician", "Manager"];
    Dataset::from_columns(vec![
        ("JobRole".to_string(), (0..n).map(|i| Value::from(roles[i % 4])).collect()),
        ("OverTime".to_string(), (0..n).map(|i| Value::from(if i % 3 == 0 { "Yes" } else { "No" })).collect()),
        ("StockOptionLevel".to_string(), (0..n).map(|i| Value::from((i % 3) as i64)).collect()),
        (
            "Attrition".to_string(),
            (0..n)
                .map(|i| Value::from(if i % 3 == 0 && i % 4 == 0 || i % 7 == 0 { "Yes" } else { "No" }))
                .collect(),
        ),
    ])
    .unwrap()
}

#[test]
fn test_encode_and_split_cover_every_row_once() {
    let ds = employees(57);
    let encoded = encode(&ds, "Attrition").unwrap();
    assert_eq!(encoded.n_rows(), 57);
    assert_eq!(encoded.n_features(), 4 + 2 + 3);
    assert!(encoded.y.iter().all(|&v| v == 0.0 || v == 1.0));

    let s = split(&encoded.x, &encoded.y, 0.2, 42).unwrap();
    assert_eq!(s.x_train.nrows() + s.x_val.nrows(), 57);
    assert_eq!(s.x_val.nrows(), 12);

    let train: HashSet<_> = s.indices.train.iter().copied().collect();
    let val: HashSet<_> = s.indices.validation.iter().copied().collect();
    assert!(train.is_disjoint(&val));
    assert_eq!(train.len() + val.len(), 57);
}

#[test]
fn test_split_is_deterministic_for_seed() {
    let encoded = encode(&employees(40), "Attrition").unwrap();
    let a = split(&encoded.x, &encoded.y, 0.2, 42).unwrap();
    let b = split(&encoded.x, &encoded.y, 0.2, 42).unwrap();
    assert_eq!(a.indices, b.indices);
    assert_eq!(a.y_train, b.y_train);
}

#[test]
fn test_train_and_evaluate_reproducible() {
    let encoded = encode(&employees(80), "Attrition").unwrap();
    let s = TrainValidationSplitter::default().split(&encoded.x, &encoded.y).unwrap();
    let hp = HyperparameterConfig {
        n_estimators: 30,
        max_depth: 3,
        subsample: 0.7,
        colsample_bytree: 0.8,
        ..Default::default()
    };

    let first = train(&hp, &s.x_train, &s.y_train).unwrap();
    let second = train(&hp, &s.x_train, &s.y_train).unwrap();
    assert_eq!(first, second);

    if s.y_val.iter().any(|&v| v == 1.0) && s.y_val.iter().any(|&v| v == 0.0) {
        let m1 = evaluate(&first, &s.x_val, &s.y_val).unwrap();
        let m2 = evaluate(&second, &s.x_val, &s.y_val).unwrap();
        assert_eq!(m1, m2);
    }
}

#[test]
fn test_booster_learns_categorical_rule() {
    // Attrition exactly when OverTime is "Yes"
    let n = 60;
    let ds = Dataset::from_columns(vec![
        ("Department".to_string(), (0..n).map(|i| Value::from(if i % 2 == 0 { "Sales" } else { "HR" })).collect()),
        ("OverTime".to_string(), (0..n).map(|i| Value::from(if i % 3 == 0 { "Yes" } else { "No" })).collect()),
        ("Attrition".to_string(), (0..n).map(|i| Value::from(if i % 3 == 0 { "Yes" } else { "No" })).collect()),
    ])
    .unwrap();

    let encoded = encode(&ds, "Attrition").unwrap();
    let model = train(&HyperparameterConfig::default(), &encoded.x, &encoded.y).unwrap();
    let metrics = evaluate(&model, &encoded.x, &encoded.y).unwrap();
    assert_eq!(metrics.accuracy(), 1.0);
    assert_eq!(metrics.auc_weighted(), 1.0);
}

#[test]
fn test_unknown_category_is_ignored_on_transform() {
    let fitted = fit(&employees(12), "Attrition").unwrap();
    let unseen = Dataset::from_columns(vec![
        ("JobRole".to_string(), vec![Value::from("Director"), Value::from("Manager")]),
        ("OverTime".to_string(), vec![Value::from("Yes"), Value::from("No")]),
        ("StockOptionLevel".to_string(), vec![Value::from(5i64), Value::from(1i64)]),
        ("Attrition".to_string(), vec![Value::from("Yes"), Value::from("No")]),
    ])
    .unwrap();

    let encoded = transform(&fitted, &unseen).unwrap();
    // Director and level 5 contribute nothing; OverTime always does
    assert_eq!(encoded.x.row(0).sum(), 1.0);
    assert_eq!(encoded.x.row(1).sum(), 3.0);
}

#[test]
fn test_single_class_training_rejected() {
    let x = Array2::from_shape_fn((6, 2), |(i, j)| ((i + j) % 2) as f64);
    let y = Array1::zeros(6);
    let err = train(&HyperparameterConfig::default(), &x, &y).unwrap_err();
    assert!(matches!(err, HyperdriveError::TrainingError(_)));
}

#[test]
fn test_single_class_validation_rejected() {
    let x = Array2::from_shape_fn((8, 2), |(i, j)| if i % 2 == j { 1.0 } else { 0.0 });
    let y = Array1::from_shape_fn(8, |i| (i % 2) as f64);
    let model = train(&HyperparameterConfig::default(), &x, &y).unwrap();

    let y_val = Array1::ones(8);
    let err = evaluate(&model, &x, &y_val).unwrap_err();
    assert!(matches!(err, HyperdriveError::EvaluationError(_)));
}
