use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use emissions_classifier::config::EncoderConfig;
use emissions_classifier::prelude::*;
use std::collections::BTreeMap;

fn emissions(n: usize) -> Table {
    let manufacturers = ["Ford", "Vauxhall", "BMW", "Ferrari", "Audi"];
    let fuels = ["Petrol", "Diesel", "LPG"];
    Table::from_columns(vec![
        Column::numeric(
            "co2",
            (0..n)
                .map(|i| (i % 11 != 0).then(|| 100.0 + (i % 200) as f64))
                .collect(),
        ),
        Column::numeric(
            "engine_capacity",
            (0..n).map(|i| Some(1000.0 + (i % 30) as f64 * 100.0)).collect(),
        ),
        Column::categorical(
            "manufacturer",
            (0..n)
                .map(|i| Some(manufacturers[i % manufacturers.len()].to_string()))
                .collect(),
        ),
        Column::categorical(
            "fuel_type",
            (0..n)
                .map(|i| (i % 17 != 0).then(|| fuels[i % fuels.len()].to_string()))
                .collect(),
        ),
    ])
    .unwrap()
}

fn encoder() -> FeatureEncoder {
    let mut rare_categories = BTreeMap::new();
    rare_categories.insert("manufacturer".to_string(), vec!["Ferrari".to_string()]);
    rare_categories.insert("fuel_type".to_string(), vec!["LPG".to_string()]);
    FeatureEncoder::new(EncoderConfig {
        drop_columns: vec![],
        numeric_columns: vec!["co2".into(), "engine_capacity".into()],
        categorical_columns: vec!["manufacturer".into(), "fuel_type".into()],
        rare_categories,
        ..EncoderConfig::default()
    })
}

fn bench_fit(c: &mut Criterion) {
    for size in [1_000, 10_000, 50_000].iter() {
        let table = emissions(*size);
        c.bench_with_input(BenchmarkId::new("encoder_fit", size), &table, |b, table| {
            b.iter(|| black_box(encoder().fit(black_box(table)).unwrap()));
        });
    }
}

fn bench_transform_to_matrix(c: &mut Criterion) {
    for size in [1_000, 10_000, 50_000].iter() {
        let table = emissions(*size);
        let fitted = encoder().fit(&table).unwrap();
        c.bench_with_input(
            BenchmarkId::new("encoder_transform_to_matrix", size),
            &table,
            |b, table| {
                b.iter(|| black_box(fitted.transform_to_matrix(black_box(table)).unwrap()));
            },
        );
    }
}

criterion_group!(benches, bench_fit, bench_transform_to_matrix);
criterion_main!(benches);
