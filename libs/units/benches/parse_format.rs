//! Criterion benchmarks for unit parsing and formatting

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mensura_units::{format, parse};
use std::time::Duration;

const EXPRESSIONS: [&str; 6] = [
    "kg*m/s^2",
    "km/h",
    "log(Pa)",
    "2.54*cm",
    "m/(s·A·K)",
    "(K+273.15)/1000",
];

fn custom_criterion() -> Criterion {
    Criterion::default()
        .sample_size(20)
        .warm_up_time(Duration::from_millis(100))
        .measurement_time(Duration::from_secs(1))
        .nresamples(1000)
}

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_simple_symbol", |b| {
        b.iter(|| parse(black_box("m")).unwrap())
    });

    c.bench_function("parse_expressions", |b| {
        b.iter(|| {
            for text in EXPRESSIONS {
                parse(black_box(text)).unwrap();
            }
        })
    });
}

fn bench_format(c: &mut Criterion) {
    let units: Vec<_> = EXPRESSIONS.iter().map(|t| parse(t).unwrap()).collect();

    c.bench_function("format_expressions", |b| {
        b.iter(|| {
            for unit in &units {
                black_box(format(unit));
            }
        })
    });
}

fn bench_round_trip(c: &mut Criterion) {
    c.bench_function("round_trip_expressions", |b| {
        b.iter(|| {
            for text in EXPRESSIONS {
                let unit = parse(black_box(text)).unwrap();
                black_box(parse(&format(&unit)).unwrap());
            }
        })
    });
}

criterion_group! {
    name = benches;
    config = custom_criterion();
    targets = bench_parse, bench_format, bench_round_trip
}
criterion_main!(benches);
