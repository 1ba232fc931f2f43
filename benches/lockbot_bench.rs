// SPDX-License-Identifier: PMPL-1.0-or-later
//! Benchmarks for lockbot validation and integrity checks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lockbot::locker::validate_integrity;
use lockbot::stylesheet::StyleSheet;
use lockbot::{ContentLocker, ContentRequirements, MediaKind, Validator};
use std::collections::BTreeMap;

const LANDING: &str = include_str!("../tests/fixtures/landing.html");
const CLEAN: &str = include_str!("../tests/fixtures/clean.css");
const DESTRUCTIVE: &str = include_str!("../tests/fixtures/destructive.css");

fn values() -> BTreeMap<String, String> {
    [
        ("headline", "Fresh Coffee"),
        ("subheadline", "Roasted every morning"),
        ("description", "Single origin beans"),
        ("price", "$12"),
        ("cta_text", "Order now"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn bench_stylesheet_parse(c: &mut Criterion) {
    let css = CLEAN.repeat(50);
    c.bench_function("stylesheet_parse", |b| {
        b.iter(|| StyleSheet::parse(black_box(&css)))
    });
}

fn bench_validate(c: &mut Criterion) {
    let validator = Validator::default();
    c.bench_function("validate_clean", |b| {
        b.iter(|| validator.validate(black_box(LANDING), black_box(CLEAN), None))
    });
    c.bench_function("validate_and_fix_destructive", |b| {
        b.iter(|| validator.validate_and_fix(black_box(LANDING), black_box(DESTRUCTIVE), Some("agent_19")))
    });
}

fn bench_lock(c: &mut Criterion) {
    let locker = ContentLocker::default();
    let requirements = ContentRequirements::default();
    let values = values();
    c.bench_function("lock_landing_page", |b| {
        b.iter(|| locker.lock(black_box(&requirements), MediaKind::Lp, black_box(&values)))
    });
}

fn bench_integrity(c: &mut Criterion) {
    let locked = ContentLocker::default().lock(&ContentRequirements::default(), MediaKind::Lp, &values());
    let identical = locked.markup().to_string();
    let tampered = identical.replace("Roasted every morning", "Roasted sometimes");

    c.bench_function("integrity_identical", |b| {
        b.iter(|| validate_integrity(black_box(&locked), black_box(&identical)))
    });
    c.bench_function("integrity_tampered", |b| {
        b.iter(|| validate_integrity(black_box(&locked), black_box(&tampered)))
    });
}

criterion_group!(
    benches,
    bench_stylesheet_parse,
    bench_validate,
    bench_lock,
    bench_integrity
);
criterion_main!(benches);
