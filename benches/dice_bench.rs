//! Dice Engine Benchmarks - Roll Path Performance
//!
//! Benchmarks the rejection-sampled die and the aggregated rolls the
//! sheet performs on every check.
//!
//! Run with: cargo bench --bench dice_bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use eem_sheet::domain::dice::{roll_dice, roll_die, DiceExpr};
use eem_sheet::domain::propagation::Propagator;
use eem_sheet::domain::store::{AttributeStore, WriteOrigin};

/// Single d12, the check die.
fn bench_roll_die(c: &mut Criterion) {
    c.bench_function("roll_die_d12", |b| {
        b.iter(|| roll_die(black_box(12)));
    });
}

/// A side count with a large rejection band.
fn bench_roll_die_biased_band(c: &mut Criterion) {
    let sides = i32::MAX / 2 + 1;
    c.bench_function("roll_die_wide", |b| {
        b.iter(|| roll_die(black_box(sides)));
    });
}

/// Advantage roll: two dice with a modifier.
fn bench_roll_advantage(c: &mut Criterion) {
    c.bench_function("roll_dice_2d12_adv", |b| {
        b.iter(|| roll_dice(black_box(12), black_box(2), black_box(3)));
    });
}

/// Dread expression parse + roll.
fn bench_dread(c: &mut Criterion) {
    c.bench_function("dread_parse_and_roll", |b| {
        b.iter(|| DiceExpr::parse(black_box("2d8")).map(|e| e.roll()));
    });
}

/// Propagation fan-out for one primary change.
fn bench_propagation(c: &mut Criterion) {
    let mut store = AttributeStore::new();
    let change = store
        .write("vigor", "2", WriteOrigin::User)
        .expect("vigor is in the catalog");
    let propagator = Propagator::new();

    c.bench_function("propagate_vigor", |b| {
        b.iter(|| propagator.react(black_box(&change), black_box(&store)));
    });
}

criterion_group!(
    benches,
    bench_roll_die,
    bench_roll_die_biased_band,
    bench_roll_advantage,
    bench_dread,
    bench_propagation,
);
criterion_main!(benches);
