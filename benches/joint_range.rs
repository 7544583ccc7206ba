//! Benchmarks for joint-range reconstruction.
//!
//! Run:
//! - cargo bench --bench joint_range

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use arpra_tools::core::affine::{AffineForm, SymbolSource};
use arpra_tools::core::joint::JointRange;

const TERM_COUNTS: [usize; 4] = [4, 8, 12, 15];

/// Two forms sharing every symbol, with deviations spread around the circle
/// so no generator is parallel to another.
fn build_pair(terms: usize) -> (AffineForm, AffineForm) {
    let mut src = SymbolSource::new();
    let symbols: Vec<u64> = (0..terms).map(|_| src.next_symbol()).collect();
    let angle = |k: usize| std::f64::consts::PI * (k as f64 + 0.5) / terms as f64;
    let x = AffineForm::from_terms(
        -60.0,
        symbols.iter().enumerate().map(|(k, s)| (*s, 0.1 * angle(k).cos())),
    );
    let y = AffineForm::from_terms(
        0.3,
        symbols.iter().enumerate().map(|(k, s)| (*s, 0.01 * angle(k).sin())),
    );
    (x, y)
}

fn bench_hull(c: &mut Criterion) {
    let mut group = c.benchmark_group("joint_range_hull");
    group.sample_size(20);
    for &terms in TERM_COUNTS.iter() {
        let (x, y) = build_pair(terms);
        group.bench_with_input(BenchmarkId::from_parameter(terms), &terms, |b, _| {
            b.iter(|| {
                let joint = JointRange::new(black_box(&x), black_box(&y), 15).unwrap();
                black_box(joint.hull(true));
            });
        });
    }
    group.finish();
}

fn bench_bounding_box(c: &mut Criterion) {
    let (x, y) = build_pair(15);
    c.bench_function("joint_range_box_15", |b| {
        b.iter(|| {
            let joint = JointRange::new(black_box(&x), black_box(&y), 15).unwrap();
            black_box(joint.bounding_box(true));
        });
    });
}

criterion_group!(benches, bench_hull, bench_bounding_box);
criterion_main!(benches);
