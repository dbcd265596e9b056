//! Benchmarks for formula formatting and identity decoding

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use prism_core::{EntityId, Formula, Magnitude};
use prism_visual::{format_formula, formula_label, VisualIdentity};

fn bench_format_small(c: &mut Criterion) {
    let x = Magnitude::from_u64(0x0105);
    let y = Magnitude::from_u64(2);

    c.bench_function("format_formula_small", |b| {
        b.iter(|| black_box(format_formula(black_box(&x), black_box(&y))))
    });
}

fn bench_format_full_width(c: &mut Criterion) {
    // Widest operands a CreateFormula command can carry
    let formula = Formula::new((1u64 << 53) - 1, u32::MAX);

    c.bench_function("format_formula_full_width", |b| {
        b.iter(|| black_box(formula_label(black_box(&formula))))
    });
}

fn bench_format_sparse(c: &mut Criterion) {
    let formula = Formula::new(
        Magnitude::from_be_bytes(vec![7, 0, 0, 0, 0, 0, 0, 1]),
        Magnitude::zero(),
    );

    c.bench_function("format_formula_sparse", |b| {
        b.iter(|| black_box(formula_label(black_box(&formula))))
    });
}

fn bench_identity_decode(c: &mut Criterion) {
    let id = EntityId::new(vec![0xab; 32]).unwrap();

    c.bench_function("identity_decode", |b| {
        b.iter(|| black_box(VisualIdentity::decode(black_box(&id))))
    });
}

criterion_group!(
    benches,
    bench_format_small,
    bench_format_full_width,
    bench_format_sparse,
    bench_identity_decode,
);
criterion_main!(benches);
