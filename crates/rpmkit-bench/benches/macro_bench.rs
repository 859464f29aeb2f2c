//! Macro expansion benchmarks: single-pass `expand()` cost as macro
//! nesting depth grows (`%m0` expands to `%m1`, which expands to
//! `%m2`, ...).

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rpmkit_macro::{level, MacroContext};

fn context_with_chain(depth: usize) -> MacroContext {
    let mut ctx = MacroContext::new();
    for i in 0..depth {
        let body = if i + 1 == depth { "leaf".to_string() } else { format!("%m{}", i + 1) };
        ctx.define(&format!("m{i}"), body.as_bytes(), level::SPEC_FILE);
    }
    ctx
}

fn bench_nested_expansion(c: &mut Criterion) {
    let depths: &[usize] = &[1, 4, 16, 64];
    let mut group = c.benchmark_group("macro_expand_chain");

    for &depth in depths {
        group.bench_with_input(BenchmarkId::new("depth", depth), &depth, |b, &depth| {
            b.iter_batched(
                || context_with_chain(depth),
                |mut ctx| {
                    let mut buf = b"%m0".to_vec();
                    ctx.expand(&mut buf).unwrap();
                    black_box(buf);
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_flat_text(c: &mut Criterion) {
    let sizes: &[usize] = &[64, 1024, 16384];
    let mut group = c.benchmark_group("macro_expand_literal");

    for &size in sizes {
        let text = "x".repeat(size);
        group.bench_with_input(BenchmarkId::new("literal", size), &text, |b, text| {
            b.iter(|| {
                let mut ctx = MacroContext::new();
                let mut buf = text.clone().into_bytes();
                ctx.expand(&mut buf).unwrap();
                black_box(buf);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_nested_expansion, bench_flat_text);
criterion_main!(benches);
