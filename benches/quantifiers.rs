//! Benchmarks for quantifier aggregation, with and without guards.

use candle_core::{Device, Tensor};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ltn::{AggregMin, AggregPMeanError, Domain, Grounding, Mask, Quantifier, QuantifierOptions, Variable};

fn setup(size: usize, device: &Device) -> (Variable, Variable, Grounding) {
    let domain = Domain::scalar("n");
    let x = Variable::new("x", &domain, Tensor::arange(0f32, size as f32, device).unwrap()).unwrap();
    let y = Variable::new("y", &domain, Tensor::arange(0f32, size as f32, device).unwrap()).unwrap();
    let truth = Tensor::rand(0.0f32, 1.0, (size, size), device).unwrap();
    let formula = Grounding::new(truth, vec!["x".into(), "y".into()]).unwrap();
    (x, y, formula)
}

fn bench_forall(c: &mut Criterion) {
    let device = Device::Cpu;
    let mut group = c.benchmark_group("forall");
    let pmean = Quantifier::forall(AggregPMeanError::default());
    let min = Quantifier::forall(AggregMin);

    for size in [32, 128, 512].iter() {
        let (x, y, formula) = setup(*size, &device);

        group.bench_with_input(BenchmarkId::new("pmean_error", size), &formula, |bench, f| {
            bench.iter(|| pmean.apply(&[&x, &y], f).unwrap());
        });

        group.bench_with_input(BenchmarkId::new("min_inner", size), &formula, |bench, f| {
            bench.iter(|| min.apply(&[&y], f).unwrap());
        });
    }
    group.finish();
}

fn bench_guarded(c: &mut Criterion) {
    let device = Device::Cpu;
    let mut group = c.benchmark_group("guarded_forall");
    let forall = Quantifier::forall(AggregPMeanError::default());

    for size in [32, 128, 512].iter() {
        let (x, y, formula) = setup(*size, &device);

        group.bench_with_input(BenchmarkId::new("lower_triangle", size), &formula, |bench, f| {
            bench.iter(|| {
                let mask = Mask::new(&[x.grounding(), y.grounding()], |v: &[Tensor]| v[0].gt(&v[1]));
                forall
                    .apply_with(&[&x, &y], f, QuantifierOptions::default().with_mask(mask))
                    .unwrap()
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_forall, bench_guarded);
criterion_main!(benches);
