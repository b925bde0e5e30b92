//! Criterion benchmarks for u-eqsearch.
//!
//! Measures gene generation, formula evaluation, and short engine runs on
//! equations with an unreachable target so every run uses its full budget.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use u_eqsearch::ga::{GaConfig, GaRunner};
use u_eqsearch::random::create_rng;
use u_eqsearch::search::{generate_value, EquationChromosome, SearchConfig, SearchSpace};

const EQUATIONS: [(&str, &str); 3] = [
    ("linear", "2*a + 3*b - c = 1000000"),
    ("power", "6a^0.75 - 3b + 3c - 12d = 25000"),
    ("calls", "sqrt(abs(a)) + log(abs(b) + 1) * sin(c) = 1000"),
];

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_generate_value(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_value");

    for float_ratio in [0.0, 0.5, 1.0] {
        let config = SearchConfig::default().with_float_ratio(float_ratio);
        group.bench_with_input(
            BenchmarkId::from_parameter(float_ratio),
            &config,
            |b, config| {
                let mut rng = create_rng(42);
                b.iter(|| generate_value(black_box(config), &mut rng))
            },
        );
    }
    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");

    for (name, equation) in EQUATIONS {
        let space = SearchSpace::parse(equation, SearchConfig::default()).unwrap();
        let mut rng = create_rng(42);
        let individuals: Vec<EquationChromosome> = (0..1000)
            .map(|_| EquationChromosome::random(&space, &mut rng))
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(name), &individuals, |b, inds| {
            b.iter(|| {
                inds.iter()
                    .map(|ind| space.binding().residual(black_box(ind.assignment())))
                    .filter(Result::is_ok)
                    .count()
            })
        });
    }
    group.finish();
}

fn bench_ga_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("ga_run");
    group.sample_size(10);

    for (name, equation) in EQUATIONS {
        let space: Arc<SearchSpace> =
            SearchSpace::parse(equation, SearchConfig::default()).unwrap();
        let config = GaConfig {
            population_size: 1000,
            max_generations: 20,
            crossover_rate: 0.2,
            mutation_rate: 0.15,
            seed: Some(42),
            ..GaConfig::default()
        };
        group.bench_with_input(
            BenchmarkId::from_parameter(name),
            &(space, config),
            |b, (s, c)| {
                b.iter(|| {
                    let result = GaRunner::run::<EquationChromosome>(black_box(s), black_box(c));
                    black_box(result)
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_generate_value, bench_evaluate, bench_ga_run);
criterion_main!(benches);
