//! Criterion micro-benchmarks for the step pipeline.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use veer_bench::{reference_env, stress_env};
use veer_core::Control;
use veer_env::ActionBatch;

/// Benchmark: full step over the default 4-agent highway profile.
fn bench_step_reference(c: &mut Criterion) {
    let mut env = reference_env(4, 42);
    env.reset();
    let action = ActionBatch::Controls(vec![
        Control {
            steer: 0.02,
            accel: 0.5,
        };
        4
    ]);

    c.bench_function("step_reference_4_agents", |b| {
        b.iter(|| {
            let outcome = env.step(black_box(&action)).unwrap();
            if outcome.done {
                env.reset();
            }
            black_box(outcome.rewards.len())
        });
    });
}

/// Benchmark: full step over the 64-agent stress profile (720 rays,
/// history depth 10).
fn bench_step_stress(c: &mut Criterion) {
    let mut env = stress_env(42);
    env.reset();
    let action = ActionBatch::Controls(vec![Control::default(); 64]);

    c.bench_function("step_stress_64_agents", |b| {
        b.iter(|| {
            let outcome = env.step(black_box(&action)).unwrap();
            if outcome.done {
                env.reset();
            }
            black_box(outcome.rewards.len())
        });
    });
}

/// Benchmark: reset cost (ratings, bind, histories) on the stress
/// profile.
fn bench_reset_stress(c: &mut Criterion) {
    let mut env = stress_env(42);
    c.bench_function("reset_stress_64_agents", |b| {
        b.iter(|| {
            let obs = env.reset();
            black_box(obs.frame().map(|f| f.state.len()))
        });
    });
}

criterion_group!(
    benches,
    bench_step_reference,
    bench_step_stress,
    bench_reset_stress
);
criterion_main!(benches);
