//! Criterion micro-benchmarks for individual step components.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use veer_env::{EpisodeState, HistoryBuffer, RewardEngine};

/// Benchmark: one reward pass over a 64-agent batch with no fresh
/// events, so the episode flags stay stable across iterations.
fn bench_reward_engine(c: &mut Criterion) {
    let nagents = 64;
    let mut episode = EpisodeState::new(&vec![170.0; nagents], 200);
    let mut engine = RewardEngine::new(nagents, 200);
    let distances = vec![120.0; nagents];
    let speeds = vec![8.0; nagents];
    let collisions = vec![false; nagents];
    let mut rewards = vec![0.0; nagents];

    c.bench_function("reward_64_agents", |b| {
        b.iter(|| {
            engine.compute(
                &mut episode,
                black_box(&distances),
                black_box(&speeds),
                black_box(&collisions),
                &mut rewards,
            );
            black_box(rewards[0])
        });
    });
}

/// Benchmark: history push plus grouped read at the stress profile's
/// lidar width (64 agents x 720 rays, depth 10).
fn bench_history_ring(c: &mut Criterion) {
    let nagents = 64;
    let npoints = 720;
    let mut buffer = HistoryBuffer::new(10, nagents * npoints);
    let frame = vec![0.5; nagents * npoints];
    let mut out = Vec::new();

    c.bench_function("history_push_read_64x720", |b| {
        b.iter(|| {
            buffer.push(black_box(&frame));
            buffer.read_grouped(nagents, &mut out);
            black_box(out.len())
        });
    });
}

criterion_group!(benches, bench_reward_engine, bench_history_ring);
criterion_main!(benches);
