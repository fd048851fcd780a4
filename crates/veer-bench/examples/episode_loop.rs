//! End-to-end episode loop example.
//!
//! Demonstrates: build config → DrivingEnv → step with actions → read
//! rewards and metrics → reset → staged spline episode.

use veer_bench::reference_env;
use veer_core::Control;
use veer_env::{ActionBatch, DrivingEnv, EnvConfig, OffsetMode, StagedOutcome, Variant};
use veer_test_utils::fixtures::highway_world;
use veer_test_utils::StubProvider;

fn main() {
    println!("=== Veer Episode Loop Example ===\n");

    // --- Episode 1: continuous bicycle variant under full throttle ---
    println!("Episode 1: 4 agents, continuous controls, full throttle");
    let mut env = reference_env(4, 42);
    env.reset();

    let action = ActionBatch::Controls(vec![
        Control {
            steer: 0.0,
            accel: 1.0,
        };
        4
    ]);
    let mut episode_return = 0.0f32;
    for step in 0..200 {
        let outcome = env.step(&action).unwrap();
        let step_reward: f32 = outcome.rewards.iter().sum();
        episode_return += step_reward;

        if step % 25 == 0 || outcome.done {
            println!(
                "  step {:>3}: reward={:>8.4}, completed={}, collided={}, time={:>5}μs",
                outcome.metrics.nsteps,
                step_reward,
                outcome.metrics.completed_total,
                outcome.metrics.collided_total,
                outcome.metrics.total_us,
            );
        }
        if outcome.done {
            break;
        }
    }
    println!("  episode return: {episode_return:.4}\n");

    // --- Episode 2: staged spline protocol ---
    println!("Episode 2: 1 agent, staged spline protocol");
    let config = EnvConfig {
        nagents: 1,
        horizon: 50,
        npoints: 32,
        seed: 7,
        variant: Variant::StagedSpline {
            offsets: OffsetMode::Continuous,
        },
        ..EnvConfig::default()
    };
    let world = highway_world(1, 10.0);
    let mut env = DrivingEnv::new(config, Box::new(world), Box::new(StubProvider)).unwrap();

    let obs = env.reset();
    println!("  reset ratings: {:?}", obs.ratings().unwrap());
    println!(
        "  bind before commit: {} ({})",
        env.binding_id(),
        env.model_name()
    );

    // Stage 0: commit a half-lane lateral offset. No simulated time.
    let outcome = env
        .step_staged(0, &ActionBatch::Scalars(vec![0.5]))
        .unwrap();
    assert!(matches!(outcome, StagedOutcome::Committed(_)));
    println!(
        "  bind after commit:  {} ({}), nsteps={}",
        env.binding_id(),
        env.model_name(),
        env.nsteps()
    );

    // Stage 1: full throttle along the committed path (top table index).
    for _ in 0..50 {
        let outcome = env
            .step_staged(1, &ActionBatch::Indices(vec![24]))
            .unwrap();
        let StagedOutcome::Stepped(outcome) = outcome else {
            unreachable!("stage 1 always steps");
        };
        if outcome.metrics.nsteps % 10 == 0 || outcome.done {
            println!(
                "  step {:>3}: reward={:>8.4}, done={}",
                outcome.metrics.nsteps, outcome.rewards[0], outcome.done
            );
        }
        if outcome.done {
            break;
        }
    }
    println!("\nDone.");
}
