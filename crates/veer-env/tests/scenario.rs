//! End-to-end scenarios driving [`DrivingEnv`] against the mock world.

use veer_core::{ActionError, Control, StepError};
use veer_env::{
    ActionBatch, DrivingEnv, EnvConfig, OffsetMode, SplineStage, StagedOutcome, Variant,
};
use veer_test_utils::fixtures::{single_agent_highway, two_agent_highway};
use veer_test_utils::{MockWorld, StubProvider};

fn bicycle_config(nagents: usize, horizon: u32) -> EnvConfig {
    EnvConfig {
        nagents,
        horizon,
        npoints: 16,
        seed: 42,
        ..EnvConfig::default()
    }
}

fn spline_config(nagents: usize) -> EnvConfig {
    EnvConfig {
        variant: Variant::StagedSpline {
            offsets: OffsetMode::Continuous,
        },
        ..bicycle_config(nagents, 20)
    }
}

fn zero_controls(nagents: usize) -> ActionBatch {
    ActionBatch::Controls(vec![Control::default(); nagents])
}

fn env(config: EnvConfig, world: MockWorld) -> DrivingEnv {
    DrivingEnv::new(config, Box::new(world), Box::new(StubProvider)).unwrap()
}

// ── Stationary two-agent highway ────────────────────────────────

#[test]
fn stationary_agents_pay_only_the_distance_term() {
    // Two lanes 10 units apart, 170 units to the destination, zero
    // steering and acceleration for the whole horizon.
    let mut env = env(bicycle_config(2, 10), two_agent_highway());
    env.reset();

    for step in 1..=10 {
        let outcome = env.step(&zero_controls(2)).unwrap();

        // No collisions, no goals, ever.
        assert_eq!(env.collided(), &[false, false], "step {step}");
        assert_eq!(env.completed(), &[false, false], "step {step}");
        assert_eq!(outcome.metrics.new_collisions, 0);
        assert_eq!(outcome.metrics.new_completions, 0);

        // Stationary: the normalized distance stays exactly 1, so the
        // reward is the constant distance term -1/horizon.
        for (agent, &reward) in outcome.rewards.iter().enumerate() {
            assert!(
                (reward - (-0.1)).abs() < 1e-6,
                "step {step} agent {agent}: {reward}"
            );
        }

        assert_eq!(outcome.done, step == 10);
        assert_eq!(outcome.metrics.nsteps, step);
    }
}

#[test]
fn binding_is_fixed_for_bicycle_episodes() {
    let mut env = env(bicycle_config(2, 10), two_agent_highway());
    env.reset();
    let binding = env.binding_id();
    for _ in 0..5 {
        env.step(&zero_controls(2)).unwrap();
        assert_eq!(env.binding_id(), binding);
    }
    // A reset replaces the bind.
    env.reset();
    assert_ne!(env.binding_id(), binding);
}

#[test]
fn observation_shape_is_stable() {
    let config = bicycle_config(2, 10);
    let h = config.history_len;
    let npoints = config.npoints;
    let mut env = env(config, two_agent_highway());

    let obs = env.reset();
    let frame = obs.frame().expect("bicycle reset returns a frame");
    assert_eq!(frame.state.len(), 2 * 4 * h);
    assert_eq!(frame.lidar.len(), 2 * npoints * h);

    for _ in 0..10 {
        let outcome = env.step(&zero_controls(2)).unwrap();
        let frame = outcome.observation.frame().unwrap();
        assert_eq!(frame.state.len(), 2 * 4 * h);
        assert_eq!(frame.lidar.len(), 2 * npoints * h);
    }
}

#[test]
fn first_observation_is_primed_replication() {
    let mut env = env(bicycle_config(1, 50), single_agent_highway());
    let obs = env.reset();
    let frame = obs.frame().unwrap();

    // All history blocks replicate the first real observation.
    let h = 5;
    for k in 1..h {
        assert_eq!(frame.state[..4], frame.state[k * 4..(k + 1) * 4]);
    }

    // After an accelerating step the newest block differs.
    let outcome = env
        .step(&ActionBatch::Controls(vec![Control {
            steer: 0.0,
            accel: 1.0,
        }]))
        .unwrap();
    let frame = outcome.observation.frame().unwrap();
    assert_ne!(frame.state[..4], frame.state[(h - 1) * 4..h * 4]);
}

// ── Collision bookkeeping ───────────────────────────────────────

#[test]
fn collision_is_charged_once_and_silences_distance() {
    let mut world = two_agent_highway();
    // Agent 0 collides on the third advance (0-based call index 2).
    world.schedule_collision(2, 0);
    let mut env = env(bicycle_config(2, 10), world);
    env.reset();

    for step in 1..=10 {
        let outcome = env.step(&zero_controls(2)).unwrap();
        match step {
            1 | 2 => {
                assert!((outcome.rewards[0] - (-0.1)).abs() < 1e-6);
                assert_eq!(env.collided(), &[false, false]);
            }
            3 => {
                // Pre-increment step index 2: penalty
                // 1 + 1.0 * (10 - 2 - 1) / 10.
                assert!(
                    (outcome.rewards[0] - (-1.7)).abs() < 1e-6,
                    "step 3 reward: {}",
                    outcome.rewards[0]
                );
                assert_eq!(outcome.metrics.new_collisions, 1);
                assert_eq!(env.collided(), &[true, false]);
            }
            _ => {
                // Already collided: distance term masked, no recharge.
                assert_eq!(outcome.rewards[0], 0.0, "step {step}");
                assert_eq!(outcome.metrics.new_collisions, 0);
                assert_eq!(env.collided(), &[true, false]);
            }
        }
        // The untouched agent keeps paying the plain distance term.
        assert!((outcome.rewards[1] - (-0.1)).abs() < 1e-6);
    }
}

#[test]
fn collision_flags_clear_on_reset() {
    let mut world = two_agent_highway();
    world.schedule_collision(0, 0);
    let mut env = env(bicycle_config(2, 10), world);
    env.reset();
    env.step(&zero_controls(2)).unwrap();
    assert_eq!(env.collided(), &[true, false]);

    env.reset();
    assert_eq!(env.collided(), &[false, false]);
    assert_eq!(env.nsteps(), 0);
}

// ── Goal completion and destination freeze ──────────────────────

#[test]
fn reaching_the_goal_pays_the_bonus_once_and_freezes_the_destination() {
    // Destination 2 units ahead; full throttle covers it in a few steps.
    let world = MockWorld::new(vec![[0.0, 0.0]], vec![[2.0, 0.0]]);
    let mut env = env(bicycle_config(1, 50), world);
    env.reset();

    let throttle = ActionBatch::Controls(vec![Control {
        steer: 0.0,
        accel: 1.0,
    }]);

    let mut bonus_step = None;
    for step in 1..=6 {
        let outcome = env.step(&throttle).unwrap();
        if outcome.metrics.new_completions == 1 {
            bonus_step = Some(step);
            assert!(
                outcome.rewards[0] > 0.5,
                "completion step should be bonus-dominated, got {}",
                outcome.rewards[0]
            );
            break;
        }
    }
    let bonus_step = bonus_step.expect("agent should reach the goal under full throttle");

    // Keep accelerating away from the frozen destination.
    let mut inverse_distances = Vec::new();
    for _ in 0..4 {
        let outcome = env.step(&throttle).unwrap();
        assert_eq!(env.completed(), &[true]);
        assert_eq!(outcome.metrics.new_completions, 0, "no second bonus");
        // Distance term is masked; only the completed-speed drag
        // remains, so the reward is a small negative number.
        assert!(outcome.rewards[0] < 0.0 && outcome.rewards[0] > -0.1);

        let frame = outcome.observation.frame().unwrap();
        inverse_distances.push(frame.state[4 * 4]); // newest block
    }

    // The vehicle drives on while the destination stays frozen, so the
    // observed inverse distance decays below the re-pinned value 1.0.
    assert!(
        inverse_distances.last().unwrap() < &1.0,
        "destination must not follow the vehicle after completion: {inverse_distances:?}"
    );
    assert!(bonus_step >= 2);
}

// ── Staged spline protocol ──────────────────────────────────────

#[test]
fn stage0_rebinds_dynamics_without_advancing_time() {
    let mut env = env(spline_config(1), single_agent_highway());

    let obs = env.reset();
    let ratings = obs.ratings().expect("spline reset returns ratings");
    assert_eq!(ratings, env.accel_ratings());
    assert_eq!(env.spline_stage(), Some(SplineStage::AwaitingPath));
    assert_eq!(env.model_name(), "line");

    let binding_before = env.binding_id();
    let limits_before = env.velocity_limits().to_vec();

    let outcome = env
        .step_staged(0, &ActionBatch::Scalars(vec![0.5]))
        .unwrap();
    let StagedOutcome::Committed(obs) = outcome else {
        panic!("stage 0 must commit, not step");
    };
    assert!(obs.frame().is_some());

    // Fresh binding, same derived limits, no simulated time.
    assert_ne!(env.binding_id(), binding_before);
    assert_eq!(env.velocity_limits(), limits_before.as_slice());
    assert_eq!(env.model_name(), "path");
    assert_eq!(env.nsteps(), 0);
    assert_eq!(env.spline_stage(), Some(SplineStage::PathCommitted));

    // Stage 1 drives along the committed path under the same bind.
    let binding_committed = env.binding_id();
    let outcome = env
        .step_staged(1, &ActionBatch::Indices(vec![12]))
        .unwrap();
    let StagedOutcome::Stepped(outcome) = outcome else {
        panic!("stage 1 must step");
    };
    assert_eq!(env.nsteps(), 1);
    assert_eq!(env.binding_id(), binding_committed);
    assert_eq!(env.velocity_limits(), limits_before.as_slice());
    assert!(!outcome.done);
}

#[test]
fn spline_state_stream_drops_the_rating_features() {
    let config = spline_config(1);
    let h = config.history_len;
    let npoints = config.npoints;
    let mut env = env(config, single_agent_highway());
    env.reset();

    let outcome = env
        .step_staged(0, &ActionBatch::Scalars(vec![0.0]))
        .unwrap();
    let StagedOutcome::Committed(obs) = outcome else {
        panic!("stage 0 must commit");
    };
    let frame = obs.frame().unwrap();
    assert_eq!(frame.state.len(), 2 * h);
    assert_eq!(frame.lidar.len(), npoints * h);
}

#[test]
fn stage0_recommit_replaces_the_bind() {
    let mut env = env(spline_config(1), single_agent_highway());
    env.reset();
    env.step_staged(0, &ActionBatch::Scalars(vec![0.5]))
        .unwrap();
    let first = env.binding_id();

    env.step_staged(0, &ActionBatch::Scalars(vec![-0.5]))
        .unwrap();
    assert_ne!(env.binding_id(), first);
    assert_eq!(env.spline_stage(), Some(SplineStage::PathCommitted));
    assert_eq!(env.nsteps(), 0);
}

#[test]
fn stage1_before_stage0_fails_fast() {
    let mut env = env(spline_config(1), single_agent_highway());
    env.reset();
    let err = env
        .step_staged(1, &ActionBatch::Indices(vec![0]))
        .unwrap_err();
    assert_eq!(err, StepError::PathNotCommitted);
}

#[test]
fn stage_machine_returns_to_awaiting_on_reset() {
    let mut env = env(spline_config(1), single_agent_highway());
    env.reset();
    env.step_staged(0, &ActionBatch::Scalars(vec![0.25]))
        .unwrap();
    assert_eq!(env.spline_stage(), Some(SplineStage::PathCommitted));

    env.reset();
    assert_eq!(env.spline_stage(), Some(SplineStage::AwaitingPath));
    let err = env
        .step_staged(1, &ActionBatch::Indices(vec![0]))
        .unwrap_err();
    assert_eq!(err, StepError::PathNotCommitted);
}

#[test]
fn invalid_stage_fails_fast() {
    let mut env = env(spline_config(1), single_agent_highway());
    env.reset();
    let err = env
        .step_staged(2, &ActionBatch::Scalars(vec![0.0]))
        .unwrap_err();
    assert_eq!(err, StepError::InvalidStage { got: 2 });
}

#[test]
fn entry_points_are_variant_checked() {
    let mut staged = env(spline_config(1), single_agent_highway());
    staged.reset();
    assert_eq!(
        staged.step(&zero_controls(1)).unwrap_err(),
        StepError::StageRequired
    );

    let mut unstaged = env(bicycle_config(1, 10), single_agent_highway());
    unstaged.reset();
    assert_eq!(
        unstaged
            .step_staged(0, &ActionBatch::Scalars(vec![0.0]))
            .unwrap_err(),
        StepError::StageNotSupported
    );
}

#[test]
fn wrong_agent_count_is_a_contract_violation() {
    let mut env = env(bicycle_config(2, 10), two_agent_highway());
    env.reset();
    let err = env.step(&zero_controls(1)).unwrap_err();
    assert_eq!(
        err,
        StepError::Action(ActionError::WrongAgentCount {
            expected: 2,
            got: 1
        })
    );
}

// ── Determinism ─────────────────────────────────────────────────

#[test]
fn fixed_seed_replays_exactly() {
    let make = || {
        let mut e = env(bicycle_config(2, 10), two_agent_highway());
        let obs = e.reset();
        (e, obs)
    };
    let (mut a, obs_a) = make();
    let (mut b, obs_b) = make();

    assert_eq!(a.accel_ratings(), b.accel_ratings());
    assert_eq!(a.vel_ratings(), b.vel_ratings());
    assert_eq!(obs_a, obs_b);

    let action = ActionBatch::Controls(vec![
        Control {
            steer: 0.05,
            accel: 0.5,
        },
        Control {
            steer: -0.05,
            accel: 1.0,
        },
    ]);
    for _ in 0..5 {
        let out_a = a.step(&action).unwrap();
        let out_b = b.step(&action).unwrap();
        assert_eq!(out_a.rewards, out_b.rewards);
        assert_eq!(out_a.observation, out_b.observation);
    }
}

#[test]
fn different_seeds_draw_different_ratings() {
    let mut a = env(bicycle_config(2, 10), two_agent_highway());
    let mut b = env(
        EnvConfig {
            seed: 1234,
            ..bicycle_config(2, 10)
        },
        two_agent_highway(),
    );
    a.reset();
    b.reset();
    assert_ne!(a.accel_ratings(), b.accel_ratings());
}

#[test]
fn ratings_are_redrawn_each_episode_within_range() {
    let mut env = env(bicycle_config(2, 10), two_agent_highway());
    let mut previous: Option<Vec<f32>> = None;
    for _ in 0..5 {
        env.reset();
        let ratings = env.accel_ratings().to_vec();
        assert!(ratings.iter().all(|r| (0.5..1.0).contains(r)));
        if let Some(prev) = previous {
            assert_ne!(prev, ratings);
        }
        previous = Some(ratings);
    }
}

// ── Lidar dropout ───────────────────────────────────────────────

#[test]
fn full_lidar_noise_blanks_the_scan() {
    let config = EnvConfig {
        lidar_noise: 1.0,
        ..bicycle_config(1, 10)
    };
    let mut env = env(config, single_agent_highway());
    let obs = env.reset();
    assert!(obs.frame().unwrap().lidar.iter().all(|&v| v == 0.0));
}

#[test]
fn zero_lidar_noise_keeps_reciprocal_ranges() {
    let mut world = single_agent_highway();
    world.set_lidar_range(25.0);
    let mut env = env(bicycle_config(1, 10), world);
    let obs = env.reset();
    assert!(obs.frame().unwrap().lidar.iter().all(|&v| v == 0.04));
}
