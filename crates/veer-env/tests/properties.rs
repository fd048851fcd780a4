//! Property tests over episode invariants and table round-trips.

use proptest::prelude::*;

use veer_core::Control;
use veer_env::{ActionBatch, ActionTable, DrivingEnv, EnvConfig, OffsetTable};
use veer_test_utils::fixtures::highway_world;
use veer_test_utils::StubProvider;

fn test_env(nagents: usize, schedule: &[(u32, usize)]) -> DrivingEnv {
    let mut world = highway_world(nagents, 10.0);
    for &(call, agent) in schedule {
        world.schedule_collision(call, agent);
    }
    let config = EnvConfig {
        nagents,
        horizon: 10,
        npoints: 8,
        seed: 7,
        ..EnvConfig::default()
    };
    DrivingEnv::new(config, Box::new(world), Box::new(StubProvider)).unwrap()
}

fn arb_schedule() -> impl Strategy<Value = Vec<(u32, usize)>> {
    prop::collection::vec((0u32..10, 0usize..3), 0..8)
}

fn arb_controls() -> impl Strategy<Value = Vec<Control>> {
    prop::collection::vec(
        (-0.1f32..0.1, -1.0f32..1.0).prop_map(|(steer, accel)| Control { steer, accel }),
        3,
    )
}

proptest! {
    /// The collision and completion vectors are bitwise non-decreasing
    /// across every step, whatever the collision schedule and actions.
    #[test]
    fn flags_are_monotone_non_decreasing(
        schedule in arb_schedule(),
        actions in prop::collection::vec(arb_controls(), 10),
    ) {
        let mut env = test_env(3, &schedule);
        env.reset();

        let mut collided = env.collided().to_vec();
        let mut completed = env.completed().to_vec();
        for controls in actions {
            let outcome = env.step(&ActionBatch::Controls(controls)).unwrap();

            for i in 0..3 {
                prop_assert!(!collided[i] || env.collided()[i], "collision flag cleared");
                prop_assert!(!completed[i] || env.completed()[i], "completion flag cleared");
            }
            collided = env.collided().to_vec();
            completed = env.completed().to_vec();

            if outcome.done {
                break;
            }
        }
    }

    /// The collision penalty lands on at most one step per agent: the
    /// plain distance term never dips below -0.1, the penalty always
    /// costs at least -1, so penalized steps are separable by reward.
    #[test]
    fn collision_penalty_is_charged_at_most_once(
        schedule in arb_schedule(),
        actions in prop::collection::vec(arb_controls(), 10),
    ) {
        let mut env = test_env(3, &schedule);
        env.reset();

        let mut penalized = [0u32; 3];
        for controls in actions {
            let outcome = env.step(&ActionBatch::Controls(controls)).unwrap();
            for i in 0..3 {
                if outcome.rewards[i] <= -0.9 {
                    penalized[i] += 1;
                }
            }
            if outcome.done {
                break;
            }
        }
        for count in penalized {
            prop_assert!(count <= 1, "penalty charged {count} times");
        }
    }

    /// Re-quantizing any resolved table entry yields the same index,
    /// and quantization is idempotent for arbitrary controls.
    #[test]
    fn table_quantization_round_trips(steer in -0.2f32..0.2, accel in -1.5f32..1.5) {
        let table = ActionTable::steering_accel(0.1, 0.05, 0.25);
        let index = table.quantize(Control { steer, accel });
        let entry = table.resolve(index).unwrap();
        prop_assert_eq!(table.quantize(entry), index);
    }

    /// Same round-trip for the scalar offset table.
    #[test]
    fn offset_quantization_round_trips(offset in -1.0f32..1.0) {
        let table = OffsetTable::new(0.75, 0.25);
        let index = table.quantize(offset);
        let value = table.resolve(index).unwrap();
        prop_assert_eq!(table.quantize(value), index);
    }

    /// Observation shapes depend only on the configuration, never on
    /// the step index.
    #[test]
    fn observation_shape_is_step_invariant(steps in 1usize..12) {
        let mut env = test_env(3, &[]);
        env.reset();
        let expected_state = 3 * 4 * 5;
        let expected_lidar = 3 * 8 * 5;
        for _ in 0..steps {
            let outcome = env
                .step(&ActionBatch::Controls(vec![Control::default(); 3]))
                .unwrap();
            let frame = outcome.observation.frame().unwrap();
            prop_assert_eq!(frame.state.len(), expected_state);
            prop_assert_eq!(frame.lidar.len(), expected_lidar);
            if outcome.done {
                break;
            }
        }
    }
}
