//! Benchmark profiles for the Veer simulation core.
//!
//! Provides pre-built environment constructors over the mock world so
//! benches exercise the resolve → advance → reward → observe pipeline
//! without a real physics backend.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use veer_env::{DrivingEnv, EnvConfig};
use veer_test_utils::fixtures::highway_world;
use veer_test_utils::StubProvider;

/// Reference profile: the default highway configuration over the mock
/// world, deterministic via `seed`.
pub fn reference_env(nagents: usize, seed: u64) -> DrivingEnv {
    let config = EnvConfig {
        nagents,
        seed,
        ..EnvConfig::default()
    };
    let world = highway_world(nagents, 10.0);
    DrivingEnv::new(config, Box::new(world), Box::new(StubProvider))
        .expect("reference profile must validate")
}

/// Stress profile: a wide batch with a long lidar scan and deep
/// history.
pub fn stress_env(seed: u64) -> DrivingEnv {
    let config = EnvConfig {
        nagents: 64,
        npoints: 720,
        history_len: 10,
        seed,
        ..EnvConfig::default()
    };
    let world = highway_world(64, 5.0);
    DrivingEnv::new(config, Box::new(world), Box::new(StubProvider))
        .expect("stress profile must validate")
}
