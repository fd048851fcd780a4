//! Veer: the per-step simulation core of a multi-agent driving RL
//! environment.
//!
//! This is the top-level facade crate that re-exports the public API
//! from the Veer sub-crates. For most users, adding `veer` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```ignore
//! use veer::prelude::*;
//!
//! // World and DynamicsProvider implementations come from your
//! // physics layer (or veer-test-utils in tests).
//! let config = EnvConfig {
//!     nagents: 4,
//!     horizon: 200,
//!     ..EnvConfig::default()
//! };
//! let mut env = DrivingEnv::new(config, world, provider)?;
//! let mut obs = env.reset();
//! loop {
//!     let outcome = env.step(&policy(&obs))?;
//!     obs = outcome.observation;
//!     if outcome.done {
//!         break;
//!     }
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `veer-core` | IDs, controls, error types, collaborator traits |
//! | [`env`] | `veer-env` | The environment, resolvers, reward engine, spaces |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`veer-core`).
///
/// Contains the [`types::World`], [`types::KinematicsModel`], and
/// [`types::DynamicsProvider`] collaborator traits plus the error
/// enums.
pub use veer_core as types;

/// The simulation core (`veer-env`).
///
/// [`env::DrivingEnv`] is the main entry point; the component modules
/// (episode state, history, observation, reward, action, dynamics) are
/// public for direct use.
pub use veer_env as env;

/// Common imports for typical Veer usage.
///
/// ```rust
/// use veer::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use veer_core::{
        ActionError, AgentId, BindingId, Control, DynamicsProvider, KinematicsModel, SplinePath,
        StepError, VehicleState, World,
    };

    // Environment
    pub use veer_env::{
        ActionBatch, ConfigError, DrivingEnv, EnvConfig, Frame, Observation, OffsetMode,
        SpaceSpec, SplineStage, StagedOutcome, StepMetrics, StepOutcome, Variant,
    };
}
