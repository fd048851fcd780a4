//! Per-step simulation core for multi-agent driving RL environments.
//!
//! Turns raw vehicle kinematic state into history-stacked observations,
//! computes shaped rewards under persistent collision/goal bookkeeping,
//! resolves hybrid discrete/continuous actions into physical controls,
//! and switches the active vehicle dynamics model mid-episode via the
//! staged spline protocol.
//!
//! # Per-step pipeline
//!
//! 1. [`action`] — resolve the agent action batch into
//!    [`Control`](veer_core::Control)s
//! 2. the [`World`](veer_core::World) collaborator advances physics
//!    through the bound [`dynamics`] model
//! 3. [`reward`] — compute shaped rewards, update [`episode`] flags
//! 4. [`obs`] — assemble the observation through [`history`] buffers

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod action;
pub mod config;
pub mod dynamics;
pub mod env;
pub mod episode;
pub mod history;
pub mod metrics;
pub mod obs;
pub mod reward;
pub mod spaces;

pub use action::{ActionBatch, ActionTable, OffsetTable, Resolver, SplineStage};
pub use config::{ConfigError, EnvConfig, OffsetMode, Variant};
pub use dynamics::DynamicsBinder;
pub use env::{DrivingEnv, StagedOutcome, StepOutcome};
pub use episode::EpisodeState;
pub use history::HistoryBuffer;
pub use metrics::StepMetrics;
pub use obs::{Frame, Observation, ObservationBuilder};
pub use reward::RewardEngine;
pub use spaces::SpaceSpec;
