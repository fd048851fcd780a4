//! Core types and collaborator traits for the Veer driving simulation core.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! fundamental abstractions used throughout the Veer workspace: typed IDs,
//! control signals, error types, and the traits behind which the world
//! representation and kinematic integrators live.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod control;
pub mod error;
pub mod id;
pub mod traits;

pub use control::{Control, SplinePath};
pub use error::{ActionError, StepError};
pub use id::{AgentId, BindingId};
pub use traits::{DynamicsProvider, KinematicsModel, VehicleState, World};
