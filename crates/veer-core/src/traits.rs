//! Collaborator traits: the world representation and kinematic integrators.
//!
//! The simulation core consumes the road world, lidar casting, collision
//! checking, and the bicycle/spline integrators as opaque services. These
//! traits are the whole contract; concrete implementations live outside
//! this workspace (mocks for testing live in `veer-test-utils`).
//!
//! Read methods use fill-buffer signatures so the environment can reuse
//! its scratch allocations every step instead of collecting fresh vectors.

use crate::control::{Control, SplinePath};

/// One vehicle's mutable kinematic state during integration.
///
/// The world owns the authoritative vehicle state; it exposes this view
/// to the bound [`KinematicsModel`] for the duration of one
/// [`World::advance`] call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VehicleState {
    /// Position in world coordinates.
    pub position: [f32; 2],
    /// Heading in radians.
    pub orientation: f32,
    /// Signed longitudinal speed.
    pub speed: f32,
}

/// The road world: vehicle state, lidar, and collision primitives.
///
/// All per-agent buffers are dense and agent-major: row `i` belongs to
/// [`AgentId(i)`](crate::AgentId). Buffer lengths are the caller's
/// responsibility; a wrong-length buffer is a caller bug and
/// implementations are free to panic on it.
pub trait World: Send {
    /// Number of vehicles in the world.
    fn agent_count(&self) -> usize;

    /// Fill `out` with positions as flattened `[x, y]` pairs.
    ///
    /// `out.len()` must be `2 * agent_count()`.
    fn positions(&self, out: &mut [f32]);

    /// Fill `out` with per-agent signed longitudinal speeds.
    fn speeds(&self, out: &mut [f32]);

    /// Fill `out` with per-agent signed along-track distances to the
    /// destination. A value `<= 0` means the destination is reached.
    fn distances_to_destination(&self, out: &mut [f32]);

    /// Fill `out` with vehicle dimensions as flattened
    /// `[length, width]` pairs.
    fn dimensions(&self, out: &mut [f32]);

    /// Fill `out` with a lidar scan: `n_rays` ray distances per agent,
    /// agent-major. Distances are strictly positive (no-hit rays report
    /// the maximum range).
    ///
    /// `out.len()` must be `n_rays * agent_count()`.
    fn lidar_scan(&self, n_rays: usize, out: &mut [f32]);

    /// Set `destination := current position` for every flagged agent.
    ///
    /// The environment flags each agent exactly once, on the step its
    /// completion first flips, so a frozen destination never moves
    /// again.
    fn freeze_destinations(&mut self, mask: &[bool]);

    /// Advance physics by one environment step: integrate `substeps`
    /// sub-intervals of the bound model with the given per-agent
    /// controls, run collision checks, and fill `out_collisions` with
    /// the fresh per-agent collision signal for this step.
    ///
    /// The signal is raw: it may stay `true` for a vehicle that remains
    /// in contact. Deduplication against already-collided agents is the
    /// caller's concern.
    fn advance(
        &mut self,
        model: &mut dyn KinematicsModel,
        controls: &[Control],
        substeps: u32,
        out_collisions: &mut [bool],
    );

    /// Re-seat vehicles at their spawn poses for a new episode.
    fn reset(&mut self);
}

/// A batched vehicle kinematics integrator.
///
/// Implementations are opaque to the simulation core: a bicycle model, a
/// spline-following model, or a test double. The model owns its velocity
/// limits for the lifetime of one bind.
pub trait KinematicsModel: Send {
    /// Human-readable name for diagnostics.
    fn name(&self) -> &str;

    /// Per-agent velocity limits, dense and agent-major.
    fn velocity_limits(&self) -> &[f32];

    /// Integrate one sub-interval of length `dt` for the whole batch,
    /// mutating `states` in place.
    fn integrate(&mut self, states: &mut [VehicleState], controls: &[Control], dt: f32);
}

/// Factory for kinematics models, so the core never names a concrete
/// integrator.
///
/// The environment binds a bicycle model at every episode reset and, for
/// staged spline variants, a spline model at stage-0 path commitment.
pub trait DynamicsProvider: Send {
    /// Build a bicycle kinematics model.
    ///
    /// `dimensions` is flattened `[length, width]` pairs;
    /// `velocity_limits` is one limit per agent.
    fn bicycle(&self, dimensions: &[f32], velocity_limits: &[f32]) -> Box<dyn KinematicsModel>;

    /// Build a spline-following kinematics model over committed paths,
    /// one path per agent.
    fn spline(&self, paths: &[SplinePath], velocity_limits: &[f32]) -> Box<dyn KinematicsModel>;
}
