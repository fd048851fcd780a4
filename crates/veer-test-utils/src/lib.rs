//! Test utilities and mock collaborators for Veer development.
//!
//! Provides mock implementations of the core traits ([`World`],
//! [`KinematicsModel`], [`DynamicsProvider`]) and canned scenario
//! fixtures. The mock world integrates a point-mass approximation and
//! reports collisions from an explicit script, so tests control exactly
//! when the collision signal fires.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use veer_core::{Control, DynamicsProvider, KinematicsModel, SplinePath, VehicleState, World};

/// Mock implementation of [`World`].
///
/// Vehicles live on a straight highway: the signed distance to
/// destination is `dest_x - pos_x`. Lidar returns a constant range for
/// every ray. Collisions fire from a script keyed by advance-call
/// index, so `schedule_collision(0, 1)` reports agent 1 colliding on
/// the first `advance` after construction or reset.
pub struct MockWorld {
    states: Vec<VehicleState>,
    spawns: Vec<VehicleState>,
    destinations: Vec<[f32; 2]>,
    spawn_destinations: Vec<[f32; 2]>,
    dimensions: Vec<[f32; 2]>,
    lidar_range: f32,
    dt: f32,
    advance_calls: u32,
    scripted_collisions: Vec<(u32, usize)>,
}

impl MockWorld {
    /// Vehicles at `spawns` heading for `destinations`, at rest, with
    /// the reference 4.48 x 2.2 body.
    pub fn new(spawns: Vec<[f32; 2]>, destinations: Vec<[f32; 2]>) -> Self {
        assert_eq!(spawns.len(), destinations.len());
        let states: Vec<VehicleState> = spawns
            .iter()
            .map(|&position| VehicleState {
                position,
                orientation: 0.0,
                speed: 0.0,
            })
            .collect();
        Self {
            spawns: states.clone(),
            states,
            spawn_destinations: destinations.clone(),
            destinations,
            dimensions: vec![[4.48, 2.2]; spawns.len()],
            lidar_range: 50.0,
            dt: 0.04,
            advance_calls: 0,
            scripted_collisions: Vec::new(),
        }
    }

    /// Constant range every lidar ray reports (default 50.0).
    pub fn set_lidar_range(&mut self, range: f32) {
        self.lidar_range = range;
    }

    /// Integration sub-step length (default 0.04).
    pub fn set_dt(&mut self, dt: f32) {
        self.dt = dt;
    }

    /// Report `agent` as colliding on the `call`-th advance (0-based,
    /// counted from construction or the last reset).
    pub fn schedule_collision(&mut self, call: u32, agent: usize) {
        self.scripted_collisions.push((call, agent));
    }

    /// Number of `advance` calls since construction or the last reset.
    pub fn advance_calls(&self) -> u32 {
        self.advance_calls
    }

    /// Current position of one vehicle, for test assertions.
    pub fn position_of(&self, agent: usize) -> [f32; 2] {
        self.states[agent].position
    }

    /// Current speed of one vehicle, for test assertions.
    pub fn speed_of(&self, agent: usize) -> f32 {
        self.states[agent].speed
    }

    /// Current destination of one vehicle, for test assertions.
    pub fn destination_of(&self, agent: usize) -> [f32; 2] {
        self.destinations[agent]
    }
}

impl World for MockWorld {
    fn agent_count(&self) -> usize {
        self.states.len()
    }

    fn positions(&self, out: &mut [f32]) {
        for (i, state) in self.states.iter().enumerate() {
            out[2 * i] = state.position[0];
            out[2 * i + 1] = state.position[1];
        }
    }

    fn speeds(&self, out: &mut [f32]) {
        for (i, state) in self.states.iter().enumerate() {
            out[i] = state.speed;
        }
    }

    fn distances_to_destination(&self, out: &mut [f32]) {
        for (i, state) in self.states.iter().enumerate() {
            out[i] = self.destinations[i][0] - state.position[0];
        }
    }

    fn dimensions(&self, out: &mut [f32]) {
        for (i, dims) in self.dimensions.iter().enumerate() {
            out[2 * i] = dims[0];
            out[2 * i + 1] = dims[1];
        }
    }

    fn lidar_scan(&self, n_rays: usize, out: &mut [f32]) {
        out[..n_rays * self.states.len()].fill(self.lidar_range);
    }

    fn freeze_destinations(&mut self, mask: &[bool]) {
        for (i, &frozen) in mask.iter().enumerate() {
            if frozen {
                self.destinations[i] = self.states[i].position;
            }
        }
    }

    fn advance(
        &mut self,
        model: &mut dyn KinematicsModel,
        controls: &[Control],
        substeps: u32,
        out_collisions: &mut [bool],
    ) {
        for _ in 0..substeps {
            model.integrate(&mut self.states, controls, self.dt);
        }
        out_collisions.fill(false);
        for &(call, agent) in &self.scripted_collisions {
            if call == self.advance_calls {
                out_collisions[agent] = true;
            }
        }
        self.advance_calls += 1;
    }

    fn reset(&mut self) {
        self.states = self.spawns.clone();
        self.destinations = self.spawn_destinations.clone();
        self.advance_calls = 0;
    }
}

/// Point-mass stand-in for the bicycle integrator.
///
/// Steering turns the heading directly; acceleration integrates into a
/// speed clamped to the per-agent velocity limit.
pub struct LineModel {
    velocity_limits: Vec<f32>,
}

impl LineModel {
    pub fn new(velocity_limits: Vec<f32>) -> Self {
        Self { velocity_limits }
    }
}

impl KinematicsModel for LineModel {
    fn name(&self) -> &str {
        "line"
    }

    fn velocity_limits(&self) -> &[f32] {
        &self.velocity_limits
    }

    fn integrate(&mut self, states: &mut [VehicleState], controls: &[Control], dt: f32) {
        for (i, state) in states.iter_mut().enumerate() {
            let limit = self.velocity_limits[i];
            state.orientation += controls[i].steer * dt;
            state.speed = (state.speed + controls[i].accel * dt).clamp(-limit, limit);
            state.position[0] += state.speed * dt * state.orientation.cos();
            state.position[1] += state.speed * dt * state.orientation.sin();
        }
    }
}

/// Path-following stand-in for the spline integrator.
///
/// Drives each vehicle straight toward its path's forward endpoint,
/// ignoring steering, with the same clamped speed integration as
/// [`LineModel`].
pub struct PathModel {
    paths: Vec<SplinePath>,
    velocity_limits: Vec<f32>,
}

impl PathModel {
    pub fn new(paths: Vec<SplinePath>, velocity_limits: Vec<f32>) -> Self {
        Self {
            paths,
            velocity_limits,
        }
    }

    /// The committed path for one agent, for test assertions.
    pub fn path_of(&self, agent: usize) -> &SplinePath {
        &self.paths[agent]
    }
}

impl KinematicsModel for PathModel {
    fn name(&self) -> &str {
        "path"
    }

    fn velocity_limits(&self) -> &[f32] {
        &self.velocity_limits
    }

    fn integrate(&mut self, states: &mut [VehicleState], controls: &[Control], dt: f32) {
        for (i, state) in states.iter_mut().enumerate() {
            let limit = self.velocity_limits[i];
            state.speed = (state.speed + controls[i].accel * dt).clamp(-limit, limit);

            let target = self.paths[i][2];
            let dx = target[0] - state.position[0];
            let dy = target[1] - state.position[1];
            let norm = (dx * dx + dy * dy).sqrt();
            if norm > f32::EPSILON {
                state.orientation = dy.atan2(dx);
                state.position[0] += state.speed * dt * dx / norm;
                state.position[1] += state.speed * dt * dy / norm;
            }
        }
    }
}

/// [`DynamicsProvider`] producing [`LineModel`] and [`PathModel`].
#[derive(Default)]
pub struct StubProvider;

impl DynamicsProvider for StubProvider {
    fn bicycle(&self, _dimensions: &[f32], velocity_limits: &[f32]) -> Box<dyn KinematicsModel> {
        Box::new(LineModel::new(velocity_limits.to_vec()))
    }

    fn spline(&self, paths: &[SplinePath], velocity_limits: &[f32]) -> Box<dyn KinematicsModel> {
        Box::new(PathModel::new(paths.to_vec(), velocity_limits.to_vec()))
    }
}
