//! The lockstep driving environment.
//!
//! [`DrivingEnv`] is the user-facing API for running episodes. Each
//! [`step()`](DrivingEnv::step) (or
//! [`step_staged()`](DrivingEnv::step_staged) for spline variants)
//! resolves the action batch, advances physics through the world
//! collaborator, runs the reward engine against the episode state, and
//! assembles the history-stacked observation.
//!
//! # Ownership model
//!
//! `DrivingEnv` is [`Send`] (can be moved between threads) but drives
//! exactly one episode at a time: all mutating methods take `&mut self`
//! and no state is shared across instances. Episode state, history
//! buffers, ratings, and the dynamics binding are replaced wholesale at
//! every [`reset()`](DrivingEnv::reset).
//!
//! # Determinism
//!
//! Rating draws and lidar dropout come from a ChaCha8 RNG seeded from
//! `config.seed XOR episode_index`, so runs replay exactly for a fixed
//! seed and episodes differ from each other.

use std::time::Instant;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use veer_core::{AgentId, BindingId, Control, DynamicsProvider, SplinePath, StepError, World};

use crate::action::{ActionBatch, Resolver, SplineStage};
use crate::config::{ConfigError, EnvConfig};
use crate::dynamics::DynamicsBinder;
use crate::episode::EpisodeState;
use crate::metrics::StepMetrics;
use crate::obs::{Frame, Observation, ObservationBuilder};
use crate::reward::RewardEngine;
use crate::spaces::{self, SpaceSpec};

// Compile-time assertion: DrivingEnv must be Send.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<DrivingEnv>();
    }
};

// ── Step results ───────────────────────────────────────────────────

/// Result of one successful control step.
#[derive(Clone, Debug)]
pub struct StepOutcome {
    /// The history-stacked observation after this step.
    pub observation: Observation,
    /// Per-agent shaped rewards.
    pub rewards: Vec<f32>,
    /// Whether the episode is over (horizon reached, or every agent
    /// completed or collided).
    pub done: bool,
    /// Timing and event counters for this step.
    pub metrics: StepMetrics,
}

/// Result of one successful staged call.
#[derive(Clone, Debug)]
pub enum StagedOutcome {
    /// Stage 0: the path was committed and dynamics rebound. Carries
    /// an observation; simulated time did not advance.
    Committed(Observation),
    /// Stage 1: an ordinary control step along the committed path.
    Stepped(StepOutcome),
}

// ── Scratch ────────────────────────────────────────────────────────

/// Reusable per-step buffers, allocated once at construction.
struct StepScratch {
    controls: Vec<Control>,
    distances: Vec<f32>,
    speeds: Vec<f32>,
    positions: Vec<f32>,
    dimensions: Vec<f32>,
    lidar: Vec<f32>,
    collisions: Vec<bool>,
    offsets: Vec<f32>,
    rewards: Vec<f32>,
    paths: Vec<SplinePath>,
}

impl StepScratch {
    fn new(nagents: usize, npoints: usize) -> Self {
        Self {
            controls: vec![Control::default(); nagents],
            distances: vec![0.0; nagents],
            speeds: vec![0.0; nagents],
            positions: vec![0.0; 2 * nagents],
            dimensions: vec![0.0; 2 * nagents],
            lidar: vec![0.0; npoints * nagents],
            collisions: vec![false; nagents],
            offsets: vec![0.0; nagents],
            rewards: vec![0.0; nagents],
            paths: Vec::with_capacity(nagents),
        }
    }
}

/// Everything replaced wholesale at episode start.
struct EpisodeBundle {
    accel_ratings: Vec<f32>,
    vel_ratings: Vec<f32>,
    binder: DynamicsBinder,
    episode: EpisodeState,
    obs: ObservationBuilder,
    reward: RewardEngine,
}

/// Reset the world and build the per-episode state: fresh ratings, a
/// bicycle dynamics bind, distance baselines, and empty histories.
fn spawn_episode(
    config: &EnvConfig,
    world: &mut dyn World,
    provider: &dyn DynamicsProvider,
    rng: &mut ChaCha8Rng,
    scratch: &mut StepScratch,
) -> EpisodeBundle {
    world.reset();

    let n = config.nagents;
    let mut accel_ratings = vec![0.0; n];
    let mut vel_ratings = vec![0.0; n];
    for r in accel_ratings.iter_mut() {
        *r = (rng.gen::<f32>() + 1.0) * 0.5;
    }
    for r in vel_ratings.iter_mut() {
        *r = (rng.gen::<f32>() + 1.0) * 0.5;
    }

    world.dimensions(&mut scratch.dimensions);
    let velocity_limits: Vec<f32> = vel_ratings.iter().map(|r| r * config.max_velocity).collect();
    let model = provider.bicycle(&scratch.dimensions, &velocity_limits);
    let binder = DynamicsBinder::bind(model, velocity_limits);

    world.distances_to_destination(&mut scratch.distances);
    let episode = EpisodeState::new(&scratch.distances, config.horizon);

    let obs = ObservationBuilder::new(
        n,
        config.npoints,
        config.history_len,
        !config.is_staged(),
        config.lidar_noise,
    );
    let reward = RewardEngine::new(n, config.horizon);

    EpisodeBundle {
        accel_ratings,
        vel_ratings,
        binder,
        episode,
        obs,
        reward,
    }
}

// ── DrivingEnv ─────────────────────────────────────────────────────

/// Single-threaded driving environment for lockstep RL training.
///
/// Created from an [`EnvConfig`] plus boxed [`World`] and
/// [`DynamicsProvider`] collaborators via [`new()`](DrivingEnv::new);
/// the first episode is live immediately and its initial observation is
/// available from [`reset()`](DrivingEnv::reset).
///
/// # Example
///
/// ```ignore
/// let mut env = DrivingEnv::new(config, world, provider)?;
/// let mut obs = env.reset();
/// loop {
///     let outcome = env.step(&policy(&obs))?;
///     obs = outcome.observation;
///     if outcome.done {
///         break;
///     }
/// }
/// ```
pub struct DrivingEnv {
    config: EnvConfig,
    world: Box<dyn World>,
    provider: Box<dyn DynamicsProvider>,
    resolver: Resolver,
    binder: DynamicsBinder,
    episode: EpisodeState,
    obs: ObservationBuilder,
    reward: RewardEngine,
    accel_ratings: Vec<f32>,
    vel_ratings: Vec<f32>,
    rng: ChaCha8Rng,
    episode_index: u64,
    metrics: StepMetrics,
    scratch: StepScratch,
}

impl DrivingEnv {
    /// Create a new environment and start its first episode.
    ///
    /// Validates the configuration and checks the world's vehicle
    /// count against `config.nagents`. Consumes the config and both
    /// collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on any invalid configuration field or
    /// an agent-count mismatch with the world.
    pub fn new(
        config: EnvConfig,
        mut world: Box<dyn World>,
        provider: Box<dyn DynamicsProvider>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if world.agent_count() != config.nagents {
            return Err(ConfigError::AgentCountMismatch {
                configured: config.nagents,
                world: world.agent_count(),
            });
        }

        let mut scratch = StepScratch::new(config.nagents, config.npoints);
        let episode_index = 1;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed ^ episode_index);
        let bundle = spawn_episode(&config, world.as_mut(), provider.as_ref(), &mut rng, &mut scratch);
        let resolver = Resolver::from_config(&config);

        Ok(Self {
            config,
            world,
            provider,
            resolver,
            binder: bundle.binder,
            episode: bundle.episode,
            obs: bundle.obs,
            reward: bundle.reward,
            accel_ratings: bundle.accel_ratings,
            vel_ratings: bundle.vel_ratings,
            rng,
            episode_index,
            metrics: StepMetrics::default(),
            scratch,
        })
    }

    /// Start a new episode and return its initial observation.
    ///
    /// Replaces episode state, history buffers, ratings, and the
    /// dynamics binding; returns the stage machine (spline variants)
    /// to `AwaitingPath`. For the staged spline variant the initial
    /// observation is the per-agent acceleration-rating channel.
    pub fn reset(&mut self) -> Observation {
        self.episode_index += 1;
        self.rng = ChaCha8Rng::seed_from_u64(self.config.seed ^ self.episode_index);
        let bundle = spawn_episode(
            &self.config,
            self.world.as_mut(),
            self.provider.as_ref(),
            &mut self.rng,
            &mut self.scratch,
        );
        self.binder = bundle.binder;
        self.episode = bundle.episode;
        self.obs = bundle.obs;
        self.reward = bundle.reward;
        self.accel_ratings = bundle.accel_ratings;
        self.vel_ratings = bundle.vel_ratings;
        self.metrics = StepMetrics::default();
        if let Some(staged) = self.resolver.staged_mut() {
            staged.reset_stage();
        }

        if self.config.is_staged() {
            Observation::Ratings(self.accel_ratings.clone())
        } else {
            let frame = self.observe();
            Observation::Frame(frame)
        }
    }

    /// Execute one control step (unstaged variants).
    ///
    /// # Errors
    ///
    /// [`StepError::StageRequired`] on staged variants, or a wrapped
    /// [`ActionError`](veer_core::ActionError) if the batch does not
    /// fit the configured variant.
    pub fn step(&mut self, action: &ActionBatch) -> Result<StepOutcome, StepError> {
        if self.resolver.is_staged() {
            return Err(StepError::StageRequired);
        }
        self.control_step(action)
    }

    /// Execute one staged call (spline variants): `stage` 0 commits a
    /// path and rebinds dynamics without advancing simulated time;
    /// `stage` 1 performs an ordinary control step.
    ///
    /// # Errors
    ///
    /// [`StepError::StageNotSupported`] on unstaged variants,
    /// [`StepError::InvalidStage`] for stages outside `{0, 1}`, and
    /// [`StepError::PathNotCommitted`] for a stage-1 call before any
    /// stage-0 commitment this episode.
    pub fn step_staged(
        &mut self,
        stage: u8,
        action: &ActionBatch,
    ) -> Result<StagedOutcome, StepError> {
        let Some(staged) = self.resolver.staged() else {
            return Err(StepError::StageNotSupported);
        };
        match stage {
            0 => self.commit_path(action).map(StagedOutcome::Committed),
            1 => {
                if staged.stage() != SplineStage::PathCommitted {
                    return Err(StepError::PathNotCommitted);
                }
                self.control_step(action).map(StagedOutcome::Stepped)
            }
            got => Err(StepError::InvalidStage { got }),
        }
    }

    /// Stage 0: resolve offsets, build the 4-point paths, rebind the
    /// dynamics to a spline model, and return a fresh observation.
    fn commit_path(&mut self, action: &ActionBatch) -> Result<Observation, StepError> {
        let Some(staged) = self.resolver.staged() else {
            return Err(StepError::StageNotSupported);
        };
        staged.resolve_offsets(action, &mut self.scratch.offsets)?;

        self.world.positions(&mut self.scratch.positions);
        staged.build_paths(
            &self.scratch.positions,
            &self.scratch.offsets,
            &mut self.scratch.paths,
        );

        let velocity_limits: Vec<f32> = self
            .vel_ratings
            .iter()
            .map(|r| r * self.config.max_velocity)
            .collect();
        let model = self.provider.spline(&self.scratch.paths, &velocity_limits);
        self.binder = DynamicsBinder::bind(model, velocity_limits);
        if let Some(staged) = self.resolver.staged_mut() {
            staged.commit();
        }

        let frame = self.observe();
        Ok(Observation::Frame(frame))
    }

    /// The shared control-step path: resolve, advance, reward, observe.
    fn control_step(&mut self, action: &ActionBatch) -> Result<StepOutcome, StepError> {
        let step_start = Instant::now();

        let t = Instant::now();
        self.resolver
            .resolve_controls(action, &self.accel_ratings, &mut self.scratch.controls)?;
        let resolve_us = t.elapsed().as_micros() as u64;

        let t = Instant::now();
        self.world.advance(
            self.binder.model_mut(),
            &self.scratch.controls,
            self.config.timesteps,
            &mut self.scratch.collisions,
        );
        let advance_us = t.elapsed().as_micros() as u64;

        let t = Instant::now();
        self.world
            .distances_to_destination(&mut self.scratch.distances);
        self.world.speeds(&mut self.scratch.speeds);
        self.reward.compute(
            &mut self.episode,
            &self.scratch.distances,
            &self.scratch.speeds,
            &self.scratch.collisions,
            &mut self.scratch.rewards,
        );
        // Freeze exactly once, the step the completion flag flips; the
        // destination then never moves again.
        self.world.freeze_destinations(self.reward.newly_completed());
        self.episode.advance();
        let reward_us = t.elapsed().as_micros() as u64;

        let t = Instant::now();
        let frame = self.observe();
        let observe_us = t.elapsed().as_micros() as u64;

        let done = self.episode.at_horizon() || self.episode.all_settled();

        let count = |mask: &[bool]| mask.iter().filter(|&&b| b).count() as u32;
        self.metrics = StepMetrics {
            total_us: step_start.elapsed().as_micros() as u64,
            resolve_us,
            advance_us,
            reward_us,
            observe_us,
            nsteps: self.episode.nsteps(),
            new_collisions: count(self.reward.newly_collided()),
            new_completions: count(self.reward.newly_completed()),
            collided_total: count(self.episode.collided()),
            completed_total: count(self.episode.completed()),
        };

        Ok(StepOutcome {
            observation: Observation::Frame(frame),
            rewards: self.scratch.rewards.clone(),
            done,
            metrics: self.metrics.clone(),
        })
    }

    /// Read current world state and push it through the history
    /// buffers. Destination freezes are already applied, so completed
    /// agents observe zero distance.
    fn observe(&mut self) -> Frame {
        self.world
            .distances_to_destination(&mut self.scratch.distances);
        self.world.speeds(&mut self.scratch.speeds);
        self.world
            .lidar_scan(self.config.npoints, &mut self.scratch.lidar);
        self.obs.build(
            &self.scratch.distances,
            &self.scratch.speeds,
            self.binder.velocity_limits(),
            &self.accel_ratings,
            &self.vel_ratings,
            &self.scratch.lidar,
            &mut self.rng,
        )
    }

    // ── Accessors ──────────────────────────────────────────────

    /// Dense agent identifiers, in batch order.
    pub fn agent_ids(&self) -> Vec<AgentId> {
        (0..self.config.nagents as u32).map(AgentId).collect()
    }

    /// Steps elapsed in the current episode.
    pub fn nsteps(&self) -> u32 {
        self.episode.nsteps()
    }

    /// Identity of the active dynamics bind.
    pub fn binding_id(&self) -> BindingId {
        self.binder.id()
    }

    /// Per-agent velocity limits of the active bind.
    pub fn velocity_limits(&self) -> &[f32] {
        self.binder.velocity_limits()
    }

    /// Diagnostic name of the bound kinematics model.
    pub fn model_name(&self) -> &str {
        self.binder.model_name()
    }

    /// Per-agent acceleration ratings for this episode.
    pub fn accel_ratings(&self) -> &[f32] {
        &self.accel_ratings
    }

    /// Per-agent velocity ratings for this episode.
    pub fn vel_ratings(&self) -> &[f32] {
        &self.vel_ratings
    }

    /// The monotonic collision vector.
    pub fn collided(&self) -> &[bool] {
        self.episode.collided()
    }

    /// The monotonic completion vector.
    pub fn completed(&self) -> &[bool] {
        self.episode.completed()
    }

    /// Stage of the spline protocol, if this variant is staged.
    pub fn spline_stage(&self) -> Option<SplineStage> {
        self.resolver.staged().map(|r| r.stage())
    }

    /// Metrics from the most recent control step.
    pub fn last_metrics(&self) -> &StepMetrics {
        &self.metrics
    }

    /// Per-agent observation space descriptor.
    pub fn observation_space(&self) -> SpaceSpec {
        spaces::observation_space(&self.config)
    }

    /// Per-agent action space descriptor.
    pub fn action_space(&self) -> SpaceSpec {
        spaces::action_space(
            &self.config,
            self.resolver.table_len(),
            self.resolver.offset_table_len(),
        )
    }

    /// The environment configuration.
    pub fn config(&self) -> &EnvConfig {
        &self.config
    }
}

impl std::fmt::Debug for DrivingEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrivingEnv")
            .field("nagents", &self.config.nagents)
            .field("nsteps", &self.episode.nsteps())
            .field("episode", &self.episode_index)
            .field("binding", &self.binder.id())
            .field("model", &self.binder.model_name())
            .finish()
    }
}
