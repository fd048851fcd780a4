//! Shaped reward computation under persistent collision/goal bookkeeping.
//!
//! One [`compute`](RewardEngine::compute) call per step: consumes the
//! fresh collision signal and current distances/speeds, mutates the
//! [`EpisodeState`] flags, and writes one scalar reward per agent. All
//! passes run over whole-batch slices.
//!
//! The collision penalty deliberately uses the normalized,
//! completion-masked distance *without* the collision mask that zeroes
//! the ordinary distance term: colliding with more track left costs
//! strictly more, even though the agent's distance reward is zeroed on
//! the same step.

use crate::episode::EpisodeState;

/// Fixed bonus granted the step an agent first reaches its goal.
const GOAL_BONUS: f32 = 1.0;

/// Divisor applied to speeds in the completed-agent drag term.
const SPEED_SCALE: f32 = 8.0;

/// Per-step reward computation with reusable mask scratch.
pub struct RewardEngine {
    horizon: u32,
    reached: Vec<bool>,
    new_goal: Vec<bool>,
    new_collision: Vec<bool>,
    norm_dist: Vec<f32>,
}

impl RewardEngine {
    /// Create an engine for `nagents` agents and the given horizon.
    pub fn new(nagents: usize, horizon: u32) -> Self {
        Self {
            horizon,
            reached: vec![false; nagents],
            new_goal: vec![false; nagents],
            new_collision: vec![false; nagents],
            norm_dist: vec![0.0; nagents],
        }
    }

    /// Compute per-agent rewards for one step and update `episode`.
    ///
    /// `distances` are signed (`<= 0` means the destination is
    /// reached); `incoming_collisions` is the raw signal from the
    /// physics collaborator. Uses the pre-increment step counter, so
    /// the caller advances `episode` after this returns. The caller is
    /// also responsible for freezing destinations of completed agents
    /// through the world.
    pub fn compute(
        &mut self,
        episode: &mut EpisodeState,
        distances: &[f32],
        speeds: &[f32],
        incoming_collisions: &[bool],
        rewards: &mut [f32],
    ) {
        let n = episode.agent_count();
        let horizon = self.horizon as f32;
        let nsteps = episode.nsteps() as f32;

        // Goal detection against the pre-update completion vector.
        for i in 0..n {
            let not_completed = !episode.completed()[i];
            self.reached[i] = distances[i] <= 0.0;
            self.new_goal[i] = not_completed && self.reached[i];
            self.norm_dist[i] = if not_completed {
                distances[i].abs() / episode.original_distances()[i]
            } else {
                0.0
            };
        }
        episode.record_completions(&self.reached);

        episode.fresh_collisions(incoming_collisions, &mut self.new_collision);
        episode.record_collisions(&self.new_collision);

        // Final assembly against the post-update flag vectors.
        let urgency = (horizon - nsteps - 1.0) / horizon;
        for i in 0..n {
            let penalty = if self.new_collision[i] {
                1.0 + self.norm_dist[i] * urgency
            } else {
                0.0
            };
            let distance_term = if episode.collided()[i] {
                0.0
            } else {
                self.norm_dist[i] / horizon
            };
            let drag_term = if episode.completed()[i] {
                (speeds[i] / SPEED_SCALE).abs() / horizon
            } else {
                0.0
            };
            let bonus = if self.new_goal[i] { GOAL_BONUS } else { 0.0 };
            rewards[i] = -distance_term - drag_term - penalty + bonus;
        }
    }

    /// Agents whose collision flag first flipped during the last
    /// `compute` call.
    pub fn newly_collided(&self) -> &[bool] {
        &self.new_collision
    }

    /// Agents whose completion flag first flipped during the last
    /// `compute` call.
    pub fn newly_completed(&self) -> &[bool] {
        &self.new_goal
    }
}
