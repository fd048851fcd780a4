//! Per-step metrics for the simulation core.
//!
//! [`StepMetrics`] captures timing and event counters for a single
//! environment step. The environment populates these after each
//! `step()`; consumers (telemetry, training-loop diagnostics) read them
//! from the most recent step via `last_metrics()`.

/// Timing and event counters collected during a single step.
///
/// All durations are in microseconds.
#[derive(Clone, Debug, Default)]
pub struct StepMetrics {
    /// Wall-clock time for the entire step, in microseconds.
    pub total_us: u64,
    /// Time spent resolving the action batch, in microseconds.
    pub resolve_us: u64,
    /// Time spent advancing physics through the world, in microseconds.
    pub advance_us: u64,
    /// Time spent in the reward engine, in microseconds.
    pub reward_us: u64,
    /// Time spent assembling the observation, in microseconds.
    pub observe_us: u64,
    /// Step index this record describes (post-increment).
    pub nsteps: u32,
    /// Agents whose collision flag first flipped this step.
    pub new_collisions: u32,
    /// Agents whose completion flag first flipped this step.
    pub new_completions: u32,
    /// Cumulative collided agents this episode.
    pub collided_total: u32,
    /// Cumulative completed agents this episode.
    pub completed_total: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = StepMetrics::default();
        assert_eq!(m.total_us, 0);
        assert_eq!(m.resolve_us, 0);
        assert_eq!(m.advance_us, 0);
        assert_eq!(m.reward_us, 0);
        assert_eq!(m.observe_us, 0);
        assert_eq!(m.nsteps, 0);
        assert_eq!(m.new_collisions, 0);
        assert_eq!(m.new_completions, 0);
        assert_eq!(m.collided_total, 0);
        assert_eq!(m.completed_total, 0);
    }
}
