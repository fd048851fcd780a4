//! Environment configuration, validation, and error types.
//!
//! [`EnvConfig`] is the single typed input for constructing a
//! [`DrivingEnv`](crate::env::DrivingEnv). Every knob is an explicit
//! field; [`validate()`](EnvConfig::validate) checks structural
//! invariants at construction so the step path never has to.

use std::error::Error;
use std::fmt;

// ── Variant ────────────────────────────────────────────────────────

/// Action-resolution variant for the environment.
///
/// Selects one resolver and its matching dynamics bind strategy. The
/// bicycle variants keep one binding for the whole episode; the staged
/// spline variant replaces it at stage-0 path commitment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variant {
    /// Continuous `[steer, accel]` controls.
    Continuous,
    /// Discrete steering × acceleration table lookup.
    Discrete,
    /// Two-stage spline protocol: stage 0 commits a lateral-offset path
    /// and rebinds dynamics, stage 1 applies acceleration along it.
    StagedSpline {
        /// How stage-0 lateral offsets are supplied.
        offsets: OffsetMode,
    },
}

/// How the staged spline variant accepts stage-0 lateral offsets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OffsetMode {
    /// Raw scalar offsets, clamped to `[-max_offset, max_offset]`.
    Continuous,
    /// Indices into a build-once offset table spanning the same range.
    Discrete,
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`EnvConfig::validate()`].
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// Agent count is zero.
    ZeroAgents,
    /// Episode horizon is zero.
    ZeroHorizon,
    /// Physics sub-step count is zero.
    ZeroTimesteps,
    /// History length is zero.
    ZeroHistory,
    /// Lidar ray count is zero.
    ZeroLidarRays,
    /// `lidar_noise` is NaN, infinite, or outside `[0, 1]`.
    InvalidLidarNoise {
        /// The invalid value.
        value: f64,
    },
    /// A physical limit is NaN, infinite, zero, or negative.
    NonPositiveLimit {
        /// Name of the offending field.
        name: &'static str,
        /// The invalid value.
        value: f32,
    },
    /// The world's vehicle count does not match `nagents`.
    AgentCountMismatch {
        /// Agent count from the configuration.
        configured: usize,
        /// Vehicle count reported by the world.
        world: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroAgents => write!(f, "nagents must be at least 1"),
            Self::ZeroHorizon => write!(f, "horizon must be at least 1"),
            Self::ZeroTimesteps => write!(f, "timesteps must be at least 1"),
            Self::ZeroHistory => write!(f, "history_len must be at least 1"),
            Self::ZeroLidarRays => write!(f, "npoints must be at least 1"),
            Self::InvalidLidarNoise { value } => {
                write!(f, "lidar_noise must be in [0, 1], got {value}")
            }
            Self::NonPositiveLimit { name, value } => {
                write!(f, "{name} must be finite and positive, got {value}")
            }
            Self::AgentCountMismatch { configured, world } => {
                write!(f, "config has {configured} agents, world has {world} vehicles")
            }
        }
    }
}

impl Error for ConfigError {}

// ── EnvConfig ──────────────────────────────────────────────────────

/// Configuration for a [`DrivingEnv`](crate::env::DrivingEnv).
///
/// Constructed once and passed by value into the environment
/// constructor. Defaults follow the reference highway setup.
#[derive(Clone, Debug)]
pub struct EnvConfig {
    /// Number of agents in the episode batch.
    pub nagents: usize,
    /// Episode length in environment steps.
    pub horizon: u32,
    /// Physics sub-steps the world integrates per environment step.
    pub timesteps: u32,
    /// Number of most-recent observations concatenated per stream.
    pub history_len: usize,
    /// Lidar rays per agent per scan.
    pub npoints: usize,
    /// Per-ray Bernoulli dropout probability (0 disables noise).
    pub lidar_noise: f64,
    /// Global acceleration ceiling, scaled per agent by its rating.
    pub max_accel: f32,
    /// Steering clamp half-range in radians.
    pub max_steering: f32,
    /// Global velocity ceiling, scaled per agent by its rating.
    pub max_velocity: f32,
    /// Stage-0 lateral offset half-range (staged spline variant).
    pub max_offset: f32,
    /// Road length, used by stage-0 path construction.
    pub road_length: f32,
    /// Road width, used to scale stage-0 lateral offsets.
    pub road_width: f32,
    /// Seed for per-episode rating draws and lidar dropout.
    pub seed: u64,
    /// Action-resolution variant.
    pub variant: Variant,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            nagents: 4,
            horizon: 200,
            timesteps: 25,
            history_len: 5,
            npoints: 360,
            lidar_noise: 0.0,
            max_accel: 3.0,
            max_steering: 0.1,
            max_velocity: 16.0,
            max_offset: 0.75,
            road_length: 250.0,
            road_width: 25.0,
            seed: 0,
            variant: Variant::Continuous,
        }
    }
}

impl EnvConfig {
    /// Check structural invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant as a [`ConfigError`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nagents == 0 {
            return Err(ConfigError::ZeroAgents);
        }
        if self.horizon == 0 {
            return Err(ConfigError::ZeroHorizon);
        }
        if self.timesteps == 0 {
            return Err(ConfigError::ZeroTimesteps);
        }
        if self.history_len == 0 {
            return Err(ConfigError::ZeroHistory);
        }
        if self.npoints == 0 {
            return Err(ConfigError::ZeroLidarRays);
        }
        if !self.lidar_noise.is_finite() || !(0.0..=1.0).contains(&self.lidar_noise) {
            return Err(ConfigError::InvalidLidarNoise {
                value: self.lidar_noise,
            });
        }
        for (name, value) in [
            ("max_accel", self.max_accel),
            ("max_steering", self.max_steering),
            ("max_velocity", self.max_velocity),
            ("max_offset", self.max_offset),
            ("road_length", self.road_length),
            ("road_width", self.road_width),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NonPositiveLimit { name, value });
            }
        }
        Ok(())
    }

    /// Whether the configured variant uses the two-stage protocol.
    pub fn is_staged(&self) -> bool {
        matches!(self.variant, Variant::StagedSpline { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EnvConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_agents() {
        let config = EnvConfig {
            nagents: 0,
            ..EnvConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroAgents));
    }

    #[test]
    fn rejects_zero_horizon() {
        let config = EnvConfig {
            horizon: 0,
            ..EnvConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroHorizon));
    }

    #[test]
    fn rejects_zero_history() {
        let config = EnvConfig {
            history_len: 0,
            ..EnvConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroHistory));
    }

    #[test]
    fn rejects_out_of_range_lidar_noise() {
        for value in [-0.1, 1.5, f64::NAN] {
            let config = EnvConfig {
                lidar_noise: value,
                ..EnvConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidLidarNoise { .. })
            ));
        }
    }

    #[test]
    fn rejects_non_positive_limits() {
        let config = EnvConfig {
            max_velocity: 0.0,
            ..EnvConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositiveLimit {
                name: "max_velocity",
                ..
            })
        ));

        let config = EnvConfig {
            max_steering: f32::NAN,
            ..EnvConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositiveLimit {
                name: "max_steering",
                ..
            })
        ));
    }

    #[test]
    fn staged_detection() {
        assert!(!EnvConfig::default().is_staged());
        let config = EnvConfig {
            variant: Variant::StagedSpline {
                offsets: OffsetMode::Continuous,
            },
            ..EnvConfig::default()
        };
        assert!(config.is_staged());
    }
}
