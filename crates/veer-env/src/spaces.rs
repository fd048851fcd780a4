//! Observation and action space descriptors.
//!
//! [`SpaceSpec`] is a plain-data description of what the environment
//! emits and accepts, for the training/driver layer to size its
//! networks and samplers. Shapes depend only on the configuration, so
//! the builders here take an [`EnvConfig`] plus the resolver's table
//! sizes.

use crate::config::{EnvConfig, OffsetMode, Variant};

/// A space descriptor.
#[derive(Clone, Debug, PartialEq)]
pub enum SpaceSpec {
    /// Axis-aligned continuous box with per-element bounds.
    Box {
        /// Per-element lower bounds.
        low: Vec<f32>,
        /// Per-element upper bounds.
        high: Vec<f32>,
    },
    /// Finite index space `{0, .., n-1}`.
    Discrete {
        /// Number of indices.
        n: usize,
    },
    /// Ordered pair of sub-spaces.
    Pair(Box<SpaceSpec>, Box<SpaceSpec>),
}

impl SpaceSpec {
    /// Flat element count for box spaces, entry count for discrete
    /// spaces, sum for pairs.
    pub fn len(&self) -> usize {
        match self {
            Self::Box { low, .. } => low.len(),
            Self::Discrete { n } => *n,
            Self::Pair(a, b) => a.len() + b.len(),
        }
    }

    /// Whether the space has zero elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Tile `pattern` `reps` times.
fn tile(pattern: &[f32], reps: usize) -> Vec<f32> {
    let mut out = Vec::with_capacity(pattern.len() * reps);
    for _ in 0..reps {
        out.extend_from_slice(pattern);
    }
    out
}

/// A lidar box: `[0, inf)` per ray per history slot.
fn lidar_box(npoints: usize, history_len: usize) -> SpaceSpec {
    SpaceSpec::Box {
        low: vec![0.0; npoints * history_len],
        high: vec![f32::INFINITY; npoints * history_len],
    }
}

/// Per-agent observation space for the configured variant.
///
/// Bicycle variants: `(state, lidar)` with a 4-feature state stream
/// (inverse distance, normalized speed, both ratings) tiled by history.
/// The staged spline variant prefixes a scalar rating channel and drops
/// the rating features from the state stream.
pub fn observation_space(config: &EnvConfig) -> SpaceSpec {
    let h = config.history_len;
    match config.variant {
        Variant::Continuous | Variant::Discrete => SpaceSpec::Pair(
            Box::new(SpaceSpec::Box {
                low: tile(&[0.0, -1.0, 0.5, 0.5], h),
                high: tile(&[1.0, 1.0, 1.0, 1.0], h),
            }),
            Box::new(lidar_box(config.npoints, h)),
        ),
        Variant::StagedSpline { .. } => SpaceSpec::Pair(
            Box::new(SpaceSpec::Box {
                low: vec![0.5],
                high: vec![1.0],
            }),
            Box::new(SpaceSpec::Pair(
                Box::new(SpaceSpec::Box {
                    low: tile(&[0.0, -1.0], h),
                    high: tile(&[1.0, 1.0], h),
                }),
                Box::new(lidar_box(config.npoints, h)),
            )),
        ),
    }
}

/// Per-agent action space for the configured variant.
///
/// `table_len` and `offset_table_len` come from the resolver's
/// build-once tables.
pub fn action_space(
    config: &EnvConfig,
    table_len: Option<usize>,
    offset_table_len: Option<usize>,
) -> SpaceSpec {
    match config.variant {
        Variant::Continuous => SpaceSpec::Box {
            low: vec![-config.max_steering, -1.0],
            high: vec![config.max_steering, 1.0],
        },
        Variant::Discrete => SpaceSpec::Discrete {
            n: table_len.unwrap_or(0),
        },
        Variant::StagedSpline { offsets } => {
            let stage0 = match offsets {
                OffsetMode::Continuous => SpaceSpec::Box {
                    low: vec![-config.max_offset],
                    high: vec![config.max_offset],
                },
                OffsetMode::Discrete => SpaceSpec::Discrete {
                    n: offset_table_len.unwrap_or(0),
                },
            };
            SpaceSpec::Pair(
                Box::new(stage0),
                Box::new(SpaceSpec::Discrete {
                    n: table_len.unwrap_or(0),
                }),
            )
        }
    }
}
