//! Observation assembly: raw per-step features through temporal history.
//!
//! The builder turns the world's current kinematic quantities and lidar
//! scan into one fixed-shape observation frame per step. State features
//! are agent-major; the lidar stream carries reciprocal ray distances so
//! near obstacles read large. Both streams pass through a
//! [`HistoryBuffer`], so every returned frame covers exactly the
//! configured history length regardless of step index.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::history::HistoryBuffer;

/// Observation returned by `reset` and `step`.
#[derive(Clone, Debug, PartialEq)]
pub enum Observation {
    /// Per-agent acceleration ratings. The staged spline variant
    /// returns this once, directly after `reset`, before the first
    /// stage-0 call.
    Ratings(Vec<f32>),
    /// A full `(state, lidar)` frame.
    Frame(Frame),
}

impl Observation {
    /// The full frame, if this observation carries one.
    pub fn frame(&self) -> Option<&Frame> {
        match self {
            Self::Frame(frame) => Some(frame),
            Self::Ratings(_) => None,
        }
    }

    /// The rating vector, if this observation carries one.
    pub fn ratings(&self) -> Option<&[f32]> {
        match self {
            Self::Ratings(r) => Some(r),
            Self::Frame(_) => None,
        }
    }
}

/// One history-stacked observation frame.
///
/// `state` is agent-major with `state_width * history_len` values per
/// agent, oldest step first; `lidar` likewise with
/// `npoints * history_len` values per agent.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// Stacked kinematic state features.
    pub state: Vec<f32>,
    /// Stacked reciprocal lidar returns.
    pub lidar: Vec<f32>,
}

/// Assembles raw features and maintains the two history streams.
pub struct ObservationBuilder {
    state_history: HistoryBuffer,
    lidar_history: HistoryBuffer,
    nagents: usize,
    npoints: usize,
    include_ratings: bool,
    lidar_noise: f64,
    state_frame: Vec<f32>,
    lidar_frame: Vec<f32>,
}

impl ObservationBuilder {
    /// Create a builder with fresh (unprimed) history buffers.
    ///
    /// `include_ratings` selects the 4-feature state stream
    /// (inverse distance, normalized speed, acceleration rating,
    /// velocity rating) or the 2-feature stream the staged spline
    /// variant uses.
    pub fn new(
        nagents: usize,
        npoints: usize,
        history_len: usize,
        include_ratings: bool,
        lidar_noise: f64,
    ) -> Self {
        let state_width = if include_ratings { 4 } else { 2 };
        Self {
            state_history: HistoryBuffer::new(history_len, nagents * state_width),
            lidar_history: HistoryBuffer::new(history_len, nagents * npoints),
            nagents,
            npoints,
            include_ratings,
            lidar_noise,
            state_frame: vec![0.0; nagents * state_width],
            lidar_frame: vec![0.0; nagents * npoints],
        }
    }

    /// Raw state features per agent per step.
    pub fn state_width(&self) -> usize {
        if self.include_ratings {
            4
        } else {
            2
        }
    }

    /// Assemble one frame and push it through both history streams.
    ///
    /// `distances` are signed; the feature uses `1 / max(|d|, 1)` so
    /// zero distance is total. `raw_lidar` holds strictly positive ray
    /// distances, `npoints` per agent. Dropout noise zeroes each
    /// reciprocal ray independently with probability `lidar_noise`.
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        &mut self,
        distances: &[f32],
        speeds: &[f32],
        velocity_limits: &[f32],
        accel_ratings: &[f32],
        vel_ratings: &[f32],
        raw_lidar: &[f32],
        rng: &mut ChaCha8Rng,
    ) -> Frame {
        let width = self.state_width();
        for i in 0..self.nagents {
            let row = &mut self.state_frame[i * width..(i + 1) * width];
            row[0] = 1.0 / distances[i].abs().max(1.0);
            row[1] = speeds[i] / velocity_limits[i];
            if self.include_ratings {
                row[2] = accel_ratings[i];
                row[3] = vel_ratings[i];
            }
        }

        for (out, &d) in self.lidar_frame.iter_mut().zip(raw_lidar) {
            *out = 1.0 / d;
        }
        if self.lidar_noise > 0.0 {
            for v in self.lidar_frame.iter_mut() {
                if rng.gen::<f64>() <= self.lidar_noise {
                    *v = 0.0;
                }
            }
        }

        self.state_history.push(&self.state_frame);
        self.lidar_history.push(&self.lidar_frame);

        let mut state = Vec::new();
        let mut lidar = Vec::new();
        self.state_history.read_grouped(self.nagents, &mut state);
        self.lidar_history.read_grouped(self.nagents, &mut lidar);
        Frame { state, lidar }
    }

    /// Per-agent length of the stacked state vector.
    pub fn state_len(&self) -> usize {
        self.state_width() * self.state_history.capacity()
    }

    /// Per-agent length of the stacked lidar vector.
    pub fn lidar_len(&self) -> usize {
        self.npoints * self.lidar_history.capacity()
    }
}
