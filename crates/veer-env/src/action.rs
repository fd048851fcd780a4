//! Action resolution: agent choices into physical control signals.
//!
//! Three resolver variants sit behind the [`Resolver`] enum, selected
//! once at construction from the configured
//! [`Variant`](crate::config::Variant):
//!
//! - [`ContinuousResolver`]: raw `[steer, accel]` pairs, steering
//!   clamped, acceleration rescaled per agent.
//! - [`DiscreteTableResolver`]: index lookup into a build-once
//!   [`ActionTable`], then the same rescaling.
//! - [`StagedSplineResolver`]: the two-stage protocol. Stage 0 resolves
//!   a lateral offset and constructs a 4-point path per agent; stage 1
//!   resolves acceleration along the committed path. The stage machine
//!   is explicit: stage 1 before any commitment fails fast.
//!
//! All resolution is a pure function of the action batch and the
//! per-agent acceleration ratings; only the spline stage flag is state.

use veer_core::{ActionError, Control, SplinePath};

use crate::config::{EnvConfig, OffsetMode, Variant};

/// Longitudinal distance from the current position to the committed
/// path's midpoint and the lateral-offset application point.
pub const PATH_FORWARD_OFFSET: f32 = 50.0;

// ── ActionBatch ────────────────────────────────────────────────────

/// One step's worth of agent-chosen actions.
#[derive(Clone, Debug, PartialEq)]
pub enum ActionBatch {
    /// Per-agent `[steer, accel]` pairs (continuous variants).
    Controls(Vec<Control>),
    /// Per-agent scalars (stage-0 lateral offsets).
    Scalars(Vec<f32>),
    /// Per-agent indices into an action table (discrete variants).
    Indices(Vec<usize>),
}

impl ActionBatch {
    /// Number of per-agent entries.
    pub fn len(&self) -> usize {
        match self {
            Self::Controls(v) => v.len(),
            Self::Scalars(v) => v.len(),
            Self::Indices(v) => v.len(),
        }
    }

    /// Whether the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Controls(_) => "controls",
            Self::Scalars(_) => "scalars",
            Self::Indices(_) => "indices",
        }
    }

    fn check_len(&self, expected: usize) -> Result<(), ActionError> {
        if self.len() != expected {
            return Err(ActionError::WrongAgentCount {
                expected,
                got: self.len(),
            });
        }
        Ok(())
    }
}

// ── Tables ─────────────────────────────────────────────────────────

/// Inclusive symmetric range `-max ..= max` stepped by `step`.
///
/// Values are generated from integer multiples of `step` so table
/// entries are exact and re-quantization round-trips.
fn symmetric_range(max: f32, step: f32) -> Vec<f32> {
    let half = (max / step).round() as i64;
    (-half..=half).map(|k| k as f32 * step).collect()
}

/// Build-once ordered enumeration of physical control tuples.
///
/// Index → control is a static lookup, never recomputed per step.
/// [`quantize`](ActionTable::quantize) maps a control back to its
/// nearest entry for round-trip checks and control discretization.
#[derive(Clone, Debug)]
pub struct ActionTable {
    entries: Vec<Control>,
}

impl ActionTable {
    /// Steering × acceleration product table, steering-major.
    ///
    /// Steering spans `-max_steering ..= max_steering` by
    /// `steering_step`; acceleration spans the normalized `-1 ..= 1` by
    /// `accel_step`.
    pub fn steering_accel(max_steering: f32, steering_step: f32, accel_step: f32) -> Self {
        let steers = symmetric_range(max_steering, steering_step);
        let accels = symmetric_range(1.0, accel_step);
        let mut entries = Vec::with_capacity(steers.len() * accels.len());
        for &steer in &steers {
            for &accel in &accels {
                entries.push(Control { steer, accel });
            }
        }
        Self { entries }
    }

    /// Acceleration-only table spanning `-max_accel ..= max_accel`.
    pub fn accel_only(max_accel: f32, step: f32) -> Self {
        let entries = symmetric_range(max_accel, step)
            .into_iter()
            .map(Control::accel_only)
            .collect();
        Self { entries }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up one entry.
    pub fn resolve(&self, index: usize) -> Result<Control, ActionError> {
        self.entries
            .get(index)
            .copied()
            .ok_or(ActionError::IndexOutOfRange {
                index,
                table_len: self.entries.len(),
            })
    }

    /// Index of the entry nearest to `control` (Euclidean over
    /// steer/accel).
    pub fn quantize(&self, control: Control) -> usize {
        let mut best = 0;
        let mut best_d2 = f32::INFINITY;
        for (i, entry) in self.entries.iter().enumerate() {
            let ds = entry.steer - control.steer;
            let da = entry.accel - control.accel;
            let d2 = ds * ds + da * da;
            if d2 < best_d2 {
                best_d2 = d2;
                best = i;
            }
        }
        best
    }
}

/// Build-once table of stage-0 lateral offsets.
#[derive(Clone, Debug)]
pub struct OffsetTable {
    values: Vec<f32>,
}

impl OffsetTable {
    /// Offsets spanning `-max_offset ..= max_offset` by `step`.
    pub fn new(max_offset: f32, step: f32) -> Self {
        Self {
            values: symmetric_range(max_offset, step),
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Look up one offset.
    pub fn resolve(&self, index: usize) -> Result<f32, ActionError> {
        self.values
            .get(index)
            .copied()
            .ok_or(ActionError::IndexOutOfRange {
                index,
                table_len: self.values.len(),
            })
    }

    /// Index of the entry nearest to `offset`.
    pub fn quantize(&self, offset: f32) -> usize {
        let mut best = 0;
        let mut best_d = f32::INFINITY;
        for (i, &v) in self.values.iter().enumerate() {
            let d = (v - offset).abs();
            if d < best_d {
                best_d = d;
                best = i;
            }
        }
        best
    }
}

/// Table step shared by the acceleration and offset enumerations.
const TABLE_STEP: f32 = 0.25;

/// Step between adjacent steering entries in the discrete table.
const STEERING_STEP: f32 = 0.05;

// ── Resolvers ──────────────────────────────────────────────────────

/// Stage of the two-stage spline protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplineStage {
    /// No path committed this episode; stage 1 is illegal.
    AwaitingPath,
    /// A path is committed; stage 1 steps drive along it.
    PathCommitted,
}

/// Direct continuous resolution. Pure function, no state.
#[derive(Clone, Debug)]
pub struct ContinuousResolver {
    max_steering: f32,
    max_accel: f32,
}

impl ContinuousResolver {
    fn resolve(
        &self,
        action: &ActionBatch,
        accel_ratings: &[f32],
        out: &mut [Control],
    ) -> Result<(), ActionError> {
        let ActionBatch::Controls(controls) = action else {
            return Err(ActionError::PayloadMismatch {
                expected: "controls",
                got: action.kind(),
            });
        };
        action.check_len(out.len())?;
        for (i, control) in controls.iter().enumerate() {
            out[i] = Control {
                steer: control.steer.clamp(-self.max_steering, self.max_steering),
                accel: control.accel * self.max_accel * accel_ratings[i],
            };
        }
        Ok(())
    }
}

/// Discrete table lookup resolution. Pure function, no state.
#[derive(Clone, Debug)]
pub struct DiscreteTableResolver {
    table: ActionTable,
    max_accel: f32,
}

impl DiscreteTableResolver {
    fn resolve(
        &self,
        action: &ActionBatch,
        accel_ratings: &[f32],
        out: &mut [Control],
    ) -> Result<(), ActionError> {
        let ActionBatch::Indices(indices) = action else {
            return Err(ActionError::PayloadMismatch {
                expected: "indices",
                got: action.kind(),
            });
        };
        action.check_len(out.len())?;
        for (i, &index) in indices.iter().enumerate() {
            let entry = self.table.resolve(index)?;
            out[i] = Control {
                steer: entry.steer,
                accel: entry.accel * self.max_accel * accel_ratings[i],
            };
        }
        Ok(())
    }
}

/// The two-stage spline protocol resolver.
///
/// Stage 0 resolves per-agent lateral offsets and builds the 4-point
/// paths the dynamics rebind commits to; stage 1 resolves acceleration
/// indices against the committed paths. Holds the only mutable resolver
/// state: the [`SplineStage`] flag, reset at every episode reset.
#[derive(Clone, Debug)]
pub struct StagedSplineResolver {
    accel_table: ActionTable,
    offset_table: Option<OffsetTable>,
    max_accel: f32,
    max_offset: f32,
    road_length: f32,
    road_width: f32,
    stage: SplineStage,
}

impl StagedSplineResolver {
    /// Current protocol stage.
    pub fn stage(&self) -> SplineStage {
        self.stage
    }

    /// Record a successful stage-0 commitment.
    pub fn commit(&mut self) {
        self.stage = SplineStage::PathCommitted;
    }

    /// Return to `AwaitingPath` at episode reset.
    pub fn reset_stage(&mut self) {
        self.stage = SplineStage::AwaitingPath;
    }

    /// Resolve stage-0 lateral offsets, one per agent.
    ///
    /// Continuous offsets are clamped to the offset half-range;
    /// discrete offsets are table lookups.
    pub fn resolve_offsets(
        &self,
        action: &ActionBatch,
        out: &mut [f32],
    ) -> Result<(), ActionError> {
        action.check_len(out.len())?;
        match (&self.offset_table, action) {
            (None, ActionBatch::Scalars(values)) => {
                for (i, &v) in values.iter().enumerate() {
                    out[i] = v.clamp(-self.max_offset, self.max_offset);
                }
                Ok(())
            }
            (Some(table), ActionBatch::Indices(indices)) => {
                for (i, &index) in indices.iter().enumerate() {
                    out[i] = table.resolve(index)?;
                }
                Ok(())
            }
            (None, other) => Err(ActionError::PayloadMismatch {
                expected: "scalars",
                got: other.kind(),
            }),
            (Some(_), other) => Err(ActionError::PayloadMismatch {
                expected: "indices",
                got: other.kind(),
            }),
        }
    }

    /// Build one committed path per agent from resolved offsets.
    ///
    /// `positions` is flattened `[x, y]` pairs. Each path runs current
    /// position → forward midpoint shifted by `offset * road_width / 2`
    /// → forward endpoint at `road_length / 2` holding that shift →
    /// far-field anchor at `-road_length / 2` holding the agent's
    /// original lateral position.
    pub fn build_paths(&self, positions: &[f32], offsets: &[f32], out: &mut Vec<SplinePath>) {
        out.clear();
        for (i, &offset) in offsets.iter().enumerate() {
            let x = positions[2 * i];
            let y = positions[2 * i + 1];
            let shifted = y + offset * self.road_width / 2.0;
            let mut path = SplinePath::new();
            path.push([x, y]);
            path.push([x + PATH_FORWARD_OFFSET, shifted]);
            path.push([self.road_length / 2.0, shifted]);
            path.push([-self.road_length / 2.0, y]);
            out.push(path);
        }
    }

    /// Resolve a stage-1 acceleration batch against the committed path.
    fn resolve_stage1(
        &self,
        action: &ActionBatch,
        accel_ratings: &[f32],
        out: &mut [Control],
    ) -> Result<(), ActionError> {
        let ActionBatch::Indices(indices) = action else {
            return Err(ActionError::PayloadMismatch {
                expected: "indices",
                got: action.kind(),
            });
        };
        action.check_len(out.len())?;
        for (i, &index) in indices.iter().enumerate() {
            let entry = self.accel_table.resolve(index)?;
            out[i] = Control::accel_only(entry.accel * self.max_accel * accel_ratings[i]);
        }
        Ok(())
    }
}

/// The configured action resolver.
pub enum Resolver {
    /// Continuous `[steer, accel]` controls.
    Continuous(ContinuousResolver),
    /// Discrete steering × acceleration lookup.
    DiscreteTable(DiscreteTableResolver),
    /// Two-stage spline protocol.
    StagedSpline(StagedSplineResolver),
}

impl Resolver {
    /// Build the resolver (and its tables) selected by the config.
    pub fn from_config(config: &EnvConfig) -> Self {
        match config.variant {
            Variant::Continuous => Self::Continuous(ContinuousResolver {
                max_steering: config.max_steering,
                max_accel: config.max_accel,
            }),
            Variant::Discrete => Self::DiscreteTable(DiscreteTableResolver {
                table: ActionTable::steering_accel(config.max_steering, STEERING_STEP, TABLE_STEP),
                max_accel: config.max_accel,
            }),
            Variant::StagedSpline { offsets } => Self::StagedSpline(StagedSplineResolver {
                accel_table: ActionTable::accel_only(config.max_accel, TABLE_STEP),
                offset_table: match offsets {
                    OffsetMode::Continuous => None,
                    OffsetMode::Discrete => Some(OffsetTable::new(config.max_offset, TABLE_STEP)),
                },
                max_accel: config.max_accel,
                max_offset: config.max_offset,
                road_length: config.road_length,
                road_width: config.road_width,
                stage: SplineStage::AwaitingPath,
            }),
        }
    }

    /// Whether this resolver uses the two-stage protocol.
    pub fn is_staged(&self) -> bool {
        matches!(self, Self::StagedSpline(_))
    }

    /// The staged resolver, if configured.
    pub fn staged(&self) -> Option<&StagedSplineResolver> {
        match self {
            Self::StagedSpline(r) => Some(r),
            _ => None,
        }
    }

    /// The staged resolver, mutably.
    pub fn staged_mut(&mut self) -> Option<&mut StagedSplineResolver> {
        match self {
            Self::StagedSpline(r) => Some(r),
            _ => None,
        }
    }

    /// Resolve one control-step action batch into physical controls.
    ///
    /// For the staged variant this is the stage-1 resolution; the
    /// caller is responsible for having checked the stage machine.
    pub fn resolve_controls(
        &self,
        action: &ActionBatch,
        accel_ratings: &[f32],
        out: &mut [Control],
    ) -> Result<(), ActionError> {
        match self {
            Self::Continuous(r) => r.resolve(action, accel_ratings, out),
            Self::DiscreteTable(r) => r.resolve(action, accel_ratings, out),
            Self::StagedSpline(r) => r.resolve_stage1(action, accel_ratings, out),
        }
    }

    /// Size of the discrete action table, if any.
    pub fn table_len(&self) -> Option<usize> {
        match self {
            Self::Continuous(_) => None,
            Self::DiscreteTable(r) => Some(r.table.len()),
            Self::StagedSpline(r) => Some(r.accel_table.len()),
        }
    }

    /// Size of the stage-0 offset table, if the staged variant uses
    /// discrete offsets.
    pub fn offset_table_len(&self) -> Option<usize> {
        match self {
            Self::StagedSpline(r) => r.offset_table.as_ref().map(OffsetTable::len),
            _ => None,
        }
    }
}
