//! Physical control signals and committed spline paths.

use smallvec::SmallVec;

/// A resolved physical control signal for one vehicle.
///
/// `steer` is a front-wheel angle in radians; `accel` is a longitudinal
/// acceleration in world units. Action resolution produces one `Control`
/// per agent per step; the kinematics model consumes the whole batch.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Control {
    /// Front-wheel steering angle.
    pub steer: f32,
    /// Longitudinal acceleration.
    pub accel: f32,
}

impl Control {
    /// An acceleration-only control with zero steering.
    pub fn accel_only(accel: f32) -> Self {
        Self { steer: 0.0, accel }
    }
}

/// Waypoints of one committed spline path, in drive order.
///
/// Uses `SmallVec<[[f32; 2]; 4]>` to avoid heap allocation for the staged
/// protocol's 4-point paths (current position, forward midpoint, forward
/// endpoint, far-field anchor). Longer paths spill to the heap
/// transparently.
pub type SplinePath = SmallVec<[[f32; 2]; 4]>;
