//! The active kinematics binding for the current simulated interval.
//!
//! A [`DynamicsBinder`] owns exactly one kinematics model plus the
//! per-agent velocity limits derived for it. Binds are full
//! replacements: bicycle variants bind once per episode at reset, the
//! staged spline variant re-binds at stage-0 commitment. Each bind
//! carries a fresh [`BindingId`] so replacement is observable.

use veer_core::{BindingId, KinematicsModel};

/// The currently bound kinematics model and its derived limits.
pub struct DynamicsBinder {
    model: Box<dyn KinematicsModel>,
    velocity_limits: Vec<f32>,
    id: BindingId,
}

impl DynamicsBinder {
    /// Bind a model with its per-agent velocity limits
    /// (`velocity_rating * max_velocity`).
    pub fn bind(model: Box<dyn KinematicsModel>, velocity_limits: Vec<f32>) -> Self {
        Self {
            model,
            velocity_limits,
            id: BindingId::next(),
        }
    }

    /// Identity of this bind, unique per replacement.
    pub fn id(&self) -> BindingId {
        self.id
    }

    /// Per-agent velocity limits for the bound model.
    pub fn velocity_limits(&self) -> &[f32] {
        &self.velocity_limits
    }

    /// The bound model, mutably, for physics advancement.
    pub fn model_mut(&mut self) -> &mut dyn KinematicsModel {
        &mut *self.model
    }

    /// Diagnostic name of the bound model.
    pub fn model_name(&self) -> &str {
        self.model.name()
    }
}

impl std::fmt::Debug for DynamicsBinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicsBinder")
            .field("id", &self.id)
            .field("model", &self.model.name())
            .field("agents", &self.velocity_limits.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veer_core::{Control, VehicleState};

    struct NullModel {
        limits: Vec<f32>,
    }

    impl KinematicsModel for NullModel {
        fn name(&self) -> &str {
            "null"
        }
        fn velocity_limits(&self) -> &[f32] {
            &self.limits
        }
        fn integrate(&mut self, _states: &mut [VehicleState], _controls: &[Control], _dt: f32) {}
    }

    fn bind(limits: Vec<f32>) -> DynamicsBinder {
        let model = Box::new(NullModel {
            limits: limits.clone(),
        });
        DynamicsBinder::bind(model, limits)
    }

    #[test]
    fn rebind_changes_identity() {
        let a = bind(vec![8.0]);
        let b = bind(vec![8.0]);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn exposes_limits_and_name() {
        let binder = bind(vec![8.0, 12.0]);
        assert_eq!(binder.velocity_limits(), &[8.0, 12.0]);
        assert_eq!(binder.model_name(), "null");
    }
}
