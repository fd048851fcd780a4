//! Strongly-typed identifiers.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one agent within an environment instance.
///
/// Agents are registered at construction and assigned dense sequential
/// IDs. `AgentId(n)` corresponds to row `n` of every per-agent batch
/// buffer (observations, rewards, collision/completion vectors).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub u32);

impl AgentId {
    /// Batch-buffer row for this agent.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for AgentId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Counter for unique [`BindingId`] allocation.
static BINDING_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique per-instance identifier for one dynamics bind.
///
/// Allocated from a monotonic atomic counter via [`BindingId::next`].
/// Two distinct binds always have different IDs, even when they wrap
/// kinematics models of the same kind with the same limits. The staged
/// spline protocol replaces the active bind mid-episode; callers observe
/// that replacement as an ID change rather than by comparing model
/// internals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(u64);

impl BindingId {
    /// Allocate a fresh, unique binding ID.
    ///
    /// Each call returns a new ID that has never been returned before
    /// within this process. Thread-safe.
    pub fn next() -> Self {
        Self(BINDING_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
