//! Error types for the Veer simulation core.
//!
//! All errors here are contract violations: they indicate a caller or
//! integration bug, fail fast, and are never retried. Numeric edge cases
//! (zero distance, zero speed) are handled by clamping inside the reward
//! and observation paths and never surface as errors.

use std::error::Error;
use std::fmt;

/// Errors from resolving an agent action batch into physical controls.
///
/// Returned by the action resolver and wrapped in
/// [`StepError::Action`] by the environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionError {
    /// The action batch does not cover every agent.
    WrongAgentCount {
        /// Number of agents in the environment.
        expected: usize,
        /// Number of per-agent entries supplied.
        got: usize,
    },
    /// The action payload kind does not match the configured variant
    /// (e.g. indices supplied to a continuous resolver).
    PayloadMismatch {
        /// Payload kind the resolver accepts.
        expected: &'static str,
        /// Payload kind that was supplied.
        got: &'static str,
    },
    /// A discrete action index is outside the action table.
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of entries in the table.
        table_len: usize,
    },
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongAgentCount { expected, got } => {
                write!(f, "action batch covers {got} agents, environment has {expected}")
            }
            Self::PayloadMismatch { expected, got } => {
                write!(f, "action payload is {got}, resolver expects {expected}")
            }
            Self::IndexOutOfRange { index, table_len } => {
                write!(f, "action index {index} outside table of {table_len} entries")
            }
        }
    }
}

impl Error for ActionError {}

/// Errors from the environment's `step` entry points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepError {
    /// Action resolution failed.
    Action(ActionError),
    /// A staged call supplied a stage outside `{0, 1}`.
    InvalidStage {
        /// The stage value that was supplied.
        got: u8,
    },
    /// Stage 1 was called before any stage-0 path commitment this
    /// episode, so no path is defined.
    PathNotCommitted,
    /// `step()` was called on a staged variant; use `step_staged()`.
    StageRequired,
    /// `step_staged()` was called on an unstaged variant; use `step()`.
    StageNotSupported,
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Action(e) => write!(f, "action resolution failed: {e}"),
            Self::InvalidStage { got } => {
                write!(f, "stage must be 0 or 1, got {got}")
            }
            Self::PathNotCommitted => {
                write!(f, "stage 1 called before stage-0 path commitment")
            }
            Self::StageRequired => {
                write!(f, "staged variant: use step_staged(stage, action)")
            }
            Self::StageNotSupported => {
                write!(f, "unstaged variant: use step(action)")
            }
        }
    }
}

impl Error for StepError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Action(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ActionError> for StepError {
    fn from(e: ActionError) -> Self {
        Self::Action(e)
    }
}
