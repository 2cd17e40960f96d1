//! Errors in the library.
//!
//! Fallible functions return [`anyhow::Result`]; the category of a failure can be
//! recovered with `err.downcast_ref::<KestrelError>()`.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug, PartialEq)]
pub enum KestrelError {
    /// Configuration error: the capacity of a replay buffer must be positive.
    #[error("Invalid capacity: {0}, must be a positive integer")]
    InvalidCapacity(usize),

    /// Configuration error: a hindsight buffer with `goal_dim > 0` needs a reward function.
    #[error("Missing reward function for hindsight relabeling with goal_dim = {0}")]
    MissingRewardFn(usize),

    /// Invalid input: more available actions than the reference cardinality.
    #[error("{available} available actions exceed the maximum number of actions {max}")]
    AvailableActionsExceedLimit {
        /// Cardinality of the available action space.
        available: usize,
        /// Reference cardinality used for padding.
        max: usize,
    },

    /// Invalid input: the buffer holds fewer transitions than requested.
    #[error("Insufficient data: requested {requested} transitions, buffer holds {len}")]
    InsufficientData {
        /// Requested batch size.
        requested: usize,
        /// Number of transitions in the buffer.
        len: usize,
    },

    /// Invalid input: batch size must be positive.
    #[error("Batch size must be positive")]
    InvalidBatchSize,

    /// Invalid input: a discrete action space must hold at least one action.
    #[error("Discrete action space must contain at least one action")]
    EmptyActionSpace,

    /// Invalid input: actions in a discrete action space differ in dimension.
    #[error("Inconsistent action dimension: expected {expected}, got {actual}")]
    InconsistentActionDim {
        /// Dimension of the first action.
        expected: usize,
        /// Dimension of the offending action.
        actual: usize,
    },

    /// Invalid input: the operation needs an enumerable (discrete) action space.
    #[error("Operation requires a discrete action space")]
    ContinuousActionSpace,

    /// Invalid input: the action is not in the action space of the environment.
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Consistency violation: an observation differs in dimension from the history.
    #[error("Observation dimension mismatch: expected {expected}, got {actual}")]
    ObservationDimMismatch {
        /// Dimension of the observations in the history.
        expected: usize,
        /// Dimension of the new observation.
        actual: usize,
    },

    /// Consistency violation: state and goal dimensions do not fit for relabeling.
    #[error("Goal dimension mismatch: {0}")]
    GoalDimMismatch(String),

    /// Consistency violation: transitions can not be stacked into a batch.
    #[error("Inconsistent transitions: {0}")]
    InconsistentTransitions(String),

    /// The agent was used before [`Agent::reset`](crate::Agent::reset).
    #[error("Agent is not reset, call reset() before act() or observe()")]
    AgentNotReset,

    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),
}
