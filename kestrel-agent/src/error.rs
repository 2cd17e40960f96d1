//! Errors of policy learners.
use thiserror::Error;

/// Errors of policy learners.
#[derive(Error, Debug, PartialEq)]
pub enum AgentError {
    /// An action can not be interpreted as an index below the number of actions.
    #[error("Invalid action index {index} for {max_number_actions} actions")]
    InvalidActionIndex {
        /// Index given by the raw action.
        index: f32,
        /// The number of actions.
        max_number_actions: usize,
    },

    /// A matrix to be inverted is singular.
    #[error("Singular matrix")]
    SingularMatrix,

    /// Features have an unexpected dimension.
    #[error("Feature dimension mismatch: expected {expected}, got {actual}")]
    FeatureDimMismatch {
        /// Dimension of the model.
        expected: usize,
        /// Dimension of the given features.
        actual: usize,
    },

    /// The batch lacks the available actions at the next step.
    #[error("Batch has no next available actions")]
    MissingNextAvailableActions,

    /// The learner acts in continuous action spaces only.
    #[error("Operation requires a continuous action space")]
    ContinuousActionSpaceRequired,
}
