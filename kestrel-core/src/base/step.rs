//! Environment step.
use crate::{ActionSpace, Observation};

/// Result of applying an action to an environment.
#[derive(Clone, Debug)]
pub struct ActionResult {
    /// Observation after the action.
    pub observation: Observation,

    /// Reward.
    pub reward: f32,

    /// Flag denoting if the episode is terminated.
    pub terminated: bool,

    /// Flag denoting if the episode is truncated.
    pub truncated: bool,

    /// Actions available at the next step, if they differ from the
    /// action space given at reset.
    pub available_action_space: Option<ActionSpace>,
}

impl ActionResult {
    /// Constructs an [`ActionResult`] without a next available action space.
    pub fn new(observation: Observation, reward: f32, terminated: bool, truncated: bool) -> Self {
        Self {
            observation,
            reward,
            terminated,
            truncated,
            available_action_space: None,
        }
    }

    /// Sets the actions available at the next step.
    pub fn available_action_space(mut self, space: ActionSpace) -> Self {
        self.available_action_space = Some(space);
        self
    }

    #[inline]
    /// Terminated or truncated.
    pub fn is_done(&self) -> bool {
        self.terminated || self.truncated
    }
}
