//! Agent.
use crate::{record::Record, Action, ActionResult, ActionSpace, Observation};
use anyhow::Result;

/// An agent interacting with an environment.
///
/// The online-learning driver calls [`Agent::reset`] at the beginning of every episode,
/// then alternates [`Agent::act`] and [`Agent::observe`] until the episode ends,
/// interleaving [`Agent::learn`] as configured.
pub trait Agent {
    /// Returns an action for the current subjective state.
    ///
    /// With `exploit = true`, the agent does not explore.
    fn act(&mut self, exploit: bool) -> Result<Action>;

    /// Observes the result of the latest action.
    fn observe(&mut self, action_result: &ActionResult) -> Result<()>;

    /// Performs a learning step and returns some information.
    fn learn(&mut self) -> Result<Record>;

    /// Resets the agent for a new episode.
    ///
    /// `available_action_space` holds the actions available at the first step and
    /// `action_space` is the full action space of the environment, which bounds every
    /// available set of the episode.
    fn reset(
        &mut self,
        observation: &Observation,
        available_action_space: &ActionSpace,
        action_space: &ActionSpace,
    ) -> Result<()>;
}
