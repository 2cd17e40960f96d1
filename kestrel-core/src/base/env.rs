//! Environment.
use super::ActionResult;
use crate::{Action, ActionSpace, Observation};
use anyhow::Result;

/// Represents an environment, typically an MDP.
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Starts a new episode, returning the initial observation and the actions
    /// available at the first step.
    fn reset(&mut self) -> Result<(Observation, ActionSpace)>;

    /// Performs an environment step.
    fn step(&mut self, action: &Action) -> Result<ActionResult>;

    /// The action space of the environment.
    ///
    /// For environments with dynamic action spaces, this is the space of all actions,
    /// while [`ActionResult::available_action_space`] gives the legal ones.
    fn action_space(&self) -> &ActionSpace;
}
