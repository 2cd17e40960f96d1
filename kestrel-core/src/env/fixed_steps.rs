use crate::{Action, ActionResult, ActionSpace, DiscreteActionSpace, Env, Observation};
use anyhow::Result;
use ndarray::array;
use serde::{Deserialize, Serialize};

/// Configuration of [`FixedNumberOfStepsEnv`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct FixedNumberOfStepsEnvConfig {
    /// The number of steps of every episode.
    pub number_of_steps: usize,
}

impl Default for FixedNumberOfStepsEnvConfig {
    fn default() -> Self {
        Self {
            number_of_steps: 100,
        }
    }
}

impl FixedNumberOfStepsEnvConfig {
    /// Sets the number of steps of every episode.
    pub fn number_of_steps(mut self, v: usize) -> Self {
        self.number_of_steps = v;
        self
    }
}

/// An environment whose episodes are terminated after a fixed number of steps.
///
/// The observation is the number of steps done in the episode and the reward is
/// always zero, whatever the action.
pub struct FixedNumberOfStepsEnv {
    number_of_steps: usize,
    step_count: usize,
    action_space: ActionSpace,
}

impl FixedNumberOfStepsEnv {
    fn observation(&self) -> Observation {
        array![self.step_count as f32]
    }
}

impl Env for FixedNumberOfStepsEnv {
    type Config = FixedNumberOfStepsEnvConfig;

    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        Ok(Self {
            number_of_steps: config.number_of_steps,
            step_count: 0,
            action_space: DiscreteActionSpace::with_n(2)?.into(),
        })
    }

    fn reset(&mut self) -> Result<(Observation, ActionSpace)> {
        self.step_count = 0;
        Ok((self.observation(), self.action_space.clone()))
    }

    fn step(&mut self, _action: &Action) -> Result<ActionResult> {
        self.step_count += 1;
        let terminated = self.step_count >= self.number_of_steps;
        Ok(ActionResult::new(self.observation(), 0.0, terminated, false))
    }

    fn action_space(&self) -> &ActionSpace {
        &self.action_space
    }
}
