use crate::{
    error::KestrelError, Action, ActionResult, ActionSpace, DiscreteActionSpace, Env, Observation,
};
use anyhow::Result;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Configuration of [`TenTimesActionBanditEnv`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TenTimesActionBanditEnvConfig {
    /// The number of actions.
    pub n_actions: usize,

    /// Dimension of the (constant) observation.
    pub observation_dim: usize,
}

impl Default for TenTimesActionBanditEnvConfig {
    fn default() -> Self {
        Self {
            n_actions: 5,
            observation_dim: 1,
        }
    }
}

impl TenTimesActionBanditEnvConfig {
    /// Sets the number of actions.
    pub fn n_actions(mut self, v: usize) -> Self {
        self.n_actions = v;
        self
    }

    /// Sets the dimension of the observation.
    pub fn observation_dim(mut self, v: usize) -> Self {
        self.observation_dim = v;
        self
    }
}

/// A bandit whose episodes have a single step, rewarding the action of index `i` with `10 i`.
///
/// The observation is a constant vector of ones. Actions outside of the action space
/// are rejected.
pub struct TenTimesActionBanditEnv {
    observation_dim: usize,
    action_space: ActionSpace,
}

impl Env for TenTimesActionBanditEnv {
    type Config = TenTimesActionBanditEnvConfig;

    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        Ok(Self {
            observation_dim: config.observation_dim,
            action_space: DiscreteActionSpace::with_n(config.n_actions)?.into(),
        })
    }

    fn reset(&mut self) -> Result<(Observation, ActionSpace)> {
        Ok((
            Array1::ones(self.observation_dim),
            self.action_space.clone(),
        ))
    }

    fn step(&mut self, action: &Action) -> Result<ActionResult> {
        let ix = self
            .action_space
            .as_discrete()?
            .position(action.view())
            .ok_or_else(|| KestrelError::InvalidAction(format!("{}", action)))?;
        let reward = 10.0 * ix as f32;
        Ok(ActionResult::new(
            Array1::ones(self.observation_dim),
            reward,
            true,
            false,
        ))
    }

    fn action_space(&self) -> &ActionSpace {
        &self.action_space
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_reward_is_ten_times_action() -> Result<()> {
        let mut env = TenTimesActionBanditEnv::build(&Default::default(), 0)?;
        let (_, space) = env.reset()?;
        assert_eq!(space.n(), Some(5));

        let result = env.step(&array![3.0])?;
        assert_eq!(result.reward, 30.0);
        assert!(result.is_done());

        assert!(env.step(&array![7.0]).is_err());
        Ok(())
    }
}
