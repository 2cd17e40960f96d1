use crate::{
    error::KestrelError, replay_buffer::RewardFn, Action, ActionResult, ActionSpace,
    DiscreteActionSpace, Env, Observation,
};
use anyhow::{bail, Result};
use ndarray::{array, ArrayView1};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Configuration of [`GoalGridEnv`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct GoalGridEnvConfig {
    /// Width of the grid.
    pub width: usize,

    /// Height of the grid.
    pub height: usize,

    /// Episodes are truncated after this number of steps.
    pub max_steps: usize,
}

impl Default for GoalGridEnvConfig {
    fn default() -> Self {
        Self {
            width: 4,
            height: 4,
            max_steps: 16,
        }
    }
}

impl GoalGridEnvConfig {
    /// Sets the size of the grid.
    pub fn size(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Sets the maximum number of steps in an episode.
    pub fn max_steps(mut self, v: usize) -> Self {
        self.max_steps = v;
        self
    }
}

/// Moves `(x, y)` by action `[a]`: 0 up, 1 down, 2 left, 3 right, staying on the grid.
fn move_on_grid(x: usize, y: usize, a: usize, width: usize, height: usize) -> (usize, usize) {
    match a {
        0 if y + 1 < height => (x, y + 1),
        1 if y > 0 => (x, y - 1),
        2 if x > 0 => (x - 1, y),
        3 if x + 1 < width => (x + 1, y),
        _ => (x, y),
    }
}

/// A goal-conditioned grid world.
///
/// The observation is `[x, y, goal_x, goal_y]`, i.e., the position followed by a goal of
/// two dimensions. The reward is `0` for reaching the goal, which terminates the episode,
/// and `-1` otherwise. Start and goal positions are drawn uniformly at reset.
///
/// Rewards are sparse, which makes this environment the typical use case of
/// [`HindsightReplayBuffer`](crate::replay_buffer::HindsightReplayBuffer) with
/// `goal_dim = 2` and the reward function given by [`GoalGridEnv::reward_fn`].
pub struct GoalGridEnv {
    width: usize,
    height: usize,
    max_steps: usize,
    position: (usize, usize),
    goal: (usize, usize),
    step_count: usize,
    action_space: ActionSpace,
    rng: StdRng,
}

impl GoalGridEnv {
    fn observation(&self) -> Observation {
        array![
            self.position.0 as f32,
            self.position.1 as f32,
            self.goal.0 as f32,
            self.goal.1 as f32
        ]
    }

    fn sample_position(&mut self) -> (usize, usize) {
        (
            self.rng.gen_range(0..self.width),
            self.rng.gen_range(0..self.height),
        )
    }

    /// Reward function consistent with the dynamics of the environment.
    ///
    /// It recomputes the reward of moving from the position in `state` with `action`,
    /// against the goal in `state`.
    pub fn reward_fn(&self) -> RewardFn {
        let (width, height) = (self.width, self.height);
        Box::new(move |state: ArrayView1<f32>, action: ArrayView1<f32>| {
            let (x, y) = (state[0] as usize, state[1] as usize);
            let next = move_on_grid(x, y, action[0] as usize, width, height);
            let goal = (state[2] as usize, state[3] as usize);
            if next == goal {
                0.0
            } else {
                -1.0
            }
        })
    }

    /// Current position.
    pub fn position(&self) -> (usize, usize) {
        self.position
    }

    /// Current goal.
    pub fn goal(&self) -> (usize, usize) {
        self.goal
    }
}

impl Env for GoalGridEnv {
    type Config = GoalGridEnvConfig;

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        if config.width * config.height < 2 {
            bail!("Grid must have at least two cells to separate start and goal");
        }

        Ok(Self {
            width: config.width,
            height: config.height,
            max_steps: config.max_steps,
            position: (0, 0),
            goal: (0, 0),
            step_count: 0,
            action_space: DiscreteActionSpace::with_n(4)?.into(),
            rng: StdRng::seed_from_u64(seed as u64),
        })
    }

    fn reset(&mut self) -> Result<(Observation, ActionSpace)> {
        self.step_count = 0;
        self.goal = self.sample_position();
        self.position = self.sample_position();
        while self.position == self.goal {
            self.position = self.sample_position();
        }
        Ok((self.observation(), self.action_space.clone()))
    }

    fn step(&mut self, action: &Action) -> Result<ActionResult> {
        let a = self
            .action_space
            .as_discrete()?
            .position(action.view())
            .ok_or_else(|| KestrelError::InvalidAction(format!("{}", action)))?;
        let (x, y) = self.position;
        self.position = move_on_grid(x, y, a, self.width, self.height);
        self.step_count += 1;

        let terminated = self.position == self.goal;
        let truncated = !terminated && self.step_count >= self.max_steps;
        let reward = if terminated { 0.0 } else { -1.0 };
        Ok(ActionResult::new(
            self.observation(),
            reward,
            terminated,
            truncated,
        ))
    }

    fn action_space(&self) -> &ActionSpace {
        &self.action_space
    }
}
