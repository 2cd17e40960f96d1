//! Replay buffer with hindsight relabeling of goals.
use super::{
    Experience, FifoReplayBuffer, HindsightReplayBufferConfig, Transition, TransitionBatch,
};
use crate::{error::KestrelError, ExperienceBufferBase, ReplayBufferBase};
use anyhow::Result;
use log::{debug, trace};
use ndarray::{s, Array1, ArrayView1};

/// Reward function `(state, action) -> reward` used to recompute rewards of
/// relabeled transitions. The goal is the trailing part of `state`.
pub type RewardFn = Box<dyn Fn(ArrayView1<f32>, ArrayView1<f32>) -> f32>;

/// A replay buffer implementing hindsight experience replay with the "final" strategy.
///
/// States and next states are the concatenation of an achieved part and a goal of
/// `goal_dim` dimensions. Pushed experiences are cached until the end of the episode.
/// When an experience with `done = true` is pushed, every cached transition is
/// committed to the underlying [`FifoReplayBuffer`] together with a relabeled copy,
/// whose goal is the achieved part of the last next state and whose reward is
/// recomputed with the reward function.
///
/// An episode of `L` steps thus commits `2L` transitions. With `goal_dim = 0`,
/// experiences are pushed directly without relabeling.
pub struct HindsightReplayBuffer {
    inner: FifoReplayBuffer,
    goal_dim: usize,
    reward_fn: Option<RewardFn>,
    trajectory: Vec<Transition>,
}

/// Replaces the trailing `goal.len()` entries of `x` by `goal`.
fn with_goal(x: &Array1<f32>, goal: ArrayView1<f32>) -> Array1<f32> {
    let mut x = x.clone();
    let split = x.len() - goal.len();
    x.slice_mut(s![split..]).assign(&goal);
    x
}

impl HindsightReplayBuffer {
    /// Creates an empty buffer.
    ///
    /// Fails if the capacity is zero, or if `reward_fn` is `None` while `goal_dim > 0`.
    pub fn build(
        config: &HindsightReplayBufferConfig,
        reward_fn: Option<RewardFn>,
    ) -> Result<Self> {
        if config.goal_dim > 0 && reward_fn.is_none() {
            return Err(KestrelError::MissingRewardFn(config.goal_dim).into());
        }

        Ok(Self {
            inner: FifoReplayBuffer::build(&config.fifo_config)?,
            goal_dim: config.goal_dim,
            reward_fn,
            trajectory: vec![],
        })
    }

    /// Dimension of goals.
    pub fn goal_dim(&self) -> usize {
        self.goal_dim
    }

    /// Number of transitions of the in-progress episode, not yet committed.
    pub fn trajectory_len(&self) -> usize {
        self.trajectory.len()
    }

    /// The underlying buffer holding committed transitions.
    pub fn inner(&self) -> &FifoReplayBuffer {
        &self.inner
    }

    /// Checks that a state can be split into an achieved part and a goal of the
    /// same dimension.
    fn check_dims(&self, exp: &Experience) -> Result<()> {
        let expected = 2 * self.goal_dim;
        for (name, x) in [("state", &exp.state), ("next_state", &exp.next_state)].iter() {
            if x.len() != expected {
                return Err(KestrelError::GoalDimMismatch(format!(
                    "{} has {} dimensions, expected {} (achieved state and goal of {} each)",
                    name,
                    x.len(),
                    expected,
                    self.goal_dim
                ))
                .into());
            }
        }
        Ok(())
    }

    /// Relabels a transition with `goal` and recomputes its reward.
    fn relabel(
        &self,
        tr: &Transition,
        goal: ArrayView1<f32>,
        reward_fn: &RewardFn,
    ) -> Transition {
        let state = with_goal(&tr.state, goal);
        let next_state = with_goal(&tr.next_state, goal);
        let reward = reward_fn(state.view(), tr.action.view());
        Transition {
            state,
            next_state,
            reward,
            ..tr.clone()
        }
    }

    /// Commits the cached trajectory with relabeled copies and empties the cache.
    fn flush(&mut self) {
        let trajectory = std::mem::take(&mut self.trajectory);
        let (last, reward_fn) = match (trajectory.last(), &self.reward_fn) {
            (Some(last), Some(reward_fn)) => (last, reward_fn),
            _ => return,
        };

        let achieved = last.next_state.len() - self.goal_dim;
        let goal = last.next_state.slice(s![..achieved]).to_owned();
        debug!(
            "HindsightReplayBuffer: relabel {} transitions with goal {}",
            trajectory.len(),
            goal
        );

        let relabeled = trajectory
            .iter()
            .map(|tr| self.relabel(tr, goal.view(), reward_fn))
            .collect::<Vec<_>>();
        for (tr, tr_relabeled) in trajectory.into_iter().zip(relabeled.into_iter()) {
            self.inner.push_transition(tr);
            self.inner.push_transition(tr_relabeled);
        }
    }
}

impl ExperienceBufferBase for HindsightReplayBuffer {
    type Item = Experience;

    fn push(&mut self, exp: Experience) -> Result<()> {
        if self.goal_dim == 0 {
            return self.inner.push(exp);
        }

        self.check_dims(&exp)?;
        let done = exp.done;
        let tr = self.inner.make_transition(exp)?;
        self.trajectory.push(tr);
        trace!(
            "HindsightReplayBuffer::push(): trajectory_len = {}",
            self.trajectory.len()
        );

        if done {
            self.flush();
        }
        Ok(())
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn clear(&mut self) {
        self.inner.clear();
        self.trajectory.clear();
    }
}

impl ReplayBufferBase for HindsightReplayBuffer {
    type Batch = TransitionBatch;

    fn sample(&mut self, size: usize) -> Result<TransitionBatch> {
        self.inner.sample(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{replay_buffer::FifoReplayBufferConfig, ActionSpace, DiscreteActionSpace};
    use ndarray::{array, concatenate, Axis};
    use std::collections::HashMap;

    fn cat(x: &Array1<f32>, goal: &Array1<f32>) -> Array1<f32> {
        concatenate(Axis(0), &[x.view(), goal.view()]).unwrap()
    }

    fn config(capacity: usize, goal_dim: usize) -> HindsightReplayBufferConfig {
        HindsightReplayBufferConfig::default()
            .fifo_config(FifoReplayBufferConfig::default().capacity(capacity))
            .goal_dim(goal_dim)
    }

    fn zero_reward() -> RewardFn {
        Box::new(|_: ArrayView1<f32>, _: ArrayView1<f32>| 0.0)
    }

    /// Episode on a 2x2 grid failing to reach (1, 1): (0, 0) -> (0, 1) -> (0, 0) -> (1, 0).
    /// Action `i` moves the agent to the `i + 1`-th position.
    fn grid_buffer() -> Result<(HindsightReplayBuffer, Vec<Array1<f32>>, Array1<f32>)> {
        let positions = vec![
            array![0.0f32, 0.0],
            array![0.0, 1.0],
            array![0.0, 0.0],
            array![1.0, 0.0],
        ];
        let goal = array![1.0f32, 1.0];
        let next_positions = (0..3)
            .map(|i| (i, positions[i + 1].clone()))
            .collect::<HashMap<_, _>>();

        let reward = move |state: ArrayView1<f32>, action: ArrayView1<f32>| {
            let goal = state.slice(s![2..]);
            let next_position = &next_positions[&(action[0] as usize)];
            if next_position.view() == goal {
                0.0
            } else {
                -1.0
            }
        };
        let reward_fn: RewardFn = Box::new(reward);

        let space = DiscreteActionSpace::with_n(4)?;
        let mut buffer = HindsightReplayBuffer::build(&config(10, 2), Some(reward_fn))?;
        for i in 0..3 {
            let exp = Experience::new(
                cat(&positions[i], &goal),
                array![i as f32],
                -1.0,
                cat(&positions[i + 1], &goal),
                i == 2,
            )
            .curr_available_actions(space.clone())
            .next_available_actions(space.clone())
            .action_space(ActionSpace::Discrete(space.clone()));
            buffer.push(exp)?;

            if i < 2 {
                assert_eq!(buffer.len(), 0);
                assert_eq!(buffer.trajectory_len(), i + 1);
            }
        }

        Ok((buffer, positions, goal))
    }

    #[test]
    fn test_hindsight_reward_and_goals() -> Result<()> {
        let _ = env_logger::builder().is_test(true).try_init();
        let (mut buffer, positions, goal) = grid_buffer()?;
        let final_position = positions[3].clone();

        assert_eq!(buffer.len(), 6);
        assert_eq!(buffer.trajectory_len(), 0);

        let transitions = buffer.inner().iter().collect::<Vec<_>>();
        assert!(transitions.iter().any(|tr| tr.reward == 0.0));

        fn goal_of(tr: &Transition) -> Array1<f32> {
            tr.state.slice(s![2..]).to_owned()
        }
        let n_original = transitions.iter().filter(|tr| goal_of(tr) == goal).count();
        let n_relabeled = transitions
            .iter()
            .filter(|tr| goal_of(tr) == final_position)
            .count();
        assert_eq!(n_original, 3);
        assert_eq!(n_relabeled, 3);

        // Only the last step reaches the substituted goal.
        let rewards = transitions.iter().map(|tr| tr.reward).collect::<Vec<_>>();
        assert_eq!(rewards, vec![-1.0, -1.0, -1.0, -1.0, -1.0, 0.0]);

        let batch = buffer.sample(6)?;
        assert_eq!(batch.len(), 6);
        assert_eq!(buffer.len(), 6);
        Ok(())
    }

    #[test]
    fn test_hindsight_goal_consistency() -> Result<()> {
        let (buffer, _, _) = grid_buffer()?;
        let transitions = buffer.inner().iter().collect::<Vec<_>>();

        for pair in transitions.chunks(2) {
            let (original, relabeled) = (pair[0], pair[1]);
            assert_eq!(
                relabeled.state.slice(s![2..]),
                relabeled.next_state.slice(s![2..])
            );
            assert_eq!(
                original.state.slice(s![..2]),
                relabeled.state.slice(s![..2])
            );
            assert_eq!(
                original.next_state.slice(s![..2]),
                relabeled.next_state.slice(s![..2])
            );
            assert_eq!(original.action, relabeled.action);
            assert_eq!(original.done, relabeled.done);
            assert_eq!(
                original.curr_available_actions_mask,
                relabeled.curr_available_actions_mask
            );
            assert_eq!(
                original.next_available_actions,
                relabeled.next_available_actions
            );
        }
        Ok(())
    }

    #[test]
    fn test_missing_reward_fn() {
        let err = HindsightReplayBuffer::build(&config(10, 2), None).err().unwrap();
        assert_eq!(
            err.downcast_ref::<KestrelError>(),
            Some(&KestrelError::MissingRewardFn(2))
        );
        assert!(HindsightReplayBuffer::build(&config(10, 0), None).is_ok());
    }

    #[test]
    fn test_goal_dim_mismatch() -> Result<()> {
        let mut buffer = HindsightReplayBuffer::build(&config(10, 2), Some(zero_reward()))?;
        let exp = Experience::new(
            array![0.0, 0.0, 1.0],
            array![0.0],
            -1.0,
            array![0.0, 1.0, 1.0],
            true,
        );
        let err = buffer.push(exp).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<KestrelError>(),
            Some(KestrelError::GoalDimMismatch(_))
        ));
        assert_eq!(buffer.len(), 0);
        assert_eq!(buffer.trajectory_len(), 0);
        Ok(())
    }

    #[test]
    fn test_zero_goal_dim_passes_through() -> Result<()> {
        let mut buffer = HindsightReplayBuffer::build(&config(10, 0), None)?;
        buffer.push(Experience::new(array![0.0], array![0.0], 1.0, array![1.0], false))?;
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.trajectory_len(), 0);
        Ok(())
    }

    #[test]
    fn test_clear_drops_trajectory() -> Result<()> {
        let mut buffer = HindsightReplayBuffer::build(&config(10, 1), Some(zero_reward()))?;
        buffer.push(Experience::new(
            array![0.0, 1.0],
            array![0.0],
            -1.0,
            array![1.0, 1.0],
            false,
        ))?;
        assert_eq!(buffer.trajectory_len(), 1);
        buffer.clear();
        assert_eq!(buffer.trajectory_len(), 0);

        buffer.push(Experience::new(
            array![0.0, 1.0],
            array![0.0],
            -1.0,
            array![1.0, 1.0],
            true,
        ))?;
        assert_eq!(buffer.len(), 2);
        Ok(())
    }
}
